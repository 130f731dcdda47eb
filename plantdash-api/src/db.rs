//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres. Every query checks
//! out one connection and returns it to the pool when the guard drops, on
//! success and error paths alike.

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use plantdash_core::{CellValue, RawTable, UserRecord};
use secrecy::{ExposeSecret, SecretString};
use std::time::{Duration, Instant};
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Column, NoTls, Row};

use crate::error::{ApiError, ApiResult};
use crate::queries::{TableQuery, DRIVE_MATCHES_SQL, FIND_USER_SQL};
use crate::source::{DashboardSource, StoredUser};
use crate::telemetry::METRICS;

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug)]
pub struct DbConfig {
    /// PostgreSQL connection string.
    pub url: SecretString,
    /// Maximum pool size
    pub max_size: usize,
    /// How long to wait for a free connection or a new one.
    pub timeout: Duration,
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: SecretString::from(url.into()),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }

    /// Create a new database configuration from environment variables.
    ///
    /// - `DATABASE_URL`: connection string (required)
    /// - `PLANTDASH_DB_POOL_SIZE`: maximum connections (default: 16)
    /// - `PLANTDASH_DB_TIMEOUT`: pool wait timeout in seconds (default: 30)
    pub fn from_env() -> ApiResult<Self> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| ApiError::missing_field("DATABASE_URL"))?;

        Ok(Self {
            url: SecretString::from(url),
            max_size: std::env::var("PLANTDASH_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("PLANTDASH_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        })
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.url = Some(self.url.expose_secret().to_string());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_cfg = PoolConfig::new(self.max_size);
        pool_cfg.timeouts.wait = Some(self.timeout);
        pool_cfg.timeouts.create = Some(self.timeout);
        cfg.pool = Some(pool_cfg);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// Database client that wraps a connection pool.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    /// Close the pool. Connections in use are dropped when returned.
    pub fn close(&self) {
        self.pool.close();
    }

    async fn get_conn(&self) -> ApiResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(ApiError::from)
    }

    /// Run `sql` and collect the result into a [`RawTable`], recording
    /// latency under `operation`.
    pub async fn query_table(
        &self,
        operation: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> ApiResult<RawTable> {
        let start = Instant::now();
        let result = self.run_query(sql, params).await;

        if let Ok(metrics) = METRICS.as_ref() {
            metrics.record_db_operation(operation, result.is_ok(), start.elapsed().as_secs_f64());
        }
        match &result {
            Ok(table) => tracing::debug!(operation, rows = table.len(), "query finished"),
            Err(e) => tracing::warn!(operation, error = %e, "query failed"),
        }

        result
    }

    async fn run_query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> ApiResult<RawTable> {
        let conn = self.get_conn().await?;
        let statement = conn.prepare_cached(sql).await?;
        let rows = conn.query(&statement, params).await?;

        let columns = statement.columns();
        let mut table = RawTable::new(columns.iter().map(Column::name));
        for row in &rows {
            table.push_row(row_cells(row, columns)?)?;
        }
        Ok(table)
    }
}

#[async_trait]
impl DashboardSource for DbClient {
    async fn load_table(&self, query: TableQuery) -> ApiResult<RawTable> {
        self.query_table(query.operation_id(), query.sql(), &[]).await
    }

    async fn drive_matches(
        &self,
        manufacturer: Option<&str>,
        drive_type: Option<&str>,
    ) -> ApiResult<RawTable> {
        self.query_table("drive_matches", DRIVE_MATCHES_SQL, &[&manufacturer, &drive_type])
            .await
    }

    async fn find_user(&self, username: &str) -> ApiResult<Option<StoredUser>> {
        let conn = self.get_conn().await?;
        let Some(row) = conn.query_opt(FIND_USER_SQL, &[&username]).await? else {
            return Ok(None);
        };

        let password_hash: String = row.try_get("password_hash")?;
        Ok(Some(StoredUser {
            record: UserRecord {
                username: row.try_get("username")?,
                full_name: row.try_get("full_name")?,
                role: row.try_get("role")?,
            },
            password_hash: SecretString::from(password_hash),
        }))
    }

    async fn health_check(&self) -> ApiResult<()> {
        let conn = self.get_conn().await?;
        conn.simple_query("SELECT 1").await?;
        Ok(())
    }
}

// ============================================================================
// ROW CONVERSION
// ============================================================================

fn row_cells(row: &Row, columns: &[Column]) -> ApiResult<Vec<CellValue>> {
    columns
        .iter()
        .enumerate()
        .map(|(idx, column)| cell_at(row, idx, column))
        .collect()
}

/// Decode one cell by its PostgreSQL type. Dates and timestamps become text
/// so the cached form stays plain JSON.
fn cell_at(row: &Row, idx: usize, column: &Column) -> ApiResult<CellValue> {
    let ty = column.type_();

    let cell = if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(idx)?.map(CellValue::Bool)
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(idx)?.map(|v| CellValue::Int(v.into()))
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(idx)?.map(|v| CellValue::Int(v.into()))
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(idx)?.map(CellValue::Int)
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(idx)?.map(|v| CellValue::Float(v.into()))
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(idx)?.map(CellValue::Float)
    } else if *ty == Type::TEXT
        || *ty == Type::VARCHAR
        || *ty == Type::BPCHAR
        || *ty == Type::NAME
    {
        row.try_get::<_, Option<String>>(idx)?.map(CellValue::Text)
    } else if *ty == Type::DATE {
        row.try_get::<_, Option<chrono::NaiveDate>>(idx)?
            .map(|v| CellValue::Text(v.to_string()))
    } else if *ty == Type::TIMESTAMP {
        row.try_get::<_, Option<chrono::NaiveDateTime>>(idx)?
            .map(|v| CellValue::Text(v.format("%Y-%m-%d %H:%M:%S").to_string()))
    } else if *ty == Type::TIMESTAMPTZ {
        row.try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(idx)?
            .map(|v| CellValue::Text(v.to_rfc3339()))
    } else {
        return Err(ApiError::database_error(format!(
            "Column '{}' has unsupported type {}; cast it in the query",
            column.name(),
            ty
        )));
    };

    Ok(cell.unwrap_or(CellValue::Null))
}
