//! In-memory `DashboardSource` with a small fixed plant dataset.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use plantdash_api::{hash_password, ApiError, ApiResult, DashboardSource, StoredUser, TableQuery};
use plantdash_core::{CellValue, RawTable, UserRecord};
use secrecy::SecretString;

pub const ADMIN_PASSWORD: &str = "turbine-admin";
pub const SALES_PASSWORD: &str = "turbine-sales";

#[derive(Default)]
pub struct FakeSource {
    users: HashMap<String, (UserRecord, String)>,
    loads: Mutex<HashMap<TableQuery, usize>>,
    drive_lookups: AtomicUsize,
    fail_options: AtomicBool,
    fail_summary: AtomicBool,
    fail_health: AtomicBool,
}

impl FakeSource {
    /// One admin (`rostorga`) and one sales user without a full name
    /// (`oostorga`).
    pub fn with_users() -> ApiResult<Self> {
        let mut source = Self::default();
        source.add_user(
            UserRecord {
                username: "rostorga".to_string(),
                full_name: Some("Rita Ostorga".to_string()),
                role: "admin".to_string(),
            },
            ADMIN_PASSWORD,
        )?;
        source.add_user(
            UserRecord {
                username: "oostorga".to_string(),
                full_name: None,
                role: "sales".to_string(),
            },
            SALES_PASSWORD,
        )?;
        Ok(source)
    }

    fn add_user(&mut self, record: UserRecord, password: &str) -> ApiResult<()> {
        let hash = hash_password(password)?;
        self.users.insert(record.username.clone(), (record, hash));
        Ok(())
    }

    pub fn fail_options(&self, fail: bool) {
        self.fail_options.store(fail, Ordering::SeqCst);
    }

    pub fn fail_summary(&self, fail: bool) {
        self.fail_summary.store(fail, Ordering::SeqCst);
    }

    pub fn fail_health(&self, fail: bool) {
        self.fail_health.store(fail, Ordering::SeqCst);
    }

    pub fn loads(&self, query: TableQuery) -> usize {
        self.loads
            .lock()
            .map(|loads| loads.get(&query).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn drive_lookups(&self) -> usize {
        self.drive_lookups.load(Ordering::SeqCst)
    }
}

fn text(value: &str) -> CellValue {
    value.into()
}

fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> ApiResult<RawTable> {
    Ok(RawTable::with_rows(columns.iter().copied(), rows)?)
}

fn option_table(column: &str, values: &[&str]) -> ApiResult<RawTable> {
    table(&[column], values.iter().map(|v| vec![text(v)]).collect())
}

fn summary_row(id: i64, name: &str, fuel: &str, contacts: i64, drives: i64) -> Vec<CellValue> {
    vec![
        CellValue::Int(id),
        text(name),
        text("Gulf Power Co"),
        text("Pensacola"),
        text("FL"),
        text(fuel),
        CellValue::Int(contacts),
        CellValue::Int(drives),
    ]
}

#[async_trait]
impl DashboardSource for FakeSource {
    async fn load_table(&self, query: TableQuery) -> ApiResult<RawTable> {
        if let Ok(mut loads) = self.loads.lock() {
            *loads.entry(query).or_insert(0) += 1;
        }

        match query {
            TableQuery::PlantNames
            | TableQuery::FuelTypes
            | TableQuery::DriveManufacturers
            | TableQuery::DriveTypes
                if self.fail_options.load(Ordering::SeqCst) =>
            {
                Err(ApiError::database_error("relation \"drives\" does not exist"))
            }
            TableQuery::PlantNames => option_table("plantname", &["Barry", "Crist", "Smith"]),
            TableQuery::FuelTypes => option_table("fuel_type_1", &["Coal", "Gas"]),
            TableQuery::DriveManufacturers => option_table("drive_manufacturer", &["ABB", "Siemens"]),
            TableQuery::DriveTypes => option_table("drive_info", &["AC", "DC"]),
            TableQuery::PlantSummary if self.fail_summary.load(Ordering::SeqCst) => {
                Err(ApiError::database_error("connection reset"))
            }
            TableQuery::PlantSummary => table(
                &[
                    "plant_id",
                    "plantname",
                    "ownername",
                    "company_city",
                    "company_state",
                    "fuel_type_1",
                    "contact_count",
                    "drive_count",
                ],
                vec![
                    summary_row(1, "Barry", "Coal", 2, 3),
                    summary_row(2, "Crist", "Gas", 1, 1),
                    summary_row(3, "Smith", "Gas", 4, 2),
                    summary_row(4, "Scholz", "Coal", 0, 5),
                ],
            ),
            TableQuery::CallDirectory => table(
                &["plantname", "cont_name", "cont_title", "cont_phone", "cont_email"],
                vec![vec![
                    text("Barry"),
                    text("Dana Reyes"),
                    text("Plant Manager"),
                    text("555-0100"),
                    CellValue::Null,
                ]],
            ),
            TableQuery::AllPlants => table(
                &[
                    "plantname",
                    "ownername",
                    "company_address",
                    "company_city",
                    "company_state",
                    "fuel_type_1",
                ],
                vec![vec![
                    text("Barry"),
                    text("Gulf Power Co"),
                    text("1 Energy Pl"),
                    text("Pensacola"),
                    text("FL"),
                    text("Coal"),
                ]],
            ),
            TableQuery::SalesActivity => table(
                &["plantname", "activity_date", "activity_type", "sales_rep", "notes"],
                Vec::new(),
            ),
            TableQuery::Outages => table(
                &[
                    "plantname",
                    "unit_name",
                    "outage_type",
                    "outage_start",
                    "outage_end",
                    "description",
                ],
                vec![vec![
                    text("Crist"),
                    text("Unit 6"),
                    text("Planned"),
                    text("2024-03-01"),
                    text("2024-03-20"),
                    text("Turbine overhaul"),
                ]],
            ),
        }
    }

    async fn drive_matches(
        &self,
        manufacturer: Option<&str>,
        drive_type: Option<&str>,
    ) -> ApiResult<RawTable> {
        self.drive_lookups.fetch_add(1, Ordering::SeqCst);
        // (plant_id, manufacturer, type)
        let drives = [(1, "ABB", "AC"), (2, "Siemens", "DC"), (3, "ABB", "DC")];
        let rows = drives
            .iter()
            .filter(|(_, m, t)| {
                manufacturer.map_or(true, |want| want == *m) && drive_type.map_or(true, |want| want == *t)
            })
            .map(|(id, _, _)| vec![CellValue::Int(*id)])
            .collect();
        table(&["plant_id"], rows)
    }

    async fn find_user(&self, username: &str) -> ApiResult<Option<StoredUser>> {
        Ok(self.users.get(username).map(|(record, hash)| StoredUser {
            record: record.clone(),
            password_hash: SecretString::from(hash.clone()),
        }))
    }

    async fn health_check(&self) -> ApiResult<()> {
        if self.fail_health.load(Ordering::SeqCst) {
            return Err(ApiError::service_unavailable("database is not accepting connections"));
        }
        Ok(())
    }
}
