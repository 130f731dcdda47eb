//! The data source seam between panels and the database.

use async_trait::async_trait;
use plantdash_core::{RawTable, UserRecord};
use secrecy::SecretString;

use crate::error::ApiResult;
use crate::queries::TableQuery;

/// A dashboard user as stored, including the password hash.
#[derive(Debug)]
pub struct StoredUser {
    pub record: UserRecord,
    /// Argon2 PHC string.
    pub password_hash: SecretString,
}

/// Everything the panels and the login gate need from storage.
///
/// [`DbClient`](crate::db::DbClient) is the production implementation.
#[async_trait]
pub trait DashboardSource: Send + Sync + 'static {
    /// Run one of the named queries and return its rows.
    async fn load_table(&self, query: TableQuery) -> ApiResult<RawTable>;

    /// Plant ids with a drive matching the given selections. `None` matches
    /// any value. The result has a single `plant_id` column.
    async fn drive_matches(
        &self,
        manufacturer: Option<&str>,
        drive_type: Option<&str>,
    ) -> ApiResult<RawTable>;

    async fn find_user(&self, username: &str) -> ApiResult<Option<StoredUser>>;

    async fn health_check(&self) -> ApiResult<()>;
}
