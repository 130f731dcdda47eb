//! Logged-in user identity.

use serde::{Deserialize, Serialize};

/// Role granted to dashboard administrators.
pub const ADMIN_ROLE: &str = "admin";

/// The user record returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub full_name: Option<String>,
    pub role: String,
}

impl UserRecord {
    /// Name shown in the "Logged in as" banner: full name, else username.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.username.as_str())
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role.eq_ignore_ascii_case(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}
