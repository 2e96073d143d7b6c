//! Credential table configuration.
//!
//! Users are declared as `[[users]]` entries in `config.toml`. Passwords are
//! compared as plain text; this table is a login gate for shop staff, not an
//! identity provider.

use crate::core::session::Role;
use serde::Deserialize;

/// One login entry
#[derive(Debug, Deserialize, Clone)]
pub struct UserConfig {
    /// Login name, compared exactly
    pub username: String,
    /// Plain-text password
    pub password: String,
    /// `admin` or `seller` (`vendedor` is accepted as an alias)
    pub role: Role,
    /// Name shown in replies, defaults to the username
    #[serde(default)]
    pub display_name: Option<String>,
}

impl UserConfig {
    /// Name to show for this user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}
