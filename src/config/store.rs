//! Application configuration loading from config.toml
//!
//! The file holds the shop details printed in replies, the fuzzy search
//! threshold, the stock badge thresholds, the credential table and an optional
//! seed catalog used on first run when the products table is empty.

use crate::{
    config::users::UserConfig,
    core::{matcher::DEFAULT_THRESHOLD, product::NewProduct},
    errors::{Error, Result},
};
use serde::Deserialize;
use std::{collections::HashSet, path::Path};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Shop details
    #[serde(default)]
    pub store: StoreInfo,
    /// Fuzzy search settings
    #[serde(default)]
    pub search: SearchConfig,
    /// Stock badge thresholds
    #[serde(default)]
    pub stock: StockThresholds,
    /// Credential table
    pub users: Vec<UserConfig>,
    /// Products inserted when the catalog is empty
    #[serde(default)]
    pub products: Vec<NewProduct>,
}

/// Shop details shown by `/store` and in sale receipts
#[derive(Debug, Deserialize, Clone)]
pub struct StoreInfo {
    /// Shop name
    pub name: String,
    /// Contact phone
    #[serde(default)]
    pub phone: String,
    /// Street address
    #[serde(default)]
    pub address: String,
    /// Currency prefix for amounts (e.g., "Gs.")
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for StoreInfo {
    fn default() -> Self {
        Self {
            name: "POS Buddy".to_string(),
            phone: String::new(),
            address: String::new(),
            currency: default_currency(),
        }
    }
}

fn default_currency() -> String {
    "Gs.".to_string()
}

/// Fuzzy search settings
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SearchConfig {
    /// Minimum token similarity ratio for a fuzzy match
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

const fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

/// Stock badge thresholds
///
/// A product with at least `available_at` units is shown as available, with
/// at least `limited_at` as limited, with any stock as low, otherwise out.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct StockThresholds {
    /// Units from which a product counts as fully available
    #[serde(default = "default_available_at")]
    pub available_at: i64,
    /// Units from which a product counts as limited rather than low
    #[serde(default = "default_limited_at")]
    pub limited_at: i64,
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self {
            available_at: default_available_at(),
            limited_at: default_limited_at(),
        }
    }
}

const fn default_available_at() -> i64 {
    10
}

const fn default_limited_at() -> i64 {
    5
}

impl AppConfig {
    /// Checks the cross-field rules serde cannot express.
    ///
    /// # Errors
    /// Returns `Error::Config` if the threshold is outside (0, 1], the stock
    /// thresholds are not ordered, there are no users, or a username repeats.
    pub fn validate(&self) -> Result<()> {
        let threshold = self.search.threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(Error::Config {
                message: format!("search.threshold must be in (0, 1], got {threshold}"),
            });
        }

        if self.stock.limited_at < 1 || self.stock.available_at < self.stock.limited_at {
            return Err(Error::Config {
                message: format!(
                    "stock thresholds must satisfy 1 <= limited_at <= available_at (got {} and {})",
                    self.stock.limited_at, self.stock.available_at
                ),
            });
        }

        if self.users.is_empty() {
            return Err(Error::Config {
                message: "at least one [[users]] entry is required".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for user in &self.users {
            if user.username.trim().is_empty() {
                return Err(Error::Config {
                    message: "usernames cannot be empty".to_string(),
                });
            }
            if !seen.insert(user.username.as_str()) {
                return Err(Error::Config {
                    message: format!("duplicate username '{}'", user.username),
                });
            }
        }

        Ok(())
    }
}

/// Loads and validates the configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
/// - [`AppConfig::validate`] rejects the contents
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading configuration from {:?}", path_ref);

    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;

    let config: AppConfig = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {path_ref:?}: {e}"),
    })?;

    config.validate()?;
    Ok(config)
}

/// Loads the configuration from `POS_CONFIG`, or ./config.toml when unset
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var("POS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(path)
}
