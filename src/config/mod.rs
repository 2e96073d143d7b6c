/// Database configuration and connection management
pub mod database;

/// Store settings loaded from config.toml
pub mod store;

/// Static credential table from config.toml
pub mod users;

pub use store::{AppConfig, SearchConfig, StockThresholds, StoreInfo, load_config, load_default_config};
pub use users::UserConfig;
