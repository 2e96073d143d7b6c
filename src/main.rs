#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use pos_buddy::{
    bot,
    config::{self, database},
    core::product,
    errors::{Error, Result},
};
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();

    // 3. Load shop details, thresholds, users and the seed catalog
    let app_config = config::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    info!(
        store = %app_config.store.name,
        users = app_config.users.len(),
        "Configuration loaded"
    );

    // 4. Connect to the database and create the tables
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the catalog on first run
    let seeded = product::seed_products(&db, &app_config.products)
        .await
        .inspect_err(|e| error!("Failed to seed products: {}", e))?;
    if seeded == 0 {
        info!("Catalog already populated, skipping seed products");
    }

    // 6. Run the bot
    // DISCORD_BOT_TOKEN is read directly before use, never stored in AppConfig
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, Arc::new(app_config), db).await
}
