//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for POS Buddy, including all slash
//! commands, autocomplete and access-check handlers, and the shared bot context.

/// Slash-command choice enums (payment plan, report period)
pub mod choices;
/// Discord command implementations (general, session, product, manage, report)
pub mod commands;
/// Discord interaction handlers (autocomplete, access checks)
pub mod handlers;

use crate::{
    config::AppConfig,
    core::{
        session::SessionStore,
        store::{DbCatalog, DbLedger},
    },
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Embed accent color shared by all replies
pub const EMBED_COLOR: u32 = 0x0058_65F2;

/// Shared data available to all bot commands.
/// This structure holds the database connection, the loaded configuration,
/// the login sessions, and the table-level store handles.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Shop details, thresholds and the credential table
    pub config: Arc<AppConfig>,
    /// Logged-in users
    pub sessions: SessionStore,
    /// Full-table access to the catalog
    pub catalog: DbCatalog,
    /// Append-only access to the sales ledger
    pub ledger: DbLedger,
}

impl BotData {
    /// Creates a new `BotData` instance with no active sessions.
    #[must_use]
    pub fn new(database: DatabaseConnection, config: Arc<AppConfig>) -> Self {
        Self {
            catalog: DbCatalog::new(database.clone()),
            ledger: DbLedger::new(database.clone()),
            sessions: SessionStore::new(),
            database,
            config,
        }
    }
}

/// Every slash command the bot registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::store_info(),
        commands::login(),
        commands::logout(),
        commands::whoami(),
        commands::search(),
        commands::product_info(),
        commands::sell(),
        commands::my_sales(),
        commands::sales(),
        commands::inventory(),
        commands::manage(),
    ]
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            let reply = poise::CreateReply::default()
                .content("❌ Something went wrong, nothing was changed. Please try again.")
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!("Failed to send error message: {}", e);
            }
        }
        poise::FrameworkError::CommandCheckFailed {
            error: Some(error),
            ctx,
            ..
        } => {
            let reply = poise::CreateReply::default()
                .content(format!("🔒 {error}"))
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!("Failed to send check failure message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Connects to Discord, registers the commands globally and serves until the
/// gateway connection ends.
#[instrument(skip(token, config, database))]
pub async fn run_bot(
    token: String,
    config: Arc<AppConfig>,
    database: DatabaseConnection,
) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!(
                    "Registered {} commands globally",
                    framework.options().commands.len()
                );
                Ok(BotData::new(database, config))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot client...");
    client.start().await?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;
