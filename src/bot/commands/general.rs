//! General Discord commands - ping, help and store details.
//! This module contains simple commands that don't require a login and provide
//! basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, EMBED_COLOR},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Responds with "Pong!" to test bot connectivity.
    ///
    /// This is a simple health check command that doesn't require any database operations.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = format!(
            "**{} Help**\n\
            Here is a summary of all available commands.\n\n\
            **Session**\n\
            • `/login <username> <password>` - Starts a session (only you see the reply).\n\
            • `/logout` - Ends your session.\n\
            • `/whoami` - Shows who you are logged in as.\n\n\
            **Selling** (login required)\n\
            • `/search [query] [category]` - Finds products, typos and accents welcome.\n\
            • `/product <product>` - Shows prices and stock of one product.\n\
            • `/sell <product> [quantity] [plan]` - Sells and updates stock.\n\
            • `/my_sales` - Your latest sales.\n\n\
            **Admin**\n\
            • `/sales [period] [export]` - Sales summary, optionally with the ledger as JSON.\n\
            • `/inventory` - Stock overview and restock alerts.\n\
            • `/manage product <subcommand>` - Add, update, stock, delete, list.\n\
            • `/manage catalog <subcommand>` - Export or import the whole catalog as JSON.\n\n\
            **Utility**\n\
            • `/store` - Shop details.\n\
            • `/ping` - Checks if the bot is responsive.\n\
            • `/help` - Shows this help message.",
            ctx.data().config.store.name
        );

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows the shop name, address and phone.
    #[poise::command(slash_command, rename = "store")]
    pub async fn store_info(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let store = &ctx.data().config.store;

        let mut embed = serenity::CreateEmbed::default()
            .title(format!("🏬 {}", store.name))
            .color(EMBED_COLOR);
        if !store.address.is_empty() {
            embed = embed.field("📍 Address", &store.address, false);
        }
        if !store.phone.is_empty() {
            embed = embed.field("📞 Phone", &store.phone, false);
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
