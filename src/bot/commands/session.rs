//! Session commands - `/login`, `/logout` and `/whoami`.
//!
//! Replies are ephemeral so credentials and session details stay out of the
//! channel history.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    async fn reply_private(ctx: poise::Context<'_, BotData, Error>, text: String) -> Result<()> {
        ctx.send(poise::CreateReply::default().content(text).ephemeral(true))
            .await?;
        Ok(())
    }

    /// Logs in with a username and password from the store's user table.
    #[poise::command(slash_command)]
    pub async fn login(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Your username"] username: String,
        #[description = "Your password"] password: String,
    ) -> Result<()> {
        let data = ctx.data();

        match data
            .sessions
            .login(ctx.author().id.get(), &data.config.users, &username, &password)
            .await
        {
            Ok(session) => {
                reply_private(
                    ctx,
                    format!(
                        "✅ Welcome, **{}**! You are logged in as {}.",
                        session.display_name,
                        session.role.label()
                    ),
                )
                .await
            }
            Err(Error::InvalidCredentials) => {
                reply_private(ctx, "❌ Invalid username or password.".to_string()).await
            }
            Err(e) => Err(e),
        }
    }

    /// Ends the current session.
    #[poise::command(slash_command)]
    pub async fn logout(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let text = match ctx.data().sessions.logout(ctx.author().id.get()).await {
            Some(session) => format!("👋 Goodbye, {}.", session.display_name),
            None => "ℹ️ You were not logged in.".to_string(),
        };
        reply_private(ctx, text).await
    }

    /// Shows the account behind the current session.
    #[poise::command(slash_command)]
    pub async fn whoami(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let text = match ctx.data().sessions.current(ctx.author().id.get()).await {
            Some(session) => format!(
                "👤 **{}** (`{}`), role: {}, since {}",
                session.display_name,
                session.username,
                session.role.label(),
                session
                    .logged_in_at
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
            ),
            None => "ℹ️ You are not logged in. Use `/login`.".to_string(),
        };
        reply_private(ctx, text).await
    }
}

// Re-export all commands
pub use inner::*;
