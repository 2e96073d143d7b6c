//! Command checks backed by the session store.
//!
//! A failed check surfaces as `FrameworkError::CommandCheckFailed` carrying the
//! reason, which the error hook turns into an ephemeral reply.

use crate::{
    bot::BotData,
    core::session::{Role, Session},
    errors::{Error, Result},
};

/// The caller's session, provided it allows `role`.
///
/// # Errors
/// Returns `Error::NotLoggedIn` or `Error::PermissionDenied`.
pub async fn session_for(ctx: poise::Context<'_, BotData, Error>, role: Role) -> Result<Session> {
    ctx.data()
        .sessions
        .require(ctx.author().id.get(), role)
        .await
}

/// Passes for any logged-in user.
///
/// # Errors
/// Returns `Error::NotLoggedIn` when the caller has no session.
pub async fn require_seller(ctx: poise::Context<'_, BotData, Error>) -> Result<bool> {
    session_for(ctx, Role::Seller).await.map(|_| true)
}

/// Passes for logged-in admins.
///
/// # Errors
/// Returns `Error::NotLoggedIn` or `Error::PermissionDenied`.
pub async fn require_admin(ctx: poise::Context<'_, BotData, Error>) -> Result<bool> {
    session_for(ctx, Role::Admin).await.map(|_| true)
}
