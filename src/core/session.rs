//! Login gate and in-memory sessions.
//!
//! Credentials come from the static `[[users]]` table in `config.toml`. A
//! successful login binds the chat user to a [`Session`] until they log out
//! or the process restarts.

use crate::{
    config::UserConfig,
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// What a logged-in user may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Catalog management, bulk edits and reports, plus everything a seller can do
    Admin,
    /// Search and sell
    #[serde(alias = "vendedor")]
    Seller,
}

impl Role {
    /// Whether this role may perform actions that require `required`.
    #[must_use]
    pub const fn allows(self, required: Self) -> bool {
        matches!((self, required), (Self::Admin, _) | (Self::Seller, Self::Seller))
    }

    /// Human readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Seller => "seller",
        }
    }
}

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Login name, recorded as the seller on sales
    pub username: String,
    /// Name shown in replies
    pub display_name: String,
    /// Granted role
    pub role: Role,
    /// When the login happened
    pub logged_in_at: DateTime<Utc>,
}

/// Looks up a username/password pair in the credential table.
///
/// # Errors
/// Returns `Error::InvalidCredentials` when no entry matches both.
pub fn authenticate<'a>(
    users: &'a [UserConfig],
    username: &str,
    password: &str,
) -> Result<&'a UserConfig> {
    users
        .iter()
        .find(|u| u.username == username.trim() && u.password == password)
        .ok_or(Error::InvalidCredentials)
}

/// Sessions keyed by chat user id.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<u64, Session>>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Authenticates and binds the session to `user_id`, replacing any previous one.
    ///
    /// # Errors
    /// Returns `Error::InvalidCredentials` if the pair is not in `users`.
    pub async fn login(
        &self,
        user_id: u64,
        users: &[UserConfig],
        username: &str,
        password: &str,
    ) -> Result<Session> {
        let account = authenticate(users, username, password).inspect_err(|_| {
            warn!(user_id, username, "Failed login attempt");
        })?;

        let session = Session {
            username: account.username.clone(),
            display_name: account.display_name().to_string(),
            role: account.role,
            logged_in_at: Utc::now(),
        };

        self.sessions.write().await.insert(user_id, session.clone());
        info!(user_id, username = %session.username, role = session.role.label(), "User logged in");
        Ok(session)
    }

    /// Ends the session of `user_id`, returning it if there was one.
    pub async fn logout(&self, user_id: u64) -> Option<Session> {
        let session = self.sessions.write().await.remove(&user_id);
        if let Some(s) = &session {
            info!(user_id, username = %s.username, "User logged out");
        }
        session
    }

    /// The active session of `user_id`, if any.
    pub async fn current(&self, user_id: u64) -> Option<Session> {
        self.sessions.read().await.get(&user_id).cloned()
    }

    /// The active session of `user_id`, provided its role allows `required`.
    ///
    /// # Errors
    /// Returns `Error::NotLoggedIn` without a session and
    /// `Error::PermissionDenied` when the role is insufficient.
    pub async fn require(&self, user_id: u64, required: Role) -> Result<Session> {
        let session = self.current(user_id).await.ok_or(Error::NotLoggedIn)?;
        if session.role.allows(required) {
            Ok(session)
        } else {
            Err(Error::PermissionDenied {
                message: format!("this action needs the {} role", required.label()),
            })
        }
    }
}
