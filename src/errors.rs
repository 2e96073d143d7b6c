//! Unified error type for POS Buddy.
//!
//! Core operations return [`Result`] with one of these variants; the bot layer
//! turns the expected ones (insufficient stock, unknown product, bad login)
//! into inline replies and lets the rest bubble up to the framework error hook.

use thiserror::Error;

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file or environment problem
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Error reported by the database layer
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A price or money amount that is negative or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// A quantity or stock count that is out of range
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: i64,
    },

    /// Any other rejected user input (empty names and the like)
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input
        message: String,
    },

    /// No active product matches the given reference
    #[error("Product not found: {name}")]
    ProductNotFound {
        /// Name, id or reference that was looked up
        name: String,
    },

    /// A name reference matches more than one product
    #[error("'{reference}' matches {count} products, use the #id form")]
    AmbiguousProduct {
        /// The reference that was looked up
        reference: String,
        /// How many active products share it
        count: usize,
    },

    /// The sale would take stock below zero
    #[error("Insufficient stock for '{product}': {available} available, {requested} requested")]
    InsufficientStock {
        /// Product name
        product: String,
        /// Units currently in stock
        available: i64,
        /// Units requested
        requested: i64,
    },

    /// Unknown payment plan selector
    #[error("Invalid payment plan: {value}")]
    InvalidPaymentPlan {
        /// The rejected selector
        value: String,
    },

    /// Username/password pair not found in the credential table
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The caller has no active session
    #[error("You need to /login first")]
    NotLoggedIn,

    /// The caller's role does not allow the action
    #[error("Permission denied: {message}")]
    PermissionDenied {
        /// What was refused
        message: String,
    },

    /// A catalog table that could not be parsed
    #[error("Invalid catalog data: {message}")]
    InvalidCatalog {
        /// Parser message
        message: String,
    },

    /// JSON encoding failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Failure while building a reply
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),


    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Whether the error is a rejected request the user can fix, as opposed to
    /// a failure of the bot or its storage.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount { .. }
                | Self::InvalidQuantity { .. }
                | Self::InvalidInput { .. }
                | Self::ProductNotFound { .. }
                | Self::AmbiguousProduct { .. }
                | Self::InsufficientStock { .. }
                | Self::InvalidPaymentPlan { .. }
                | Self::InvalidCredentials
                | Self::NotLoggedIn
                | Self::PermissionDenied { .. }
                | Self::InvalidCatalog { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
