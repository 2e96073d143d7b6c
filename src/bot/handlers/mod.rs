//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions that run around the
//! commands themselves: parameter autocomplete and the login/role checks.

/// Login and role checks used as poise command checks
pub mod access;
/// Autocomplete handlers for product references and categories
pub mod autocomplete;
