//! `POS Buddy` - Point of sale and inventory for a small appliance store
//!
//! This crate keeps the product catalog (three price tiers and stock per product) and an
//! append-only sales ledger in `SQLite`, and exposes search, selling and admin reporting
//! as Discord slash commands behind a simple username/password gate.

#![deny(unsafe_code, unused_must_use, rustdoc::broken_intra_doc_links)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::float_cmp,
    clippy::dbg_macro,
    clippy::todo
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

/// Discord bot interface - commands, handlers, and bot context
pub mod bot;
/// Configuration management for database and application settings
pub mod config;
/// Core business logic - framework-agnostic catalog, sale, session, and reporting operations
pub mod core;
/// SeaORM entity definitions for database tables
pub mod entities;
/// Unified error types and result handling
pub mod errors;

#[cfg(test)]
pub mod test_utils;
