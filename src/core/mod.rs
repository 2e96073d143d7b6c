//! Core business logic, independent of the chat framework.

/// Diacritic-insensitive approximate text matching
pub mod matcher;
/// Catalog operations and the atomic stock decrement
pub mod product;
/// Sales summaries and inventory overview
pub mod report;
/// Sell flow and sales ledger
pub mod sale;
/// Credential gate and in-memory sessions
pub mod session;
/// Catalog Store and Sales Ledger interfaces
pub mod store;
