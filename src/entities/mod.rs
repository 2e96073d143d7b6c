//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables.
//! Each entity has a Model struct for data and an Entity struct for operations.

/// Catalog rows
pub mod product;
/// Sales ledger rows
pub mod sale;

// Re-export specific types to avoid conflicts
pub use product::{Entity as Product, Model as ProductModel};
pub use sale::{Entity as Sale, Model as SaleModel};
