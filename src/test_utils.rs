//! Shared test utilities for POS Buddy.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test products with sensible defaults.

use crate::{
    core::product::{self, NewProduct},
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::path::PathBuf;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a file-backed `SQLite` database in the temp directory with all
/// tables initialized, for tests that need several connections at once.
/// Returns (db, path); the caller removes the file when done.
pub async fn setup_file_db(label: &str) -> Result<(DatabaseConnection, PathBuf)> {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let path = std::env::temp_dir().join(format!(
        "pos_buddy_{label}_{}_{nanos}.sqlite",
        std::process::id()
    ));
    let db = sea_orm::Database::connect(format!("sqlite://{}?mode=rwc", path.display())).await?;
    crate::config::database::create_tables(&db).await?;
    Ok((db, path))
}

/// Product fields with sensible defaults.
///
/// # Defaults
/// * `brand`: "LG"
/// * `category`: "Heladeras"
/// * `price_6`: cash price + 10%
/// * `price_12`: cash price + 20%
#[must_use]
pub fn new_product(name: &str, cash_price: f64, stock: i64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        brand: "LG".to_string(),
        category: "Heladeras".to_string(),
        cash_price,
        price_6: cash_price * 1.1,
        price_12: cash_price * 1.2,
        stock,
    }
}

/// An unsaved product model for pure functions (search, reports).
#[must_use]
pub fn sample_model(id: i64, name: &str, brand: &str, category: &str) -> entities::product::Model {
    let now = chrono::Utc::now().naive_utc();
    entities::product::Model {
        id,
        name: name.to_string(),
        brand: brand.to_string(),
        category: category.to_string(),
        cash_price: 1_000_000.0,
        price_6: 1_150_000.0,
        price_12: 1_300_000.0,
        stock: 10,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    }
}

/// Sets up a database holding one product with the given stock.
/// Returns (db, product) for stock and sale tests.
pub async fn setup_with_product(
    stock: i64,
) -> Result<(DatabaseConnection, entities::product::Model)> {
    let db = setup_test_db().await?;
    let created = product::create_product(
        &db,
        NewProduct {
            name: "Heladera 300L No Frost".to_string(),
            brand: "Samsung".to_string(),
            category: "Heladeras".to_string(),
            cash_price: 3_500_000.0,
            price_6: 3_900_000.0,
            price_12: 4_300_000.0,
            stock,
        },
    )
    .await?;
    Ok((db, created))
}
