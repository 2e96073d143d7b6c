//! Product entity - One row of the store catalog.
//!
//! Each product has a name, brand and category, three price tiers (cash,
//! 6 installments, 12 installments) and the units currently in stock.
//! The integer `id` is the product's identity; names may repeat.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Immutable surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Heladera 300L No Frost")
    pub name: String,
    /// Manufacturer (e.g., "Samsung")
    pub brand: String,
    /// Catalog category (e.g., "Heladeras")
    pub category: String,
    /// Unit price when paying cash
    pub cash_price: f64,
    /// Unit price when paying in 6 installments
    pub price_6: f64,
    /// Unit price when paying in 12 installments
    pub price_12: f64,
    /// Units in stock, never negative
    pub stock: i64,
    /// Soft delete flag - if true, product is hidden but sales history keeps its id
    pub is_deleted: bool,
    /// When the product was created
    pub created_at: DateTime,
    /// When the product was last modified
    pub updated_at: DateTime,
}

/// Products have no enforced relations; sales reference them by id and name.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
