//! Sale entity - One row of the append-only sales ledger.
//!
//! `product_name` is copied from the catalog at sale time so the ledger
//! still reads correctly after a product is renamed or deleted.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sale database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    /// Unique identifier for the sale
    #[sea_orm(primary_key)]
    pub id: i64,
    /// When the sale was confirmed
    pub timestamp: DateTimeUtc,
    /// Username of the seller who confirmed the sale
    pub seller: String,
    /// Product id at the time of sale
    pub product_id: i64,
    /// Product name at the time of sale
    pub product_name: String,
    /// Units sold
    pub quantity: i64,
    /// Payment plan selector: `"cash"`, `"6"` or `"12"`
    pub payment_plan: String,
    /// Unit price of the selected plan
    pub unit_price: f64,
    /// `unit_price * quantity`
    pub total: f64,
}

/// The ledger has no enforced relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
