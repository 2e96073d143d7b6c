//! Catalog Store and Sales Ledger interfaces.
//!
//! The admin surface works on whole tables: it exports the full product table,
//! edits it elsewhere and writes it back. [`CatalogStore`] is that read-all /
//! write-all contract and [`SalesLedger`] is the append-only log of sales. The
//! `Db*` types implement both on top of the `SeaORM` connection.
//!
//! Imported rows go through best-effort numeric coercion: numbers pass
//! through, numeric text is parsed, and anything else becomes zero.

use crate::{
    core::{
        product::{self, NewProduct},
        sale::{self, NewSale},
    },
    entities::{product::Model as ProductModel, sale::Model as SaleModel},
    errors::{Error, Result},
};
use async_trait::async_trait;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::info;

/// One row of the full product table.
///
/// Keys may use either the snake_case names below or the spreadsheet headers
/// (`PRODUCTO`, `MARCA`, `CATEGORIA`, `CONTADO`, `6 CUOTAS`, `12 CUOTAS`, `STOCK`).
/// Every column except `id` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    /// Product id; absent for new rows
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "coerce_id"
    )]
    pub id: Option<i64>,
    /// Display name
    #[serde(alias = "PRODUCTO", deserialize_with = "coerce_text")]
    pub name: String,
    /// Manufacturer
    #[serde(alias = "MARCA", deserialize_with = "coerce_text")]
    pub brand: String,
    /// Catalog category
    #[serde(alias = "CATEGORIA", deserialize_with = "coerce_text")]
    pub category: String,
    /// Cash price
    #[serde(alias = "CONTADO", deserialize_with = "coerce_price")]
    pub cash_price: f64,
    /// 6-installment price
    #[serde(alias = "6 CUOTAS", deserialize_with = "coerce_price")]
    pub price_6: f64,
    /// 12-installment price
    #[serde(alias = "12 CUOTAS", deserialize_with = "coerce_price")]
    pub price_12: f64,
    /// Units in stock
    #[serde(alias = "STOCK", deserialize_with = "coerce_stock")]
    pub stock: i64,
}

impl From<&ProductModel> for ProductRow {
    fn from(model: &ProductModel) -> Self {
        Self {
            id: Some(model.id),
            name: model.name.clone(),
            brand: model.brand.clone(),
            category: model.category.clone(),
            cash_price: model.cash_price,
            price_6: model.price_6,
            price_12: model.price_12,
            stock: model.stock,
        }
    }
}

impl From<&ProductRow> for NewProduct {
    fn from(row: &ProductRow) -> Self {
        Self {
            name: row.name.clone(),
            brand: row.brand.clone(),
            category: row.category.clone(),
            cash_price: row.cash_price,
            price_6: row.price_6,
            price_12: row.price_12,
            stock: row.stock,
        }
    }
}

/// Parses a JSON array of product rows.
///
/// # Errors
/// Returns `Error::InvalidCatalog` if the text is not a JSON array of objects
/// with all required columns.
pub fn parse_product_rows(json: &str) -> Result<Vec<ProductRow>> {
    serde_json::from_str(json).map_err(|e| Error::InvalidCatalog {
        message: e.to_string(),
    })
}

/// Serializes product rows as a pretty-printed JSON array.
///
/// # Errors
/// Returns `Error::InvalidCatalog` if serialization fails.
pub fn render_product_rows(rows: &[ProductRow]) -> Result<String> {
    serde_json::to_string_pretty(rows).map_err(|e| Error::InvalidCatalog {
        message: e.to_string(),
    })
}

/// Serializes ledger rows as a pretty-printed JSON array.
///
/// # Errors
/// Returns `Error::Json` if serialization fails.
pub fn render_sales(rows: &[SaleModel]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}

/// What a full-table write changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogWriteSummary {
    /// Rows stored as new products
    pub inserted: usize,
    /// Existing products whose fields changed
    pub updated: usize,
    /// Existing products written back unchanged
    pub unchanged: usize,
    /// Active products missing from the table, now soft-deleted
    pub removed: usize,
}

/// Full product table, read and written as a whole.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Every active product as a table row.
    async fn read_all(&self) -> Result<Vec<ProductRow>>;

    /// Replaces the active catalog with `rows`.
    ///
    /// Rows with a known id update that product, other rows become new
    /// products and active products not present in `rows` are removed. An
    /// invalid row aborts the write and leaves the catalog unchanged.
    async fn write_all(&self, rows: Vec<ProductRow>) -> Result<CatalogWriteSummary>;
}

/// Append-only log of completed sales.
#[async_trait]
pub trait SalesLedger: Send + Sync {
    /// Every ledger row, oldest first.
    async fn read_all(&self) -> Result<Vec<SaleModel>>;

    /// Stores one ledger row.
    async fn append(&self, record: NewSale) -> Result<SaleModel>;
}

/// [`CatalogStore`] backed by the products table.
#[derive(Debug, Clone)]
pub struct DbCatalog {
    db: DatabaseConnection,
}

impl DbCatalog {
    /// Wraps a database connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogStore for DbCatalog {
    async fn read_all(&self) -> Result<Vec<ProductRow>> {
        let products = product::get_all_active_products(&self.db).await?;
        Ok(products.iter().map(ProductRow::from).collect())
    }

    async fn write_all(&self, rows: Vec<ProductRow>) -> Result<CatalogWriteSummary> {
        let mut seen_ids = HashSet::new();
        for (index, row) in rows.iter().enumerate() {
            NewProduct::from(row).validate().map_err(|e| Error::InvalidCatalog {
                message: format!("row {}: {e}", index + 1),
            })?;
            if let Some(id) = row.id {
                if !seen_ids.insert(id) {
                    return Err(Error::InvalidCatalog {
                        message: format!("row {}: duplicate id {id}", index + 1),
                    });
                }
            }
        }

        let txn = self.db.begin().await?;

        let existing: HashMap<i64, ProductModel> = product::get_all_active_products(&txn)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut summary = CatalogWriteSummary::default();
        let mut kept = HashSet::new();

        for row in &rows {
            let new = NewProduct::from(row);
            match row.id.and_then(|id| existing.get(&id)) {
                Some(current) => {
                    kept.insert(current.id);
                    if NewProduct::from(current) == new {
                        summary.unchanged += 1;
                    } else {
                        product::update_product(&txn, current.id, new).await?;
                        summary.updated += 1;
                    }
                }
                None => {
                    product::create_product(&txn, new).await?;
                    summary.inserted += 1;
                }
            }
        }

        for id in existing.keys().filter(|id| !kept.contains(*id)) {
            product::delete_product(&txn, *id).await?;
            summary.removed += 1;
        }

        txn.commit().await?;

        info!(
            inserted = summary.inserted,
            updated = summary.updated,
            unchanged = summary.unchanged,
            removed = summary.removed,
            "Catalog table written"
        );
        Ok(summary)
    }
}

/// [`SalesLedger`] backed by the sales table.
#[derive(Debug, Clone)]
pub struct DbLedger {
    db: DatabaseConnection,
}

impl DbLedger {
    /// Wraps a database connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SalesLedger for DbLedger {
    async fn read_all(&self) -> Result<Vec<SaleModel>> {
        sale::get_all_sales(&self.db).await
    }

    async fn append(&self, record: NewSale) -> Result<SaleModel> {
        sale::append_sale(&self.db, record).await
    }
}

fn coerce_id<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().trim_start_matches('#').parse().ok(),
        _ => None,
    })
}

fn coerce_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn coerce_price<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(coerce_number(&Value::deserialize(deserializer)?))
}

fn coerce_stock<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if let Some(n) = value.as_i64() {
        return Ok(n);
    }
    // Cast safety: spreadsheet stock counts are small whole numbers stored as floats
    #[allow(clippy::cast_possible_truncation)]
    let stock = coerce_number(&value).trunc() as i64;
    Ok(stock)
}

/// Best-effort number from a JSON value; zero when nothing sensible is found.
///
/// Numeric text is parsed as-is first; failing that, everything except digits
/// and a leading minus is dropped, so `"3.500.000"` and `"Gs. 1,250,000"` read
/// as whole amounts.
#[must_use]
pub fn coerce_number(value: &Value) -> f64 {
    let number = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_number_text(s),
        _ => 0.0,
    };
    if number.is_finite() { number } else { 0.0 }
}

fn parse_number_text(text: &str) -> f64 {
    let text = text.trim();
    if let Ok(number) = text.parse::<f64>() {
        return number;
    }

    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0.0;
    }
    let magnitude = digits.parse::<f64>().unwrap_or(0.0);
    if text.starts_with('-') { -magnitude } else { magnitude }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::sale::PaymentPlan;
    use crate::test_utils::*;
    use serde_json::json;

    fn row(id: Option<i64>, name: &str, cash: f64, stock: i64) -> ProductRow {
        ProductRow {
            id,
            name: name.to_string(),
            brand: "LG".to_string(),
            category: "Heladeras".to_string(),
            cash_price: cash,
            price_6: cash * 1.1,
            price_12: cash * 1.2,
            stock,
        }
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(1500)), 1500.0);
        assert_eq!(coerce_number(&json!(12.5)), 12.5);
        assert_eq!(coerce_number(&json!("250000")), 250_000.0);
        assert_eq!(coerce_number(&json!("3.500.000")), 3_500_000.0);
        assert_eq!(coerce_number(&json!("Gs. 1,250,000")), 1_250_000.0);
        assert_eq!(coerce_number(&json!("-20")), -20.0);
        assert_eq!(coerce_number(&json!("consultar")), 0.0);
        assert_eq!(coerce_number(&json!(null)), 0.0);
        assert_eq!(coerce_number(&json!(true)), 0.0);
        assert_eq!(coerce_number(&json!("NaN")), 0.0);
    }

    #[test]
    fn test_parse_spreadsheet_headers_with_coercion() {
        let json = r#"[
            {"PRODUCTO": "Heladera 300L", "MARCA": "Samsung", "CATEGORIA": "Heladeras",
             "CONTADO": "3.500.000", "6 CUOTAS": 3900000, "12 CUOTAS": "n/a", "STOCK": 4.0},
            {"id": 7, "name": "Ventilador", "brand": "Tokyo", "category": 12,
             "cash_price": 200000, "price_6": 230000, "price_12": 260000, "stock": "sin dato"}
        ]"#;

        let rows = parse_product_rows(json).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].id, None);
        assert_eq!(rows[0].name, "Heladera 300L");
        assert_eq!(rows[0].cash_price, 3_500_000.0);
        assert_eq!(rows[0].price_6, 3_900_000.0);
        assert_eq!(rows[0].price_12, 0.0);
        assert_eq!(rows[0].stock, 4);

        assert_eq!(rows[1].id, Some(7));
        assert_eq!(rows[1].category, "12");
        assert_eq!(rows[1].stock, 0);
    }

    #[test]
    fn test_parse_rejects_missing_columns() {
        let json = r#"[{"name": "Heladera", "brand": "LG"}]"#;
        assert!(matches!(
            parse_product_rows(json).unwrap_err(),
            Error::InvalidCatalog { .. }
        ));
        assert!(matches!(
            parse_product_rows("not json").unwrap_err(),
            Error::InvalidCatalog { .. }
        ));
    }

    #[tokio::test]
    async fn test_read_all_then_write_back_is_a_no_op() -> Result<()> {
        let (db, _product) = setup_with_product(5).await?;
        let catalog = DbCatalog::new(db.clone());

        let rows = catalog.read_all().await?;
        let json = render_product_rows(&rows)?;
        let summary = catalog.write_all(parse_product_rows(&json)?).await?;

        assert_eq!(
            summary,
            CatalogWriteSummary {
                unchanged: 1,
                ..Default::default()
            }
        );
        assert_eq!(catalog.read_all().await?, rows);
        Ok(())
    }

    #[tokio::test]
    async fn test_write_all_inserts_updates_and_removes() -> Result<()> {
        let db = setup_test_db().await?;
        let kept = product::create_product(&db, new_product("Heladera", 100.0, 5)).await?;
        let dropped = product::create_product(&db, new_product("Cocina", 50.0, 2)).await?;
        let catalog = DbCatalog::new(db.clone());

        let summary = catalog
            .write_all(vec![
                row(Some(kept.id), "Heladera", 120.0, 8),
                row(None, "Microondas", 80.0, 3),
                row(Some(9_999), "Freezer", 90.0, 1),
            ])
            .await?;

        assert_eq!(summary.updated, 1);
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.removed, 1);

        let updated = product::get_product_by_id(&db, kept.id).await?.unwrap();
        assert_eq!(updated.cash_price, 120.0);
        assert_eq!(updated.stock, 8);
        assert!(product::get_product_by_id(&db, dropped.id).await?.is_none());

        let names: Vec<String> = catalog.read_all().await?.into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Freezer", "Heladera", "Microondas"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_write_all_invalid_row_changes_nothing() -> Result<()> {
        let (db, product) = setup_with_product(5).await?;
        let catalog = DbCatalog::new(db.clone());
        let before = catalog.read_all().await?;

        let result = catalog
            .write_all(vec![
                row(None, "Microondas", 80.0, 3),
                row(Some(product.id), "Heladera", -1.0, 5),
            ])
            .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidCatalog { .. }));

        let result = catalog
            .write_all(vec![
                row(Some(product.id), "A", 1.0, 1),
                row(Some(product.id), "B", 1.0, 1),
            ])
            .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidCatalog { .. }));

        assert_eq!(catalog.read_all().await?, before);
        Ok(())
    }

    #[tokio::test]
    async fn test_store_handles_share_one_database() -> Result<()> {
        let (db, product) = setup_with_product(5).await?;
        let catalog = DbCatalog::new(db.clone());
        let copy = catalog.clone();

        product::restock(&db, product.id, 2).await?;
        assert_eq!(copy.read_all().await?[0].stock, 7);
        assert_eq!(catalog.read_all().await?, copy.read_all().await?);

        let ledger = DbLedger::new(db);
        assert!(ledger.clone().read_all().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_ledger_append_and_read() -> Result<()> {
        let db = setup_test_db().await?;
        let ledger = DbLedger::new(db);

        let stored = ledger
            .append(NewSale {
                seller: "vendedor".to_string(),
                product_id: 1,
                product_name: "Heladera".to_string(),
                quantity: 2,
                payment_plan: PaymentPlan::SixInstallments,
                unit_price: 150.0,
            })
            .await?;
        assert_eq!(stored.total, 300.0);
        assert_eq!(stored.payment_plan, "6");

        let rows = ledger.read_all().await?;
        assert_eq!(rows, vec![stored]);

        let json = render_sales(&rows)?;
        assert!(json.contains("\"payment_plan\": \"6\""));
        assert!(json.contains("\"seller\": \"vendedor\""));
        Ok(())
    }
}
