//! Product business logic - Handles all catalog operations.
//!
//! This module provides functions for creating, looking up, editing and soft deleting
//! products, the atomic stock decrement used by the sell flow, in-memory fuzzy search
//! over a loaded catalog and the stock badge classification. All database functions
//! are async and return Result types for proper error handling throughout the system.

use crate::{
    config::StockThresholds,
    core::matcher::{fuzzy_match, normalize},
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Editable fields of a product, used for creation, updates and seeding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    /// Display name
    pub name: String,
    /// Manufacturer
    #[serde(default)]
    pub brand: String,
    /// Catalog category
    #[serde(default)]
    pub category: String,
    /// Cash price
    pub cash_price: f64,
    /// 6-installment price
    pub price_6: f64,
    /// 12-installment price
    pub price_12: f64,
    /// Units in stock
    #[serde(default)]
    pub stock: i64,
}

impl NewProduct {
    /// Checks the name, prices and stock.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The name is empty or whitespace-only
    /// - Any price is negative or not finite (NaN, infinity)
    /// - The stock is negative
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput {
                message: "Product name cannot be empty".to_string(),
            });
        }

        for price in [self.cash_price, self.price_6, self.price_12] {
            if price < 0.0 || !price.is_finite() {
                return Err(Error::InvalidAmount { amount: price });
            }
        }

        if self.stock < 0 {
            return Err(Error::InvalidQuantity {
                quantity: self.stock,
            });
        }

        Ok(())
    }
}

impl From<&product::Model> for NewProduct {
    fn from(model: &product::Model) -> Self {
        Self {
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

/// Stock badge shown next to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    /// At least `available_at` units
    Available,
    /// At least `limited_at` units
    Limited,
    /// Some units, fewer than `limited_at`
    Low,
    /// Nothing left
    OutOfStock,
}

impl StockLevel {
    /// Classifies a stock count against the configured thresholds.
    #[must_use]
    pub const fn classify(stock: i64, thresholds: StockThresholds) -> Self {
        if stock >= thresholds.available_at {
            Self::Available
        } else if stock >= thresholds.limited_at {
            Self::Limited
        } else if stock > 0 {
            Self::Low
        } else {
            Self::OutOfStock
        }
    }

    /// Short badge text for replies.
    #[must_use]
    pub fn badge(self, stock: i64) -> String {
        match self {
            Self::Available => "✅ Available".to_string(),
            Self::Limited => format!("⚠️ {stock} left"),
            Self::Low => format!("🔴 Only {stock}!"),
            Self::OutOfStock => "❌ Out of stock".to_string(),
        }
    }
}

/// Reference string for a product, as offered by autocomplete: `#12 Heladera 300L (Samsung)`.
#[must_use]
pub fn product_label(model: &product::Model) -> String {
    if model.brand.trim().is_empty() {
        format!("#{} {}", model.id, model.name)
    } else {
        format!("#{} {} ({})", model.id, model.name, model.brand)
    }
}

/// Extracts the id from a `#12 ...` reference.
#[must_use]
pub fn parse_product_reference(reference: &str) -> Option<i64> {
    let rest = reference.trim().strip_prefix('#')?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Retrieves all active (non-deleted) products, ordered alphabetically by name.
pub async fn get_all_active_products<C>(db: &C) -> Result<Vec<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find()
        .filter(product::Column::IsDeleted.eq(false))
        .order_by_asc(product::Column::Name)
        .order_by_asc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves an active product by its id, returning None if missing or deleted.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .filter(product::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every active product with exactly this name.
///
/// Names are not unique, so callers must handle more than one result.
pub async fn get_products_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::Name.eq(name.trim()))
        .filter(product::Column::IsDeleted.eq(false))
        .order_by_asc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Resolves a user-supplied product reference to a single active product.
///
/// `#<id>` references (as produced by autocomplete) are looked up by id. Anything
/// else is matched against product names, first exactly and then ignoring case
/// and accents.
///
/// # Errors
/// Returns `Error::ProductNotFound` when nothing matches and
/// `Error::AmbiguousProduct` when a name matches several products.
pub async fn resolve_product(db: &DatabaseConnection, reference: &str) -> Result<product::Model> {
    if let Some(id) = parse_product_reference(reference) {
        return get_product_by_id(db, id)
            .await?
            .ok_or_else(|| Error::ProductNotFound {
                name: reference.trim().to_string(),
            });
    }

    let mut matches = get_products_by_name(db, reference).await?;
    if matches.is_empty() {
        let wanted = normalize(reference);
        matches = get_all_active_products(db)
            .await?
            .into_iter()
            .filter(|p| normalize(&p.name) == wanted)
            .collect();
    }

    match matches.len() {
        0 => Err(Error::ProductNotFound {
            name: reference.trim().to_string(),
        }),
        1 => Ok(matches.remove(0)),
        count => Err(Error::AmbiguousProduct {
            reference: reference.trim().to_string(),
            count,
        }),
    }
}

/// Creates a new product after validating its fields.
///
/// # Errors
/// Returns an error if validation fails or the insert fails.
pub async fn create_product<C>(db: &C, new: NewProduct) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    new.validate()?;
    let now = chrono::Utc::now().naive_utc();

    let product = product::ActiveModel {
        name: Set(new.name.trim().to_string()),
        brand: Set(new.brand.trim().to_string()),
        category: Set(new.category.trim().to_string()),
        cash_price: Set(new.cash_price),
        price_6: Set(new.price_6),
        price_12: Set(new.price_12),
        stock: Set(new.stock),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

/// Replaces every editable field of an existing product.
///
/// # Errors
/// Returns an error if validation fails, the product does not exist or is
/// deleted, or the update fails.
pub async fn update_product<C>(db: &C, product_id: i64, new: NewProduct) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    new.validate()?;

    let mut product: product::ActiveModel = get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            name: product_id.to_string(),
        })?
        .into();

    product.name = Set(new.name.trim().to_string());
    product.brand = Set(new.brand.trim().to_string());
    product.category = Set(new.category.trim().to_string());
    product.cash_price = Set(new.cash_price);
    product.price_6 = Set(new.price_6);
    product.price_12 = Set(new.price_12);
    product.stock = Set(new.stock);
    product.updated_at = Set(chrono::Utc::now().naive_utc());

    product.update(db).await.map_err(Into::into)
}

/// Sets the stock of a product to an absolute count (inventory correction).
///
/// # Errors
/// Returns an error if the count is negative, the product does not exist or
/// the update fails.
pub async fn set_stock(db: &DatabaseConnection, product_id: i64, stock: i64) -> Result<product::Model> {
    if stock < 0 {
        return Err(Error::InvalidQuantity { quantity: stock });
    }

    let mut product: product::ActiveModel = get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            name: product_id.to_string(),
        })?
        .into();

    product.stock = Set(stock);
    product.updated_at = Set(chrono::Utc::now().naive_utc());
    product.update(db).await.map_err(Into::into)
}

/// Adds received units to a product's stock with a single atomic update.
///
/// # Errors
/// Returns an error if `quantity` is not positive or the product does not exist.
pub async fn restock<C>(db: &C, product_id: i64, quantity: i64) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    if quantity <= 0 {
        return Err(Error::InvalidQuantity { quantity });
    }

    let result = Product::update_many()
        .col_expr(
            product::Column::Stock,
            Expr::col(product::Column::Stock).add(quantity),
        )
        .col_expr(
            product::Column::UpdatedAt,
            Expr::value(chrono::Utc::now().naive_utc()),
        )
        .filter(product::Column::Id.eq(product_id))
        .filter(product::Column::IsDeleted.eq(false))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::ProductNotFound {
            name: product_id.to_string(),
        });
    }

    get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            name: product_id.to_string(),
        })
}

/// Removes `quantity` units from a product's stock.
///
/// The update only applies when the product is active and has at least
/// `quantity` units, in one conditional statement, so concurrent sales of the
/// same product cannot take stock below zero. A failed decrement changes nothing.
///
/// # Errors
/// Returns an error if:
/// - `quantity` is not positive
/// - The product does not exist or is deleted
/// - The product has fewer than `quantity` units
pub async fn decrement_stock<C>(db: &C, product_id: i64, quantity: i64) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    if quantity <= 0 {
        return Err(Error::InvalidQuantity { quantity });
    }

    let result = Product::update_many()
        .col_expr(
            product::Column::Stock,
            Expr::col(product::Column::Stock).sub(quantity),
        )
        .col_expr(
            product::Column::UpdatedAt,
            Expr::value(chrono::Utc::now().naive_utc()),
        )
        .filter(product::Column::Id.eq(product_id))
        .filter(product::Column::IsDeleted.eq(false))
        .filter(product::Column::Stock.gte(quantity))
        .exec(db)
        .await?;

    let product = get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            name: product_id.to_string(),
        })?;

    if result.rows_affected == 0 {
        warn!(
            product_id,
            available = product.stock,
            requested = quantity,
            "Rejected stock decrement"
        );
        return Err(Error::InsufficientStock {
            product: product.name,
            available: product.stock,
            requested: quantity,
        });
    }

    Ok(product)
}

/// Soft deletes a product, keeping its row so sales history still resolves its id.
///
/// # Errors
/// Returns an error if the product does not exist or is already deleted.
pub async fn delete_product<C>(db: &C, product_id: i64) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let mut product: product::ActiveModel = get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            name: product_id.to_string(),
        })?
        .into();

    product.is_deleted = Set(true);
    product.updated_at = Set(chrono::Utc::now().naive_utc());

    product.update(db).await.map_err(Into::into)
}

/// Inserts the configured seed products when the catalog has no active products.
///
/// Returns the number of products inserted (zero when the catalog was not empty).
pub async fn seed_products(db: &DatabaseConnection, seeds: &[NewProduct]) -> Result<usize> {
    if seeds.is_empty() || !get_all_active_products(db).await?.is_empty() {
        return Ok(0);
    }

    for seed in seeds {
        create_product(db, seed.clone()).await?;
    }
    info!("Seeded catalog with {} products", seeds.len());
    Ok(seeds.len())
}

/// Filters a loaded catalog by query and category.
///
/// A product is kept when the query fuzzy-matches its name or its brand, and,
/// if a category is given, its category equals it ignoring case and accents.
/// A blank query keeps every product of the category.
#[must_use]
pub fn search_products<'a>(
    products: &'a [product::Model],
    query: &str,
    category: Option<&str>,
    threshold: f64,
) -> Vec<&'a product::Model> {
    let category = category.map(normalize).filter(|c| !c.is_empty());
    let query_is_blank = query.trim().is_empty();

    products
        .iter()
        .filter(|p| {
            category
                .as_ref()
                .is_none_or(|wanted| normalize(&p.category) == *wanted)
        })
        .filter(|p| {
            query_is_blank
                || fuzzy_match(query, &p.name, threshold)
                || fuzzy_match(query, &p.brand, threshold)
        })
        .collect()
}

/// Distinct non-empty categories of a loaded catalog, sorted.
#[must_use]
pub fn list_categories(products: &[product::Model]) -> Vec<String> {
    let mut categories: Vec<String> = products
        .iter()
        .map(|p| p.category.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    categories.sort();
    categories.dedup();
    categories
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::matcher::DEFAULT_THRESHOLD;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_product(&db, new_product("   ", 10.0, 1)).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidInput { .. }));

        let mut negative = new_product("Heladera", 10.0, 1);
        negative.price_6 = -1.0;
        let result = create_product(&db, negative).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: -1.0 }
        ));

        let result = create_product(&db, new_product("Heladera", f64::NAN, 1)).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        let result = create_product(&db, new_product("Heladera", 10.0, -3)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidQuantity { quantity: -3 }
        ));

        assert!(get_all_active_products(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_decrement_rejects_non_positive_quantity() -> Result<()> {
        let db = setup_test_db().await?;

        for quantity in [0, -2] {
            let result = decrement_stock(&db, 1, quantity).await;
            assert!(matches!(
                result.unwrap_err(),
                Error::InvalidQuantity { quantity: q } if q == quantity
            ));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_get_product() -> Result<()> {
        let db = setup_test_db().await?;

        let created = create_product(&db, new_product("  Heladera 300L ", 3_500_000.0, 4)).await?;
        assert_eq!(created.name, "Heladera 300L");
        assert_eq!(created.stock, 4);
        assert!(!created.is_deleted);

        let found = get_product_by_id(&db, created.id).await?.unwrap();
        assert_eq!(found, created);
        assert!(get_product_by_id(&db, 999).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_decrement_more_than_stock_fails_and_keeps_stock() -> Result<()> {
        let (db, product) = setup_with_product(3).await?;

        let result = decrement_stock(&db, product.id, 5).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientStock {
                available: 3,
                requested: 5,
                ..
            }
        ));

        let after = get_product_by_id(&db, product.id).await?.unwrap();
        assert_eq!(after.stock, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_sequential_decrements() -> Result<()> {
        let (db, product) = setup_with_product(10).await?;

        decrement_stock(&db, product.id, 3).await?;
        let after = decrement_stock(&db, product.id, 3).await?;
        assert_eq!(after.stock, 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_decrement_to_exactly_zero() -> Result<()> {
        let (db, product) = setup_with_product(2).await?;

        let after = decrement_stock(&db, product.id, 2).await?;
        assert_eq!(after.stock, 0);

        let result = decrement_stock(&db, product.id, 1).await;
        assert!(matches!(result.unwrap_err(), Error::InsufficientStock { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_decrement_unknown_or_deleted_product() -> Result<()> {
        let (db, product) = setup_with_product(5).await?;

        let result = decrement_stock(&db, 999, 1).await;
        assert!(matches!(result.unwrap_err(), Error::ProductNotFound { .. }));

        delete_product(&db, product.id).await?;
        let result = decrement_stock(&db, product.id, 1).await;
        assert!(matches!(result.unwrap_err(), Error::ProductNotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_restock_and_set_stock() -> Result<()> {
        let (db, product) = setup_with_product(1).await?;

        let restocked = restock(&db, product.id, 6).await?;
        assert_eq!(restocked.stock, 7);

        let corrected = set_stock(&db, product.id, 2).await?;
        assert_eq!(corrected.stock, 2);

        assert!(matches!(
            restock(&db, product.id, 0).await.unwrap_err(),
            Error::InvalidQuantity { .. }
        ));
        assert!(matches!(
            set_stock(&db, product.id, -1).await.unwrap_err(),
            Error::InvalidQuantity { .. }
        ));
        assert!(matches!(
            restock(&db, 999, 1).await.unwrap_err(),
            Error::ProductNotFound { .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_product() -> Result<()> {
        let (db, product) = setup_with_product(5).await?;

        let mut edit = NewProduct::from(&product);
        edit.name = "Heladera 300L Inverter".to_string();
        edit.cash_price = 3_900_000.0;
        let updated = update_product(&db, product.id, edit).await?;

        assert_eq!(updated.id, product.id);
        assert_eq!(updated.name, "Heladera 300L Inverter");
        assert_eq!(updated.cash_price, 3_900_000.0);
        assert_eq!(updated.stock, 5);

        let result = update_product(&db, 999, NewProduct::from(&product)).await;
        assert!(matches!(result.unwrap_err(), Error::ProductNotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_product_hides_it() -> Result<()> {
        let (db, product) = setup_with_product(5).await?;

        let deleted = delete_product(&db, product.id).await?;
        assert!(deleted.is_deleted);
        assert!(get_all_active_products(&db).await?.is_empty());

        let result = delete_product(&db, product.id).await;
        assert!(matches!(result.unwrap_err(), Error::ProductNotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_product_by_id_name_and_ambiguity() -> Result<()> {
        let db = setup_test_db().await?;
        let tv = create_product(&db, new_product("Smart TV 50\"", 2_000_000.0, 3)).await?;
        let first = create_product(&db, new_product("Ventilador", 200_000.0, 3)).await?;
        create_product(&db, new_product("Ventilador", 250_000.0, 3)).await?;

        assert_eq!(resolve_product(&db, &product_label(&tv)).await?.id, tv.id);
        assert_eq!(resolve_product(&db, "Smart TV 50\"").await?.id, tv.id);
        assert_eq!(resolve_product(&db, "smart tv 50\"").await?.id, tv.id);
        assert_eq!(
            resolve_product(&db, &format!("#{}", first.id)).await?.id,
            first.id
        );

        assert!(matches!(
            resolve_product(&db, "Ventilador").await.unwrap_err(),
            Error::AmbiguousProduct { count: 2, .. }
        ));
        assert!(matches!(
            resolve_product(&db, "Lavarropas").await.unwrap_err(),
            Error::ProductNotFound { .. }
        ));
        assert!(matches!(
            resolve_product(&db, "#999").await.unwrap_err(),
            Error::ProductNotFound { .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_products_only_when_empty() -> Result<()> {
        let db = setup_test_db().await?;
        let seeds = vec![new_product("A", 1.0, 1), new_product("B", 2.0, 2)];

        assert_eq!(seed_products(&db, &seeds).await?, 2);
        assert_eq!(seed_products(&db, &seeds).await?, 0);
        assert_eq!(get_all_active_products(&db).await?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_parse_product_reference() {
        assert_eq!(parse_product_reference("#12 Heladera (LG)"), Some(12));
        assert_eq!(parse_product_reference("  #7"), Some(7));
        assert_eq!(parse_product_reference("Heladera"), None);
        assert_eq!(parse_product_reference("#abc"), None);
    }

    #[test]
    fn test_stock_level_classification() {
        let thresholds = StockThresholds::default();
        assert_eq!(StockLevel::classify(12, thresholds), StockLevel::Available);
        assert_eq!(StockLevel::classify(10, thresholds), StockLevel::Available);
        assert_eq!(StockLevel::classify(5, thresholds), StockLevel::Limited);
        assert_eq!(StockLevel::classify(4, thresholds), StockLevel::Low);
        assert_eq!(StockLevel::classify(1, thresholds), StockLevel::Low);
        assert_eq!(StockLevel::classify(0, thresholds), StockLevel::OutOfStock);
        assert_eq!(StockLevel::Low.badge(2), "🔴 Only 2!");
    }

    #[test]
    fn test_search_products_by_name_brand_and_category() {
        let catalog = vec![
            sample_model(1, "Heladera 300L", "Samsúng", "Heladeras"),
            sample_model(2, "Lavarropas 8kg", "LG", "Lavado"),
            sample_model(3, "Heladera Side by Side", "LG", "Heladeras"),
        ];

        let ids = |found: Vec<&product::Model>| found.iter().map(|p| p.id).collect::<Vec<_>>();

        assert_eq!(ids(search_products(&catalog, "heladra", None, DEFAULT_THRESHOLD)), vec![1, 3]);
        assert_eq!(ids(search_products(&catalog, "samsung", None, DEFAULT_THRESHOLD)), vec![1]);
        assert_eq!(ids(search_products(&catalog, "lg", Some("heladeras"), DEFAULT_THRESHOLD)), vec![3]);
        assert_eq!(ids(search_products(&catalog, "", Some("Lavado"), DEFAULT_THRESHOLD)), vec![2]);
        assert_eq!(search_products(&catalog, "", None, DEFAULT_THRESHOLD).len(), 3);
        assert!(search_products(&catalog, "xyz123", None, DEFAULT_THRESHOLD).is_empty());
    }

    #[test]
    fn test_list_categories_sorted_and_distinct() {
        let catalog = vec![
            sample_model(1, "A", "", "Lavado"),
            sample_model(2, "B", "", "Heladeras"),
            sample_model(3, "C", "", "Lavado"),
            sample_model(4, "D", "", " "),
        ];
        assert_eq!(list_categories(&catalog), vec!["Heladeras", "Lavado"]);
    }
}
