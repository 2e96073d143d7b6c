//! Sale business logic - The sell flow and the append-only sales ledger.
//!
//! A sale decrements product stock and appends one ledger row inside a single
//! database transaction: either both happen or neither does. Ledger rows are
//! never updated or deleted.

use crate::{
    core::product,
    entities::{Sale, sale},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use std::{fmt, str::FromStr};
use tracing::info;

/// Price tier selected at sale time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PaymentPlan {
    /// Single cash payment
    Cash,
    /// Six monthly installments
    SixInstallments,
    /// Twelve monthly installments
    TwelveInstallments,
}

impl PaymentPlan {
    /// All plans, in display order.
    pub const ALL: [Self; 3] = [
        Self::Cash,
        Self::SixInstallments,
        Self::TwelveInstallments,
    ];

    /// Value stored in the ledger's `payment_plan` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::SixInstallments => "6",
            Self::TwelveInstallments => "12",
        }
    }

    /// Human readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::SixInstallments => "6 installments",
            Self::TwelveInstallments => "12 installments",
        }
    }

    /// Unit price of `product` under this plan.
    #[must_use]
    pub const fn unit_price(self, product: &crate::entities::product::Model) -> f64 {
        match self {
            Self::Cash => product.cash_price,
            Self::SixInstallments => product.price_6,
            Self::TwelveInstallments => product.price_12,
        }
    }
}

impl fmt::Display for PaymentPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentPlan {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "contado" => Ok(Self::Cash),
            "6" | "6 cuotas" | "six" => Ok(Self::SixInstallments),
            "12" | "12 cuotas" | "twelve" => Ok(Self::TwelveInstallments),
            _ => Err(Error::InvalidPaymentPlan {
                value: s.to_string(),
            }),
        }
    }
}

/// A ledger row before it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    /// Seller username
    pub seller: String,
    /// Product id at sale time
    pub product_id: i64,
    /// Product name at sale time
    pub product_name: String,
    /// Units sold
    pub quantity: i64,
    /// Selected plan
    pub payment_plan: PaymentPlan,
    /// Unit price of the selected plan
    pub unit_price: f64,
}

impl NewSale {
    /// `unit_price * quantity`
    #[must_use]
    pub fn total(&self) -> f64 {
        // Cast is safe: for quantities < 2^53, no precision loss occurs in f64
        #[allow(clippy::cast_precision_loss)]
        let quantity = self.quantity as f64;
        self.unit_price * quantity
    }
}

/// Appends one row to the sales ledger.
///
/// # Errors
/// Returns an error if the quantity is not positive, the unit price is
/// negative or not finite, or the insert fails.
pub async fn append_sale<C>(db: &C, record: NewSale) -> Result<sale::Model>
where
    C: ConnectionTrait,
{
    if record.quantity <= 0 {
        return Err(Error::InvalidQuantity {
            quantity: record.quantity,
        });
    }
    if record.unit_price < 0.0 || !record.unit_price.is_finite() {
        return Err(Error::InvalidAmount {
            amount: record.unit_price,
        });
    }

    let total = record.total();
    let row = sale::ActiveModel {
        timestamp: Set(Utc::now()),
        seller: Set(record.seller),
        product_id: Set(record.product_id),
        product_name: Set(record.product_name),
        quantity: Set(record.quantity),
        payment_plan: Set(record.payment_plan.as_str().to_string()),
        unit_price: Set(record.unit_price),
        total: Set(total),
        ..Default::default()
    };
    row.insert(db).await.map_err(Into::into)
}

/// Confirms a sale: takes `quantity` units out of stock and appends exactly one
/// ledger row priced with the selected plan.
///
/// Both writes share one database transaction; on any error nothing is stored.
///
/// # Errors
/// Returns an error if:
/// - `quantity` is not positive
/// - The product does not exist or is deleted
/// - The product has fewer than `quantity` units in stock
/// - Any database operation fails
pub async fn record_sale(
    db: &DatabaseConnection,
    seller: &str,
    product_id: i64,
    quantity: i64,
    plan: PaymentPlan,
) -> Result<sale::Model> {
    if quantity <= 0 {
        return Err(Error::InvalidQuantity { quantity });
    }

    let txn = db.begin().await?;

    let sold = product::decrement_stock(&txn, product_id, quantity).await?;
    let record = append_sale(
        &txn,
        NewSale {
            seller: seller.to_string(),
            product_id: sold.id,
            product_name: sold.name.clone(),
            quantity,
            payment_plan: plan,
            unit_price: plan.unit_price(&sold),
        },
    )
    .await?;

    txn.commit().await?;

    info!(
        sale_id = record.id,
        seller,
        product = %record.product_name,
        quantity,
        plan = plan.as_str(),
        total = record.total,
        remaining_stock = sold.stock,
        "Recorded sale"
    );
    Ok(record)
}

/// Every ledger row, oldest first.
pub async fn get_all_sales<C>(db: &C) -> Result<Vec<sale::Model>>
where
    C: ConnectionTrait,
{
    Sale::find()
        .order_by_asc(sale::Column::Timestamp)
        .order_by_asc(sale::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Ledger rows with `from <= timestamp < to`, oldest first.
pub async fn get_sales_between(
    db: &DatabaseConnection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<sale::Model>> {
    Sale::find()
        .filter(sale::Column::Timestamp.gte(from))
        .filter(sale::Column::Timestamp.lt(to))
        .order_by_asc(sale::Column::Timestamp)
        .order_by_asc(sale::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The `limit` most recent ledger rows of one seller, newest first.
pub async fn get_recent_sales_for_seller(
    db: &DatabaseConnection,
    seller: &str,
    limit: u64,
) -> Result<Vec<sale::Model>> {
    Sale::find()
        .filter(sale::Column::Seller.eq(seller))
        .order_by_desc(sale::Column::Timestamp)
        .order_by_desc(sale::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    #![allow(clippy::panic)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_payment_plan_parsing() {
        assert_eq!("cash".parse::<PaymentPlan>().unwrap(), PaymentPlan::Cash);
        assert_eq!("Contado".parse::<PaymentPlan>().unwrap(), PaymentPlan::Cash);
        assert_eq!(" 6 ".parse::<PaymentPlan>().unwrap(), PaymentPlan::SixInstallments);
        assert_eq!(
            "12 cuotas".parse::<PaymentPlan>().unwrap(),
            PaymentPlan::TwelveInstallments
        );
        assert!(matches!(
            "24".parse::<PaymentPlan>().unwrap_err(),
            Error::InvalidPaymentPlan { .. }
        ));

        for plan in PaymentPlan::ALL {
            assert_eq!(plan.as_str().parse::<PaymentPlan>().unwrap(), plan);
        }
    }

    #[test]
    fn test_unit_price_selects_tier() {
        let product = sample_model(1, "Heladera", "LG", "Heladeras");
        assert_eq!(PaymentPlan::Cash.unit_price(&product), product.cash_price);
        assert_eq!(PaymentPlan::SixInstallments.unit_price(&product), product.price_6);
        assert_eq!(
            PaymentPlan::TwelveInstallments.unit_price(&product),
            product.price_12
        );
    }

    #[tokio::test]
    async fn test_record_sale_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = record_sale(&db, "seller", 1, 0, PaymentPlan::Cash).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidQuantity { quantity: 0 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_sale_appends_one_row_with_plan_total() -> Result<()> {
        let (db, product) = setup_with_product(10).await?;

        let sale = record_sale(&db, "vendedor", product.id, 3, PaymentPlan::TwelveInstallments)
            .await?;

        assert_eq!(sale.quantity, 3);
        assert_eq!(sale.payment_plan, "12");
        assert_eq!(sale.unit_price, product.price_12);
        assert_eq!(sale.total, product.price_12 * 3.0);
        assert_eq!(sale.product_name, product.name);
        assert_eq!(sale.seller, "vendedor");

        let ledger = get_all_sales(&db).await?;
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0], sale);

        let after = product::get_product_by_id(&db, product.id).await?.unwrap();
        assert_eq!(after.stock, 7);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_sale_appends_nothing() -> Result<()> {
        let (db, product) = setup_with_product(3).await?;

        let result = record_sale(&db, "vendedor", product.id, 5, PaymentPlan::Cash).await;
        assert!(matches!(result.unwrap_err(), Error::InsufficientStock { .. }));

        assert!(get_all_sales(&db).await?.is_empty());
        let after = product::get_product_by_id(&db, product.id).await?.unwrap();
        assert_eq!(after.stock, 3);

        let result = record_sale(&db, "vendedor", 999, 1, PaymentPlan::Cash).await;
        assert!(matches!(result.unwrap_err(), Error::ProductNotFound { .. }));
        assert!(get_all_sales(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sales_never_oversell() -> Result<()> {
        let (db, path) = setup_file_db("concurrent_sales").await?;
        let item = product::create_product(&db, new_product("Heladera 300L", 3_500_000.0, 5)).await?;
        let product_id = item.id;

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let db = db.clone();
                tokio::spawn(async move {
                    record_sale(&db, &format!("seller{i}"), product_id, 1, PaymentPlan::Cash).await
                })
            })
            .collect();

        let (mut sold, mut refused) = (0, 0);
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => sold += 1,
                Err(Error::InsufficientStock { .. }) => refused += 1,
                Err(e) => panic!("unexpected sale error: {e}"),
            }
        }

        assert_eq!(sold, 5);
        assert_eq!(refused, 15);
        let after = product::get_product_by_id(&db, item.id).await?.unwrap();
        assert_eq!(after.stock, 0);
        assert_eq!(get_all_sales(&db).await?.len(), 5);

        db.close().await?;
        let _ = std::fs::remove_file(&path);
        Ok(())
    }

    #[tokio::test]
    async fn test_ledger_keeps_name_after_rename() -> Result<()> {
        let (db, product) = setup_with_product(5).await?;
        record_sale(&db, "vendedor", product.id, 1, PaymentPlan::Cash).await?;

        let mut renamed = crate::core::product::NewProduct::from(&product);
        renamed.name = "Renamed".to_string();
        product::update_product(&db, product.id, renamed).await?;

        let ledger = get_all_sales(&db).await?;
        assert_eq!(ledger[0].product_name, product.name);
        assert_eq!(ledger[0].product_id, product.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_sales_queries() -> Result<()> {
        let (db, product) = setup_with_product(10).await?;
        record_sale(&db, "ana", product.id, 1, PaymentPlan::Cash).await?;
        record_sale(&db, "beto", product.id, 2, PaymentPlan::SixInstallments).await?;
        record_sale(&db, "ana", product.id, 1, PaymentPlan::Cash).await?;

        let anas = get_recent_sales_for_seller(&db, "ana", 10).await?;
        assert_eq!(anas.len(), 2);
        assert!(anas[0].id > anas[1].id);

        let now = Utc::now();
        let window = get_sales_between(&db, now - chrono::Duration::hours(1), now + chrono::Duration::hours(1))
            .await?;
        assert_eq!(window.len(), 3);

        let past = get_sales_between(&db, now - chrono::Duration::days(2), now - chrono::Duration::days(1))
            .await?;
        assert!(past.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_append_sale_rejects_bad_rows() -> Result<()> {
        let db = setup_test_db().await?;
        let record = NewSale {
            seller: "s".to_string(),
            product_id: 1,
            product_name: "p".to_string(),
            quantity: 1,
            payment_plan: PaymentPlan::Cash,
            unit_price: -5.0,
        };

        assert!(matches!(
            append_sale(&db, record.clone()).await.unwrap_err(),
            Error::InvalidAmount { .. }
        ));
        assert!(matches!(
            append_sale(&db, NewSale { quantity: 0, unit_price: 5.0, ..record }).await.unwrap_err(),
            Error::InvalidQuantity { .. }
        ));
        assert!(get_all_sales(&db).await?.is_empty());
        Ok(())
    }
}
