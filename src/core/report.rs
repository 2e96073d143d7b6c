//! Report generation business logic.
//!
//! This module aggregates the sales ledger and the catalog into structured
//! summaries for the admin dashboard. All functions are framework-agnostic and
//! return plain data that the bot layer formats.

use crate::{
    config::StockThresholds,
    core::product::StockLevel,
    entities::{product, sale},
};
use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};
use std::collections::HashMap;

/// Time window of a sales report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    /// Since local midnight
    Today,
    /// The last seven days
    Week,
    /// Since the first day of the current month
    Month,
    /// The whole ledger
    All,
}

impl ReportPeriod {
    /// Human readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Week => "Last 7 days",
            Self::Month => "This month",
            Self::All => "All time",
        }
    }

    /// Start of the window relative to `now`, in `now`'s time zone.
    ///
    /// Returns `None` for [`ReportPeriod::All`], or when local midnight does not
    /// exist in that time zone (a DST gap), in which case the caller reports
    /// from the beginning of the ledger.
    #[must_use]
    pub fn start<Tz: TimeZone>(self, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
        let midnight = |date: chrono::NaiveDate| {
            date.and_time(NaiveTime::MIN)
                .and_local_timezone(now.timezone())
                .earliest()
                .map(|d| d.with_timezone(&Utc))
        };

        match self {
            Self::Today => midnight(now.date_naive()),
            Self::Week => Some(now.with_timezone(&Utc) - Duration::days(7)),
            Self::Month => midnight(now.date_naive().with_day(1)?),
            Self::All => None,
        }
    }
}

/// Totals for one payment plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanTotal {
    /// Ledger value of the plan (`cash`, `6`, `12`)
    pub plan: String,
    /// Number of sales
    pub sales: usize,
    /// Amount collected
    pub revenue: f64,
}

/// Totals for one seller.
#[derive(Debug, Clone, PartialEq)]
pub struct SellerTotal {
    /// Seller username
    pub seller: String,
    /// Number of sales
    pub sales: usize,
    /// Amount sold
    pub revenue: f64,
}

/// Totals for one product label.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductTotal {
    /// Product name as recorded in the ledger
    pub product_name: String,
    /// Units sold
    pub units: i64,
    /// Amount sold
    pub revenue: f64,
}

/// Aggregate view of a set of ledger rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesSummary {
    /// Number of ledger rows
    pub sale_count: usize,
    /// Units sold across all rows
    pub units_sold: i64,
    /// Sum of row totals
    pub revenue: f64,
    /// Per plan, ordered cash, 6, 12, then anything unexpected
    pub by_plan: Vec<PlanTotal>,
    /// Per seller, highest revenue first
    pub by_seller: Vec<SellerTotal>,
    /// Best sellers by units, at most `top_n`
    pub top_products: Vec<ProductTotal>,
}

impl SalesSummary {
    /// Aggregates `sales`, keeping the `top_n` best-selling products.
    #[must_use]
    pub fn from_sales(sales: &[sale::Model], top_n: usize) -> Self {
        let mut plans: HashMap<&str, PlanTotal> = HashMap::new();
        let mut sellers: HashMap<&str, SellerTotal> = HashMap::new();
        let mut products: HashMap<&str, ProductTotal> = HashMap::new();

        for s in sales {
            let plan = plans.entry(s.payment_plan.as_str()).or_insert_with(|| PlanTotal {
                plan: s.payment_plan.clone(),
                sales: 0,
                revenue: 0.0,
            });
            plan.sales += 1;
            plan.revenue += s.total;

            let seller = sellers.entry(s.seller.as_str()).or_insert_with(|| SellerTotal {
                seller: s.seller.clone(),
                sales: 0,
                revenue: 0.0,
            });
            seller.sales += 1;
            seller.revenue += s.total;

            let product = products
                .entry(s.product_name.as_str())
                .or_insert_with(|| ProductTotal {
                    product_name: s.product_name.clone(),
                    units: 0,
                    revenue: 0.0,
                });
            product.units += s.quantity;
            product.revenue += s.total;
        }

        let mut by_plan: Vec<PlanTotal> = plans.into_values().collect();
        by_plan.sort_by_key(|p| (plan_rank(&p.plan), p.plan.clone()));

        let mut by_seller: Vec<SellerTotal> = sellers.into_values().collect();
        by_seller.sort_by(|a, b| {
            b.revenue
                .total_cmp(&a.revenue)
                .then_with(|| a.seller.cmp(&b.seller))
        });

        let mut top_products: Vec<ProductTotal> = products.into_values().collect();
        top_products.sort_by(|a, b| {
            b.units
                .cmp(&a.units)
                .then_with(|| b.revenue.total_cmp(&a.revenue))
                .then_with(|| a.product_name.cmp(&b.product_name))
        });
        top_products.truncate(top_n);

        Self {
            sale_count: sales.len(),
            units_sold: sales.iter().map(|s| s.quantity).sum(),
            revenue: sales.iter().map(|s| s.total).sum(),
            by_plan,
            by_seller,
            top_products,
        }
    }
}

fn plan_rank(plan: &str) -> u8 {
    match plan {
        "cash" => 0,
        "6" => 1,
        "12" => 2,
        _ => 3,
    }
}

/// Stock overview of the active catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct InventorySummary {
    /// Number of active products
    pub product_count: usize,
    /// Units in stock across all products
    pub units_in_stock: i64,
    /// Stock valued at cash price
    pub stock_value: f64,
    /// Products classified as limited or low, fewest units first
    pub low_stock: Vec<product::Model>,
    /// Products with no stock
    pub out_of_stock: Vec<product::Model>,
}

impl InventorySummary {
    /// Builds the overview from the active catalog.
    #[must_use]
    pub fn from_products(products: &[product::Model], thresholds: StockThresholds) -> Self {
        let mut low_stock = Vec::new();
        let mut out_of_stock = Vec::new();

        for p in products {
            match StockLevel::classify(p.stock, thresholds) {
                StockLevel::Available => {}
                StockLevel::Limited | StockLevel::Low => low_stock.push(p.clone()),
                StockLevel::OutOfStock => out_of_stock.push(p.clone()),
            }
        }
        low_stock.sort_by(|a, b| a.stock.cmp(&b.stock).then_with(|| a.name.cmp(&b.name)));

        // Cast is safe: for stock counts < 2^53, no precision loss occurs in f64
        #[allow(clippy::cast_precision_loss)]
        let stock_value = products
            .iter()
            .map(|p| p.cash_price * p.stock.max(0) as f64)
            .sum();

        Self {
            product_count: products.len(),
            units_in_stock: products.iter().map(|p| p.stock.max(0)).sum(),
            stock_value,
            low_stock,
            out_of_stock,
        }
    }
}

/// Formats an amount as a whole number with `.` thousands separators.
///
/// `format_money(1_250_000.0, "Gs.")` gives `"Gs. 1.250.000"`.
#[must_use]
pub fn format_money(amount: f64, currency: &str) -> String {
    // Cast safety: amounts are rounded to whole units and far below i64::MAX
    #[allow(clippy::cast_possible_truncation)]
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if whole < 0 { "-" } else { "" };
    if currency.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{currency} {grouped}")
    }
}
