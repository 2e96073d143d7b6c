//! Admin report commands - `/sales` and `/inventory`.
//!
//! Both recompute their figures from the ledger and the catalog on every call.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, EMBED_COLOR, choices::PeriodChoice, handlers::access::require_admin},
        core::{
            product,
            report::{InventorySummary, ReportPeriod, SalesSummary, format_money},
            sale::{self, PaymentPlan},
            store::{SalesLedger, render_sales},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Best sellers listed in `/sales`
    const TOP_PRODUCTS: usize = 5;
    /// Discord limit for an embed field value
    pub const MAX_FIELD_CHARS: usize = 1024;

    /// Joins `lines` into one embed field value of at most `max_chars`
    /// characters, ending with "...and N more" when some lines do not fit.
    #[must_use]
    pub fn field_lines(lines: &[String], max_chars: usize) -> String {
        let mut value = String::new();
        for (shown, line) in lines.iter().enumerate() {
            let remaining = lines.len() - shown;
            let trailer = format!("...and {remaining} more");
            let room_needed = if remaining > 1 { trailer.chars().count() + 1 } else { 0 };

            if value.chars().count() + line.chars().count() + 1 + room_needed > max_chars {
                value.push_str(&trailer);
                return value;
            }
            value.push_str(line);
            value.push('\n');
        }
        value
    }

    fn plan_label(plan: &str) -> String {
        plan.parse::<PaymentPlan>()
            .map_or_else(|_| plan.to_string(), |p| p.label().to_string())
    }

    /// Sales summary for a period, optionally with the matching ledger rows as JSON.
    #[poise::command(slash_command, check = "require_admin")]
    pub async fn sales(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Time window (defaults to today)"] period: Option<PeriodChoice>,
        #[description = "Attach the ledger rows as a JSON file"] export: Option<bool>,
    ) -> Result<()> {
        ctx.defer().await?;
        let data = ctx.data();
        let period = ReportPeriod::from(period.unwrap_or(PeriodChoice::Today));

        let rows = match period.start(&chrono::Local::now()) {
            Some(start) => {
                sale::get_sales_between(&data.database, start, chrono::Utc::now()).await?
            }
            None => data.ledger.read_all().await?,
        };

        let summary = SalesSummary::from_sales(&rows, TOP_PRODUCTS);
        let currency = &data.config.store.currency;

        let mut embed = serenity::CreateEmbed::default()
            .title(format!("📈 Sales: {}", period.label()))
            .color(EMBED_COLOR)
            .description(format!(
                "**{}** from {} sale(s), {} unit(s)",
                format_money(summary.revenue, currency),
                summary.sale_count,
                summary.units_sold
            ));

        if summary.sale_count > 0 {
            let by_plan: Vec<String> = summary
                .by_plan
                .iter()
                .map(|p| {
                    format!(
                        "{}: {} ({} sale(s))",
                        plan_label(&p.plan),
                        format_money(p.revenue, currency),
                        p.sales
                    )
                })
                .collect();

            let by_seller: Vec<String> = summary
                .by_seller
                .iter()
                .map(|s| {
                    format!(
                        "{}: {} ({} sale(s))",
                        s.seller,
                        format_money(s.revenue, currency),
                        s.sales
                    )
                })
                .collect();

            let top: Vec<String> = summary
                .top_products
                .iter()
                .enumerate()
                .map(|(rank, p)| {
                    format!(
                        "{}. {} - {} unit(s), {}",
                        rank + 1,
                        p.product_name,
                        p.units,
                        format_money(p.revenue, currency)
                    )
                })
                .collect();

            embed = embed
                .field("By payment plan", field_lines(&by_plan, MAX_FIELD_CHARS), false)
                .field("By seller", field_lines(&by_seller, MAX_FIELD_CHARS), false)
                .field("Best sellers", field_lines(&top, MAX_FIELD_CHARS), false);
        }

        let mut reply = poise::CreateReply::default().embed(embed);
        if export.unwrap_or(false) {
            let json = render_sales(&rows)?;
            reply = reply.attachment(serenity::CreateAttachment::bytes(
                json.into_bytes(),
                "sales.json",
            ));
        }

        ctx.send(reply).await?;
        Ok(())
    }

    /// Stock overview with restock alerts.
    #[poise::command(slash_command, check = "require_admin")]
    pub async fn inventory(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let products = product::get_all_active_products(&data.database).await?;
        let summary = InventorySummary::from_products(&products, data.config.stock);
        let currency = &data.config.store.currency;

        let mut embed = serenity::CreateEmbed::default()
            .title("📦 Inventory")
            .color(EMBED_COLOR)
            .field("Products", summary.product_count.to_string(), true)
            .field("Units in stock", summary.units_in_stock.to_string(), true)
            .field("Stock value (cash)", format_money(summary.stock_value, currency), true);

        if !summary.low_stock.is_empty() {
            let low: Vec<String> = summary
                .low_stock
                .iter()
                .map(|p| format!("{}: {} left", product::product_label(p), p.stock))
                .collect();
            embed = embed.field("⚠️ Running low", field_lines(&low, MAX_FIELD_CHARS), false);
        }

        if !summary.out_of_stock.is_empty() {
            let out: Vec<String> = summary
                .out_of_stock
                .iter()
                .map(product::product_label)
                .collect();
            embed = embed.field("❌ Out of stock", field_lines(&out, MAX_FIELD_CHARS), false);
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lines_fit_unchanged() {
        let lines = vec!["admin: Gs. 100 (1 sale(s))".to_string(), "vendedor: Gs. 50 (2 sale(s))".to_string()];
        assert_eq!(
            field_lines(&lines, MAX_FIELD_CHARS),
            "admin: Gs. 100 (1 sale(s))\nvendedor: Gs. 50 (2 sale(s))\n"
        );
    }

    #[test]
    fn test_field_lines_truncate_many_sellers() {
        let lines: Vec<String> = (0..200)
            .map(|i| format!("seller{i:03}: Gs. 1.250.000 (3 sale(s))"))
            .collect();

        let value = field_lines(&lines, MAX_FIELD_CHARS);
        assert!(value.chars().count() <= MAX_FIELD_CHARS);
        assert!(value.starts_with("seller000: "));

        let shown = value.lines().filter(|l| l.starts_with("seller")).count();
        assert!(shown > 0);
        assert!(value.ends_with(&format!("...and {} more", 200 - shown)));
    }

    #[test]
    fn test_field_lines_small_limit() {
        let lines = vec!["a".repeat(10), "b".repeat(10), "c".repeat(10)];
        let value = field_lines(&lines, 25);
        assert_eq!(value, format!("{}\n...and 2 more", "a".repeat(10)));
        assert!(value.chars().count() <= 25);
    }
}
