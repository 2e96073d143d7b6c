//! Selling Discord commands - `/search`, `/product`, `/sell` and `/my_sales`.
//!
//! These are the seller's everyday tools: find a product by approximate name,
//! check its three prices and stock badge, and sell it. All of them require a
//! logged-in session.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData, EMBED_COLOR,
            choices::PlanChoice,
            handlers::{
                access::{require_seller, session_for},
                autocomplete,
            },
        },
        core::{
            product::{self, StockLevel},
            report::format_money,
            sale::{self, PaymentPlan},
            session::Role,
        },
        entities::ProductModel,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Most products shown by one `/search` reply
    const MAX_RESULTS: usize = 10;

    /// Cash, 6 and 12 installment prices on one line each.
    #[must_use]
    pub fn price_lines(item: &ProductModel, currency: &str) -> String {
        PaymentPlan::ALL
            .iter()
            .map(|plan| {
                format!(
                    "{}: **{}**",
                    plan.label(),
                    format_money(plan.unit_price(item), currency)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Looks up a product reference, replying inline when it cannot be resolved.
    pub async fn resolve_or_reply(
        ctx: poise::Context<'_, BotData, Error>,
        reference: &str,
    ) -> Result<Option<ProductModel>> {
        match product::resolve_product(&ctx.data().database, reference).await {
            Ok(item) => Ok(Some(item)),
            Err(e @ (Error::ProductNotFound { .. } | Error::AmbiguousProduct { .. })) => {
                ctx.say(format!("❌ {e}")).await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Searches the catalog by approximate name or brand, optionally within a category.
    ///
    /// Accents, case and small typos are ignored, so "lavaropas electrolux"
    /// still finds "Lavarropas Electrolux 8kg".
    #[poise::command(slash_command, check = "require_seller")]
    pub async fn search(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product name or brand (leave empty to list everything)"] query: Option<
            String,
        >,
        #[description = "Only show this category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let query = query.unwrap_or_default();

        let products = product::get_all_active_products(&data.database).await?;
        let hits = product::search_products(
            &products,
            &query,
            category.as_deref(),
            data.config.search.threshold,
        );

        if hits.is_empty() {
            ctx.say("🔍 No products match your search. Try fewer words or another category.")
                .await?;
            return Ok(());
        }

        let currency = &data.config.store.currency;
        let thresholds = data.config.stock;
        let embed_fields: Vec<(String, String, bool)> = hits
            .iter()
            .take(MAX_RESULTS)
            .map(|p| {
                let badge = StockLevel::classify(p.stock, thresholds).badge(p.stock);
                let value = format!(
                    "{}\n{} | {}",
                    price_lines(p, currency),
                    badge,
                    if p.category.is_empty() { "-" } else { p.category.as_str() }
                );
                (product::product_label(p), value, false)
            })
            .collect();

        let mut description = format!("{} product(s) found", hits.len());
        if hits.len() > MAX_RESULTS {
            write!(&mut description, ", showing the first {MAX_RESULTS}")?;
        }

        let embed = serenity::CreateEmbed::default()
            .title("🔍 Search results")
            .description(description)
            .color(EMBED_COLOR)
            .fields(embed_fields);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows prices and stock of one product.
    #[poise::command(slash_command, rename = "product", check = "require_seller")]
    pub async fn product_info(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product to show"]
        #[autocomplete = "autocomplete::autocomplete_product"]
        product: String,
    ) -> Result<()> {
        let Some(item) = resolve_or_reply(ctx, &product).await? else {
            return Ok(());
        };
        let data = ctx.data();

        let badge = StockLevel::classify(item.stock, data.config.stock).badge(item.stock);
        let mut embed = serenity::CreateEmbed::default()
            .title(format!("📦 {}", item.name))
            .color(EMBED_COLOR)
            .field("Prices", price_lines(&item, &data.config.store.currency), false)
            .field("Stock", format!("{badge} ({} units)", item.stock), true);
        if !item.brand.is_empty() {
            embed = embed.field("Brand", &item.brand, true);
        }
        if !item.category.is_empty() {
            embed = embed.field("Category", &item.category, true);
        }
        embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
            "Product #{}",
            item.id
        )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Sells a product: takes the units out of stock and records the sale.
    ///
    /// The sale is refused without touching anything when there are not enough
    /// units in stock.
    #[poise::command(slash_command, check = "require_seller")]
    pub async fn sell(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product to sell"]
        #[autocomplete = "autocomplete::autocomplete_product"]
        product: String,
        #[description = "Units to sell (defaults to 1)"]
        #[min = 1]
        quantity: Option<i64>,
        #[description = "Payment plan (defaults to cash)"] plan: Option<PlanChoice>,
    ) -> Result<()> {
        let session = session_for(ctx, Role::Seller).await?;
        let quantity = quantity.unwrap_or(1);
        let plan = PaymentPlan::from(plan.unwrap_or(PlanChoice::Cash));

        let Some(item) = resolve_or_reply(ctx, &product).await? else {
            return Ok(());
        };
        let data = ctx.data();

        let record =
            match sale::record_sale(&data.database, &session.username, item.id, quantity, plan)
                .await
            {
                Ok(record) => record,
                Err(
                    e @ (Error::InsufficientStock { .. }
                    | Error::InvalidQuantity { .. }
                    | Error::ProductNotFound { .. }),
                ) => {
                    ctx.say(format!("❌ Sale not recorded: {e}")).await?;
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

        let currency = &data.config.store.currency;
        let mut receipt = format!(
            "{} x **{}**\n{} at {} each\n\n**Total: {}**",
            record.quantity,
            record.product_name,
            plan.label(),
            format_money(record.unit_price, currency),
            format_money(record.total, currency),
        );
        if let Some(after) = product::get_product_by_id(&data.database, item.id).await? {
            let badge = StockLevel::classify(after.stock, data.config.stock).badge(after.stock);
            write!(&mut receipt, "\n\nStock left: {} {badge}", after.stock)?;
        }

        let embed = serenity::CreateEmbed::default()
            .title("🧾 Sale recorded")
            .description(receipt)
            .color(EMBED_COLOR)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} | Sale #{} | Seller: {}",
                data.config.store.name, record.id, session.display_name
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Lists your latest sales.
    #[poise::command(slash_command, check = "require_seller")]
    pub async fn my_sales(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let session = session_for(ctx, Role::Seller).await?;
        let data = ctx.data();

        let sales = sale::get_recent_sales_for_seller(&data.database, &session.username, 10).await?;
        if sales.is_empty() {
            ctx.say("🧾 You have not recorded any sales yet.").await?;
            return Ok(());
        }

        let currency = &data.config.store.currency;
        let mut response = String::from("🧾 **Your latest sales**\n\n");
        for s in &sales {
            writeln!(
                &mut response,
                "• {} | {} x {} | {} | {}",
                s.timestamp.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M"),
                s.quantity,
                s.product_name,
                s.payment_plan,
                format_money(s.total, currency)
            )?;
        }

        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
