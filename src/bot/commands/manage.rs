//! Admin catalog commands - `/manage product ...` and `/manage catalog ...`.
//!
//! Single-record edits go through the product operations; bulk edits exchange
//! the whole catalog as a JSON attachment through the catalog store.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::product::resolve_or_reply,
            handlers::{access::require_admin, autocomplete},
        },
        core::{
            product::{self, NewProduct, StockLevel},
            report::format_money,
            store::{CatalogStore, parse_product_rows, render_product_rows},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;
    use tracing::info;

    /// Largest catalog file accepted by `/manage catalog import`
    const MAX_IMPORT_BYTES: u32 = 2 * 1024 * 1024;
    /// Discord message length limit, with room for the trailer
    const MAX_LIST_CHARS: usize = 1900;

    /// Replies with the reason when the error is one the admin can fix.
    async fn reply_or_propagate(ctx: poise::Context<'_, BotData, Error>, e: Error) -> Result<()> {
        if e.is_user_facing() {
            ctx.say(format!("❌ {e}")).await?;
            Ok(())
        } else {
            Err(e)
        }
    }

    /// Parent command for all admin management commands.
    #[poise::command(
        slash_command,
        subcommands("product_manage", "catalog"),
        check = "require_admin"
    )]
    pub async fn manage(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let response_text = "Management commands. Available command groups:\n\
            - `product`: add, update, stock, restock, delete, list\n\
            - `catalog`: export, import";

        ctx.send(
            poise::CreateReply::default()
                .content(response_text)
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Parent command for single-product edits.
    #[poise::command(
        slash_command,
        rename = "product",
        subcommands(
            "product_add",
            "product_update",
            "product_stock",
            "product_restock",
            "product_delete",
            "product_list"
        ),
        check = "require_admin"
    )]
    pub async fn product_manage(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Product management command. Available subcommands:\n\
            `/manage product add` - Add a new product\n\
            `/manage product update` - Change name, brand, category or prices\n\
            `/manage product stock` - Set the stock count\n\
            `/manage product restock` - Add received units\n\
            `/manage product delete` - Remove a product from the catalog\n\
            `/manage product list` - List all products";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a new product to the catalog.
    #[poise::command(slash_command, rename = "add", check = "require_admin")]
    #[allow(clippy::too_many_arguments)]
    pub async fn product_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product name (e.g., 'Heladera 300L No Frost')"] name: String,
        #[description = "Cash price"] cash_price: f64,
        #[description = "Total price in 6 installments"] price_6: f64,
        #[description = "Total price in 12 installments"] price_12: f64,
        #[description = "Brand"] brand: Option<String>,
        #[description = "Category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: Option<String>,
        #[description = "Units in stock (defaults to 0)"] stock: Option<i64>,
    ) -> Result<()> {
        let new = NewProduct {
            name: name.trim().to_string(),
            brand: brand.unwrap_or_default().trim().to_string(),
            category: category.unwrap_or_default().trim().to_string(),
            cash_price,
            price_6,
            price_12,
            stock: stock.unwrap_or(0),
        };

        match product::create_product(&ctx.data().database, new).await {
            Ok(created) => {
                ctx.say(format!(
                    "✅ Added **{}** with {} unit(s) in stock.",
                    product::product_label(&created),
                    created.stock
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_or_propagate(ctx, e).await,
        }
    }

    /// Changes the details of a product. Omitted fields keep their value.
    #[poise::command(slash_command, rename = "update", check = "require_admin")]
    #[allow(clippy::too_many_arguments)]
    pub async fn product_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product to update"]
        #[autocomplete = "autocomplete::autocomplete_product"]
        product: String,
        #[description = "New name"] name: Option<String>,
        #[description = "New brand"] brand: Option<String>,
        #[description = "New category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: Option<String>,
        #[description = "New cash price"] cash_price: Option<f64>,
        #[description = "New 6 installment price"] price_6: Option<f64>,
        #[description = "New 12 installment price"] price_12: Option<f64>,
    ) -> Result<()> {
        let Some(current) = resolve_or_reply(ctx, &product).await? else {
            return Ok(());
        };

        let mut new = NewProduct::from(&current);
        if let Some(name) = name {
            new.name = name.trim().to_string();
        }
        if let Some(brand) = brand {
            new.brand = brand.trim().to_string();
        }
        if let Some(category) = category {
            new.category = category.trim().to_string();
        }
        new.cash_price = cash_price.unwrap_or(new.cash_price);
        new.price_6 = price_6.unwrap_or(new.price_6);
        new.price_12 = price_12.unwrap_or(new.price_12);

        if new == NewProduct::from(&current) {
            ctx.say("ℹ️ Nothing to change.").await?;
            return Ok(());
        }

        match product::update_product(&ctx.data().database, current.id, new).await {
            Ok(updated) => {
                ctx.say(format!("✅ Updated **{}**.", product::product_label(&updated)))
                    .await?;
                Ok(())
            }
            Err(e) => reply_or_propagate(ctx, e).await,
        }
    }

    /// Sets the stock of a product after a count.
    #[poise::command(slash_command, rename = "stock", check = "require_admin")]
    pub async fn product_stock(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product to correct"]
        #[autocomplete = "autocomplete::autocomplete_product"]
        product: String,
        #[description = "Units actually in stock"]
        #[min = 0]
        stock: i64,
    ) -> Result<()> {
        let Some(current) = resolve_or_reply(ctx, &product).await? else {
            return Ok(());
        };

        match product::set_stock(&ctx.data().database, current.id, stock).await {
            Ok(updated) => {
                info!(
                    product_id = updated.id,
                    from = current.stock,
                    to = updated.stock,
                    "Stock corrected"
                );
                ctx.say(format!(
                    "✅ Stock of **{}** set to {} (was {}).",
                    updated.name, updated.stock, current.stock
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_or_propagate(ctx, e).await,
        }
    }

    /// Adds received units to a product's stock.
    #[poise::command(slash_command, rename = "restock", check = "require_admin")]
    pub async fn product_restock(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product received"]
        #[autocomplete = "autocomplete::autocomplete_product"]
        product: String,
        #[description = "Units received"]
        #[min = 1]
        quantity: i64,
    ) -> Result<()> {
        let Some(current) = resolve_or_reply(ctx, &product).await? else {
            return Ok(());
        };

        match product::restock(&ctx.data().database, current.id, quantity).await {
            Ok(updated) => {
                ctx.say(format!(
                    "✅ Added {quantity} unit(s) to **{}**, now {} in stock.",
                    updated.name, updated.stock
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_or_propagate(ctx, e).await,
        }
    }

    /// Removes a product from the catalog. Its sales stay in the ledger.
    #[poise::command(slash_command, rename = "delete", check = "require_admin")]
    pub async fn product_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product to delete"]
        #[autocomplete = "autocomplete::autocomplete_product"]
        product: String,
    ) -> Result<()> {
        let Some(current) = resolve_or_reply(ctx, &product).await? else {
            return Ok(());
        };

        match product::delete_product(&ctx.data().database, current.id).await {
            Ok(deleted) => {
                info!(product_id = deleted.id, name = %deleted.name, "Product deleted");
                ctx.say(format!(
                    "✅ **{}** has been removed from the catalog.",
                    product::product_label(&deleted)
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_or_propagate(ctx, e).await,
        }
    }

    /// Lists every product with its cash price and stock.
    #[poise::command(slash_command, rename = "list", check = "require_admin")]
    pub async fn product_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let products = product::get_all_active_products(&data.database).await?;

        if products.is_empty() {
            ctx.say("No products in the catalog yet. Use `/manage product add` or `/manage catalog import`.")
                .await?;
            return Ok(());
        }

        let mut response = format!("**Product List** ({} products)\n\n", products.len());
        for (shown, p) in products.iter().enumerate() {
            let line = format!(
                "• {} | {} | {}\n",
                product::product_label(p),
                format_money(p.cash_price, &data.config.store.currency),
                StockLevel::classify(p.stock, data.config.stock).badge(p.stock)
            );
            if response.len() + line.len() > MAX_LIST_CHARS {
                write!(
                    &mut response,
                    "...and {} more. Use `/manage catalog export` for the full table.",
                    products.len() - shown
                )?;
                break;
            }
            response.push_str(&line);
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Parent command for whole-catalog import and export.
    #[poise::command(
        slash_command,
        subcommands("catalog_export", "catalog_import"),
        check = "require_admin"
    )]
    pub async fn catalog(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Catalog commands. Available subcommands:\n\
            `/manage catalog export` - Download the catalog as a JSON file\n\
            `/manage catalog import` - Replace the catalog with an edited JSON file";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Downloads the active catalog as a JSON file.
    #[poise::command(slash_command, rename = "export", check = "require_admin")]
    pub async fn catalog_export(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let rows = ctx.data().catalog.read_all().await?;
        let json = render_product_rows(&rows)?;

        ctx.send(
            poise::CreateReply::default()
                .content(format!(
                    "📤 {} product(s). Edit the file and send it back with `/manage catalog import`; \
                     keep the `id` of existing products, leave it out for new ones.",
                    rows.len()
                ))
                .attachment(serenity::CreateAttachment::bytes(
                    json.into_bytes(),
                    "catalog.json",
                )),
        )
        .await?;
        Ok(())
    }

    /// Replaces the catalog with the rows of a JSON file.
    ///
    /// Products missing from the file are removed. Any invalid row rejects the
    /// whole file and leaves the catalog untouched.
    #[poise::command(slash_command, rename = "import", check = "require_admin")]
    pub async fn catalog_import(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "JSON file from /manage catalog export"] file: serenity::Attachment,
    ) -> Result<()> {
        if file.size > MAX_IMPORT_BYTES {
            ctx.say(format!(
                "❌ The file is too large ({} bytes, at most {MAX_IMPORT_BYTES}).",
                file.size
            ))
            .await?;
            return Ok(());
        }

        ctx.defer().await?;

        let bytes = file.download().await?;
        let parsed = String::from_utf8(bytes)
            .map_err(|e| Error::InvalidCatalog {
                message: e.to_string(),
            })
            .and_then(|text| parse_product_rows(&text));
        let rows = match parsed {
            Ok(rows) => rows,
            Err(e) => return reply_or_propagate(ctx, e).await,
        };

        if rows.is_empty() {
            ctx.say("❌ The file has no product rows. Nothing was changed.")
                .await?;
            return Ok(());
        }

        match ctx.data().catalog.write_all(rows).await {
            Ok(summary) => {
                ctx.say(format!(
                    "✅ Catalog imported: {} added, {} updated, {} unchanged, {} removed.",
                    summary.inserted, summary.updated, summary.unchanged, summary.removed
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_or_propagate(ctx, e).await,
        }
    }
}

// Re-export all commands
pub use inner::*;
