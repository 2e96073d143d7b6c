//! Autocomplete handlers for Discord slash command parameters.
//!
//! Product suggestions use the same fuzzy matcher as `/search`, so a seller
//! typing "samsun heladra" still gets the right fridge offered. Each suggestion
//! is a `#id name (brand)` label that the commands resolve back to one product.

use crate::{
    bot::BotData,
    core::{
        matcher::normalize,
        product::{self, list_categories, product_label, search_products},
    },
    entities::ProductModel,
    errors::Error,
};

/// Discord autocomplete limit
const MAX_SUGGESTIONS: usize = 25;
/// Discord choice length limit
const MAX_CHOICE_LEN: usize = 100;

/// Labels of the products matching `partial`, at most 25.
#[must_use]
pub fn product_suggestions(products: &[ProductModel], partial: &str, threshold: f64) -> Vec<String> {
    search_products(products, partial, None, threshold)
        .into_iter()
        .map(|p| product_label(p).chars().take(MAX_CHOICE_LEN).collect())
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Categories containing `partial`, ignoring case and accents.
#[must_use]
pub fn category_suggestions(products: &[ProductModel], partial: &str) -> Vec<String> {
    let wanted = normalize(partial);
    list_categories(products)
        .into_iter()
        .filter(|c| normalize(c).contains(&wanted))
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Provides autocomplete suggestions for product references.
///
/// # Arguments
/// * `ctx` - The poise context containing the database connection
/// * `partial` - The partial string the user has typed so far
pub async fn autocomplete_product(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let data = ctx.data();
    let Ok(products) = product::get_all_active_products(&data.database).await else {
        return Vec::new();
    };

    product_suggestions(&products, partial, data.config.search.threshold)
}

/// Provides autocomplete suggestions for categories already used in the catalog.
pub async fn autocomplete_category(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(products) = product::get_all_active_products(&ctx.data().database).await else {
        return Vec::new();
    };

    category_suggestions(&products, partial)
}
