//! Autocomplete handlers for Discord slash command parameters.
//!
//! Categories are suggestions, not a closed list. Discord already submits free
//! text, so only configured categories are offered here.

use crate::{bot::BotData, errors::Error};

/// Discord returns at most this many choices.
const MAX_CHOICES: usize = 25;

/// Filters `categories` by a case-insensitive substring, keeping configured order.
#[must_use]
pub fn suggest_categories(categories: &[String], partial: &str) -> Vec<String> {
    let typed_lower = partial.trim().to_lowercase();

    categories
        .iter()
        .filter(|c| c.to_lowercase().contains(&typed_lower))
        .take(MAX_CHOICES)
        .cloned()
        .collect()
}

/// Provides autocomplete suggestions for expense categories.
pub async fn autocomplete_category(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    suggest_categories(&ctx.data().config.categories.0, partial)
}
