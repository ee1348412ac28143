//! Listing description flow: the layer above the generator.
//!
//! Generates options, keeps the best one on the listing row, and appends fresh
//! options to the description history. Generation itself never fails; only
//! the store can.

use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::generation::generator::{DescriptionGenerator, GenerationResult};
use crate::listings::store::ListingStore;
use crate::models::listing::ListingRow;

/// Persisted when a generation call somehow returns no options.
pub const NO_DESCRIPTION: &str = "No description generated";

#[derive(Debug, Clone, Serialize)]
pub struct DescribedListing {
    pub listing: ListingRow,
    pub options: Vec<GenerationResult>,
}

/// Highest `seo_score` wins; among equal scores the earliest option wins.
pub fn select_best(results: &[GenerationResult]) -> Option<&GenerationResult> {
    let mut ranked: Vec<&GenerationResult> = results.iter().collect();
    // sort_by is stable, so ties keep encounter order
    ranked.sort_by(|a, b| b.seo_score.cmp(&a.seo_score));
    ranked.into_iter().next()
}

/// Runs generation for `listing` and persists the best option onto it.
pub async fn describe_listing(
    store: &dyn ListingStore,
    generator: &DescriptionGenerator,
    listing: ListingRow,
    option_count: usize,
    regenerate: bool,
) -> Result<DescribedListing, AppError> {
    let outcome = generator.generate(&listing, option_count, regenerate).await;

    let (description, seo_score) = match select_best(&outcome.results) {
        Some(best) => (best.description.as_str(), Some(best.seo_score as i32)),
        None => (NO_DESCRIPTION, None),
    };

    let updated = store
        .update_description(listing.id, description, seo_score)
        .await?;

    if !outcome.from_cache {
        store
            .record_descriptions(listing.id, &listing.tone, &outcome.results)
            .await?;
    }

    info!(
        "Listing {} described: seo_score={:?}, options={}, cached={}",
        listing.id,
        seo_score,
        outcome.results.len(),
        outcome.from_cache
    );

    Ok(DescribedListing {
        listing: updated,
        options: outcome.results,
    })
}
