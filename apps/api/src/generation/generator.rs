//! Description Generation — orchestrates the per-listing generation loop.
//!
//! Flow: cache check (unless forced) → N × (prompt → complete → extract → score)
//!       → cache overwrite → return all options.
//!
//! Iterations run strictly one after another. A failed completion never aborts
//! the loop: it becomes a fixed-score fallback option instead, so callers always
//! receive exactly `option_count` results.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::generation::cache::{cache_key, DescriptionCache, DESCRIPTION_CACHE_TTL_SECS};
use crate::generation::prompts::build_description_prompt;
use crate::generation::seo_scoring::seo_score;
use crate::llm_client::extractor::extract_description;
use crate::llm_client::{CompletionBackend, LlmError};
use crate::models::listing::ListingRow;

/// Score assigned to options synthesized after a failed completion call.
pub const FALLBACK_SEO_SCORE: u32 = 85;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// One generated description option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub description: String,
    /// Always within [60, 100] for scored text; 85 for failure fallbacks.
    pub seo_score: u32,
}

/// Options produced by one `generate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub results: Vec<GenerationResult>,
    /// True when the list was served from the cache and nothing was generated.
    pub from_cache: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DescriptionGenerator {
    completion: Arc<dyn CompletionBackend>,
    cache: Arc<dyn DescriptionCache>,
}

impl DescriptionGenerator {
    pub fn new(completion: Arc<dyn CompletionBackend>, cache: Arc<dyn DescriptionCache>) -> Self {
        Self { completion, cache }
    }

    /// Produces `option_count` description options for a listing.
    ///
    /// Unless `force_regenerate` is set, a cached list is returned as-is and no
    /// completion call is made. Cache failures are logged and never surface.
    pub async fn generate(
        &self,
        listing: &ListingRow,
        option_count: usize,
        force_regenerate: bool,
    ) -> GenerationOutcome {
        let key = cache_key(listing.id);

        if !force_regenerate {
            match self.cache.get(&key).await {
                Ok(Some(results)) => {
                    info!(
                        "Serving {} cached description(s) for listing {}",
                        results.len(),
                        listing.id
                    );
                    return GenerationOutcome {
                        results,
                        from_cache: true,
                    };
                }
                Ok(None) => {}
                Err(e) => warn!("Description cache read failed for {key}: {e}"),
            }
        }

        let mut results = Vec::with_capacity(option_count);
        for iteration in 0..option_count {
            let result = self
                .generate_one(listing)
                .await
                .unwrap_or_else(|e| {
                    warn!(
                        "Generation {}/{} for listing {} failed: {e}",
                        iteration + 1,
                        option_count,
                        listing.id
                    );
                    fallback_result(listing, &e)
                });
            results.push(result);
        }

        if let Err(e) = self
            .cache
            .put(&key, &results, DESCRIPTION_CACHE_TTL_SECS)
            .await
        {
            warn!("Description cache write failed for {key}: {e}");
        }

        info!(
            "Generated {} description option(s) for listing {}",
            results.len(),
            listing.id
        );

        GenerationOutcome {
            results,
            from_cache: false,
        }
    }

    async fn generate_one(&self, listing: &ListingRow) -> Result<GenerationResult, LlmError> {
        let prompt = build_description_prompt(listing);
        let response = self.completion.complete(&prompt).await?;
        let description = extract_description(&response);
        let seo_score = seo_score(&description);
        Ok(GenerationResult {
            description: description.trim().to_string(),
            seo_score,
        })
    }
}

/// Local stand-in for an option whose completion call failed.
fn fallback_result(listing: &ListingRow, error: &LlmError) -> GenerationResult {
    GenerationResult {
        description: format!(
            "Spacious {} in {} with modern amenities. {}",
            listing.property_type, listing.location, error
        ),
        seo_score: FALLBACK_SEO_SCORE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
