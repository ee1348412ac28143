//! Axum route handlers for the Listings API.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::cache::cache_key;
use crate::generation::generator::GenerationResult;
use crate::listings::service::{describe_listing, DescribedListing};
use crate::listings::validation::{validate_option_count, CreateListingRequest};
use crate::models::listing::{ListingDescriptionRow, ListingRow};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct OptionsQuery {
    pub options: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ListingDetailResponse {
    pub listing: ListingRow,
    /// Whether a regeneration would replace a still-cached option list.
    pub has_cached_options: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/listings
///
/// Validates and stores a listing, then generates its description.
/// A cached option list for the listing is honored.
pub async fn handle_create_listing(
    State(state): State<AppState>,
    payload: Result<Json<CreateListingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DescribedListing>), AppError> {
    let Json(request) = payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    let (new_listing, option_count) = request.validate()?;

    let listing = state.listings.create(&new_listing).await?;

    let described = describe_listing(
        state.listings.as_ref(),
        &state.generator,
        listing,
        option_count,
        false,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(described)))
}

/// POST /api/v1/listings/:id/regenerate?options=N
///
/// Bypasses the cache, generates fresh options and persists the best one.
pub async fn handle_regenerate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    query: Result<Query<OptionsQuery>, QueryRejection>,
) -> Result<Json<DescribedListing>, AppError> {
    let Query(query) = query.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    let option_count = validate_option_count(query.options).map_err(AppError::Validation)?;

    let listing = find_listing(&state, id).await?;

    let described = describe_listing(
        state.listings.as_ref(),
        &state.generator,
        listing,
        option_count,
        true,
    )
    .await?;

    Ok(Json(described))
}

/// GET /api/v1/listings/:id
///
/// The cache flag is best-effort: a cache failure reads as "nothing cached".
pub async fn handle_get_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ListingDetailResponse>, AppError> {
    let listing = find_listing(&state, id).await?;
    let has_cached_options = match state.cache.has(&cache_key(id)).await {
        Ok(exists) => exists,
        Err(e) => {
            warn!("Cache lookup failed for listing {id}: {e}");
            false
        }
    };
    Ok(Json(ListingDetailResponse {
        listing,
        has_cached_options,
    }))
}

/// GET /api/v1/listings/:id/options
///
/// Returns the option list from the most recent generation while it is cached.
pub async fn handle_get_cached_options(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<GenerationResult>>, AppError> {
    state
        .cache
        .get(&cache_key(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No cached options for listing {id}")))
}

/// GET /api/v1/listings/:id/descriptions
///
/// Every generated option recorded for the listing, newest first.
pub async fn handle_description_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ListingDescriptionRow>>, AppError> {
    find_listing(&state, id).await?;
    Ok(Json(state.listings.description_history(id).await?))
}

async fn find_listing(state: &AppState, id: Uuid) -> Result<ListingRow, AppError> {
    state
        .listings
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Listing {id} not found")))
}
