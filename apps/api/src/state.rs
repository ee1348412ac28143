use std::sync::Arc;

use crate::generation::cache::DescriptionCache;
use crate::generation::generator::DescriptionGenerator;
use crate::listings::store::ListingStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Record store. Default: PgListingStore.
    pub listings: Arc<dyn ListingStore>,
    /// Same cache instance the generator writes to; read directly by the options endpoint.
    pub cache: Arc<dyn DescriptionCache>,
    pub generator: DescriptionGenerator,
}
