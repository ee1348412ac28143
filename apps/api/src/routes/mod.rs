pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::listings::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/listings", post(handlers::handle_create_listing))
        .route("/api/v1/listings/:id", get(handlers::handle_get_listing))
        .route(
            "/api/v1/listings/:id/regenerate",
            post(handlers::handle_regenerate),
        )
        .route(
            "/api/v1/listings/:id/options",
            get(handlers::handle_get_cached_options),
        )
        .route(
            "/api/v1/listings/:id/descriptions",
            get(handlers::handle_description_history),
        )
        .with_state(state)
}
