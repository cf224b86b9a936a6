//! HTTP route handlers and router configuration

mod admin;
mod derive;

use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the main application router
pub fn build_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        // Health check
        .route("/health", get(admin::health))
        // Derivation endpoints: defaults, field only, field and namespace
        .route("/", post(derive::derive_default))
        .route("/:field", post(derive::derive_field))
        .route("/:field/:namespace", post(derive::derive_field_namespace))
        .with_state(state.clone());

    // Add middleware
    router = router.layer(TraceLayer::new_for_http());

    // Add CORS if enabled
    if state.config.cors_enabled {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}
