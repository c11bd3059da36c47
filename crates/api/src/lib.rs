//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for listing and running reports
//! - Error-to-response mapping

pub mod error;
pub mod routes;

use axum::Router;
use glreport_core::reports::ReportRegistry;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Registered report engines.
    pub registry: Arc<ReportRegistry>,
}

impl AppState {
    /// Creates state over a registry.
    #[must_use]
    pub fn new(registry: ReportRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
