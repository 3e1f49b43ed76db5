//! Router assembly.

mod catalog;
mod common;

pub use catalog::catalog_routes;
pub use common::common_routes;

use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Largest body a handler will buffer. An oversized body reaches the handler as an extractor rejection.
pub const BODY_LIMIT: usize = 64 * 1024;

/// The full service: catalog and common routes with request tracing and a body size cap.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(catalog_routes(state.clone()))
        .merge(common_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(BODY_LIMIT)),
        )
}
