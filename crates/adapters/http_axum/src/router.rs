//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::state::{AppState, Backend};

/// Build the top-level axum [`Router`].
///
/// API routes live under `/api`. A [`TraceLayer`] logs each request and
/// response at the `DEBUG` level through `tracing`.
pub fn build<B: Backend>(state: AppState<B>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
