//! # oab-api: Documentation Service
//!
//! Serves the generated API document and the documentation UI page.
//!
//! ## API Surface
//!
//! | Route                       | Module             | Purpose                   |
//! |-----------------------------|--------------------|---------------------------|
//! | `/docs/configuration`       | [`routes::docs`]   | Generated document (JSON) |
//! | `/docs/`, `/docs`           | [`routes::docs`]   | Documentation UI page     |
//! | `/health/liveness`          | here               | Liveness probe            |
//! | `/health/readiness`         | here               | Readiness probe           |
//!
//! The docs mount point is configurable (`OAB_DOCS_PATH`). Anything else is
//! answered with a structured 404.

pub mod demo;
pub mod error;
pub mod routes;
pub mod state;

use axum::http::Uri;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// Assemble the application router.
pub fn app(state: AppState) -> Router {
    let docs = routes::docs::router(&state.config.docs_path).with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new()
        .merge(health)
        .merge(docs)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
}

/// Liveness probe. Always 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe. The state cannot exist without a snapshot, so a
/// running router is ready.
async fn readiness() -> &'static str {
    "ready"
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}
