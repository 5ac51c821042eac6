//! Application routing.

use axum::{Router, routing::get};
use std::path::Path;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::auth::{self, AppState};
use crate::pages;

/// Builds the application router.
///
/// Static assets are served from `static_dir` under `/static`. Anything
/// unmatched, including a known path with the wrong method, falls through
/// to the not-found page.
pub fn router(state: Arc<AppState>, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/login", get(auth::login))
        .route("/redirect", get(auth::callback))
        .route("/logout", get(auth::logout))
        .route("/group/{name}", get(pages::group))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .fallback(pages::not_found)
        .method_not_allowed_fallback(pages::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
