//! 404 page.

use axum::{
    http::{StatusCode, Uri},
    response::Html,
};
use leptos::prelude::*;
use report_portal_access::{AuthenticatedAccount, NotFoundError};

use crate::auth::OptionalAuth;

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <div class="not-found-page">
            <h1>"Page not found"</h1>
            <p>"The page you asked for does not exist."</p>
            <a href="/">"Back to the portal"</a>
        </div>
    }
}

/// Renders the not-found document with a 404 status.
pub fn not_found_page(account: Option<&AuthenticatedAccount>) -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        super::document("Not found", account, view! { <NotFoundPage/> }),
    )
}

/// Fallback for unmatched routes.
pub async fn not_found(uri: Uri, OptionalAuth(account): OptionalAuth) -> (StatusCode, Html<String>) {
    let err = NotFoundError::Route {
        path: uri.path().to_string(),
    };
    tracing::debug!(error = %err, "no matching route");
    not_found_page(account.as_ref())
}
