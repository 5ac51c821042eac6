//! Page components for the portal.
//!
//! Pages are Leptos components rendered on the server to complete HTML
//! documents. Each route module holds its Axum handler next to the
//! component it renders.

pub mod group;
pub mod home;
pub mod not_found;

pub use group::{GroupPage, group};
pub use home::{HomePage, home};
pub use not_found::{NotFoundPage, not_found};

use axum::response::Html;
use leptos::prelude::*;
use report_portal_access::AuthenticatedAccount;

/// Product name shown in the title bar.
const PORTAL_NAME: &str = "Report Portal";

/// Renders `content` inside the shared document shell.
pub fn document(
    title: &str,
    account: Option<&AuthenticatedAccount>,
    content: impl IntoView + 'static,
) -> Html<String> {
    let title = format!("{title} | {PORTAL_NAME}");
    let nav = match account {
        Some(account) => {
            let display_name = account.display_name.clone();
            view! {
                <span class="account">{display_name}</span>
                <a href="/logout">"Sign out"</a>
            }
            .into_any()
        }
        None => view! { <a href="/login">"Sign in"</a> }.into_any(),
    };

    let html = view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <title>{title}</title>
                <link rel="stylesheet" href="/static/portal.css"/>
            </head>
            <body>
                <header class="top-bar">
                    <a href="/" class="brand">{PORTAL_NAME}</a>
                    <nav>{nav}</nav>
                </header>
                <main>{content}</main>
            </body>
        </html>
    }
    .to_html();

    Html(html)
}
