//! Home page component.

use axum::{extract::State, response::Html};
use leptos::prelude::*;
use report_portal_access::AuthenticatedAccount;
use std::sync::Arc;

use crate::auth::{AppState, OptionalAuth};

/// A dashboard link: group key and display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupLink {
    pub key: String,
    pub display_name: String,
}

/// The home page component.
#[component]
pub fn HomePage(account: Option<AuthenticatedAccount>, groups: Vec<GroupLink>) -> impl IntoView {
    match account {
        Some(account) => {
            let greeting = format!("Welcome, {}!", account.display_name);
            view! {
                <div class="home-page">
                    <h1>{greeting}</h1>
                    <p>"Choose a dashboard."</p>
                    <ul class="group-list">
                        {groups
                            .into_iter()
                            .map(|link| {
                                let href = format!("/group/{}", link.key);
                                view! {
                                    <li>
                                        <a href=href>{link.display_name}</a>
                                    </li>
                                }
                            })
                            .collect_view()}
                    </ul>
                </div>
            }
            .into_any()
        }
        None => view! {
            <div class="home-page">
                <h1>"Report Portal"</h1>
                <p>"Sign in with your organization account to view your dashboards."</p>
                <a href="/login" class="cta-button">"Sign in"</a>
            </div>
        }
        .into_any(),
    }
}

/// Landing page. Lists the dashboards once signed in.
pub async fn home(
    State(state): State<Arc<AppState>>,
    OptionalAuth(account): OptionalAuth,
) -> Html<String> {
    let groups = state
        .resources
        .entries()
        .into_iter()
        .map(|(key, descriptor)| GroupLink {
            key: key.to_string(),
            display_name: descriptor.display_name.clone(),
        })
        .collect();

    let page_account = account.clone();
    super::document(
        "Home",
        account.as_ref(),
        view! { <HomePage account=page_account groups=groups/> },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links() -> Vec<GroupLink> {
        vec![
            GroupLink {
                key: "finance".to_string(),
                display_name: "Finance dashboard".to_string(),
            },
            GroupLink {
                key: "management".to_string(),
                display_name: "Management dashboard".to_string(),
            },
        ]
    }

    #[test]
    fn anonymous_home_page_offers_sign_in() {
        let html = view! { <HomePage account=None groups=links()/> }.to_html();
        assert!(html.contains(r#"href="/login""#));
        assert!(!html.contains("/group/finance"));
    }

    #[test]
    fn signed_in_home_page_lists_groups() {
        let account = AuthenticatedAccount::new("sub".to_string(), "Ada".to_string());
        let html = view! { <HomePage account=Some(account) groups=links()/> }.to_html();
        assert!(html.contains("Welcome, Ada!"));
        assert!(html.contains(r#"href="/group/finance""#));
        assert!(html.contains("Management dashboard"));
    }
}
