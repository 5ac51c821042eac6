//! Dashboard page for one group.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use leptos::prelude::*;
use report_portal_access::{NotFoundError, ResourceDescriptor};
use std::sync::Arc;

use crate::auth::{AppState, RequireAuth};

/// Shows the descriptor of one dashboard and embeds it when an embed URL
/// is configured.
#[component]
pub fn GroupPage(group_key: String, descriptor: ResourceDescriptor) -> impl IntoView {
    let ResourceDescriptor {
        display_name,
        resource_id,
        workspace_id,
        embed_url,
    } = descriptor;

    let frame = (!embed_url.is_empty()).then(|| {
        let title = display_name.clone();
        view! { <iframe class="report-frame" title=title src=embed_url></iframe> }
    });

    view! {
        <div class="group-page" data-group=group_key>
            <h1>{display_name}</h1>
            <dl class="report-details">
                <dt>"Report"</dt>
                <dd class="resource-id">{resource_id}</dd>
                <dt>"Workspace"</dt>
                <dd class="workspace-id">{workspace_id}</dd>
            </dl>
            {frame}
        </div>
    }
}

/// Protected dashboard route. Unknown keys render the not-found page.
pub async fn group(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Response {
    let Some(descriptor) = state.resources.lookup(&key).cloned() else {
        let err = NotFoundError::Resource { key };
        tracing::debug!(error = %err, "unknown group");
        return super::not_found::not_found_page(Some(&auth.account)).into_response();
    };

    let title = descriptor.display_name.clone();
    super::document(
        &title,
        Some(&auth.account),
        view! { <GroupPage group_key=key descriptor=descriptor/> },
    )
    .into_response()
}
