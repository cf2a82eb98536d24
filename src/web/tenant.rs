use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use std::sync::Arc;
use tower_sessions::Session;

use crate::entities::users::UserRole;
use crate::state::AppState;

use super::auth::{self, page_context};
use super::error::WebError;
use super::render::Page;

/// Public read of a single listing; anyone may view, the current user only
/// feeds the page chrome.
pub async fn property_detail(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(property_id): Path<i32>,
) -> Result<Response, WebError> {
    let Some(property) = state.store.get_property(property_id).await? else {
        return Ok(Redirect::to("/").into_response());
    };

    let ctx = page_context(&state.store, &session).await?;
    Ok(state
        .renderer
        .render(&ctx, &Page::PropertyDetail { property })
        .into_response())
}

pub async fn rent_history(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, WebError> {
    let Some(tenant) = auth::require_role(&state.store, &session, UserRole::Tenant).await? else {
        return Ok(auth::login_redirect());
    };

    let payments = state.store.list_tenant_payments(tenant.id).await?;

    let ctx = page_context(&state.store, &session).await?;
    Ok(state
        .renderer
        .render(&ctx, &Page::RentHistory { payments })
        .into_response())
}
