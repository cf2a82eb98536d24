use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use crate::entities::users::UserRole;
use crate::state::AppState;

use super::auth::{self, page_context};
use super::error::WebError;
use super::flash::{self, Flash};
use super::render::Page;

async fn require_admin(
    state: &AppState,
    session: &Session,
) -> Result<Option<crate::db::User>, WebError> {
    auth::require_role(&state.store, session, UserRole::Admin).await
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminQuery {
    pub user_q: Option<String>,
    pub user_role: Option<String>,
    pub property_location: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<AdminQuery>,
) -> Result<Response, WebError> {
    let Some(_admin) = require_admin(&state, &session).await? else {
        return Ok(auth::login_redirect());
    };

    // Unrecognized role filter values are ignored, not rejected.
    let role = non_empty(query.user_role.as_ref()).and_then(UserRole::parse);

    let users = state
        .store
        .search_users(non_empty(query.user_q.as_ref()), role)
        .await?;

    let properties = state
        .store
        .search_properties_by_location(non_empty(query.property_location.as_ref()))
        .await?;

    let ctx = page_context(&state.store, &session).await?;
    Ok(state
        .renderer
        .render(&ctx, &Page::AdminDashboard { users, properties })
        .into_response())
}

/// Unconditional delete by id; admins are not bound by ownership.
pub async fn remove_property(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(property_id): Path<i32>,
) -> Result<Response, WebError> {
    let Some(_admin) = require_admin(&state, &session).await? else {
        return Ok(auth::login_redirect());
    };

    if let Err(err) = state.store.remove_property(property_id).await {
        tracing::error!("admin property removal failed: {err:#}");
        flash::set(&session, Flash::danger("Could not remove the property. Please try again.")).await?;
    }

    Ok(Redirect::to("/admin/dashboard").into_response())
}

/// Delete by id unless the target is an admin; admin accounts cannot be
/// removed through this path.
pub async fn remove_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(user_id): Path<i32>,
) -> Result<Response, WebError> {
    let Some(_admin) = require_admin(&state, &session).await? else {
        return Ok(auth::login_redirect());
    };

    if let Err(err) = state.store.remove_user_non_admin(user_id).await {
        tracing::error!("admin user removal failed: {err:#}");
        flash::set(&session, Flash::danger("Could not remove the user. Please try again.")).await?;
    }

    Ok(Redirect::to("/admin/dashboard").into_response())
}
