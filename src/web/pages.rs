use axum::extract::{Query, State};
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum::{Form, http::StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tower_sessions::Session;

use crate::db::BrowseFilter;
use crate::entities::properties::PropertyType;
use crate::state::AppState;

use super::auth::{self, page_context};
use super::error::WebError;
use super::flash::{self, Flash};
use super::render::Page;

/// Raw home filters as submitted; parsed permissively — blank or
/// unparseable values simply skip the filter.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub location: Option<String>,
    pub min_rent: Option<String>,
    pub max_rent: Option<String>,
    pub property_type: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_rent(value: Option<String>) -> Option<Decimal> {
    non_empty(value).and_then(|v| Decimal::from_str(&v).ok())
}

impl HomeQuery {
    fn into_filter(self) -> BrowseFilter {
        BrowseFilter {
            location: non_empty(self.location),
            min_rent: parse_rent(self.min_rent),
            max_rent: parse_rent(self.max_rent),
            property_type: non_empty(self.property_type).and_then(|v| PropertyType::parse(&v)),
        }
    }
}

pub async fn home(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<HomeQuery>,
) -> Result<Response, WebError> {
    let properties = state.store.browse_properties(&query.into_filter()).await?;

    let ctx = page_context(&state.store, &session).await?;
    Ok(state
        .renderer
        .render(&ctx, &Page::Home { properties })
        .into_response())
}

// ---- profile ----

pub async fn profile(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, WebError> {
    let Some(user) = auth::current_user(&state.store, &session).await? else {
        return Ok(auth::login_redirect());
    };

    let ctx = page_context(&state.store, &session).await?;
    Ok(state
        .renderer
        .render(&ctx, &Page::Profile { user })
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub full_name: String,
    pub phone: String,
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Result<Response, WebError> {
    let Some(user) = auth::current_user(&state.store, &session).await? else {
        return Ok(auth::login_redirect());
    };

    match state
        .store
        .update_user_profile(user.id, form.full_name.trim(), form.phone.trim())
        .await
    {
        Ok(_) => {
            flash::set(&session, Flash::success("Profile updated successfully.")).await?;
        }
        Err(err) => {
            tracing::error!("profile update failed: {err:#}");
            flash::set(&session, Flash::danger("Update failed. Please try again.")).await?;
        }
    }

    Ok(Redirect::to("/profile").into_response())
}

// ---- health ----

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}
