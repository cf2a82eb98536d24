use axum::extract::{Multipart, Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tower_sessions::Session;

use crate::db::{NewProperty, PropertyUpdate, User};
use crate::entities::properties::{AvailabilityStatus, PropertyType};
use crate::entities::rent_payments::PaymentStatus;
use crate::entities::users::UserRole;
use crate::state::AppState;

use super::auth::{self, page_context};
use super::error::WebError;
use super::flash::{self, Flash};
use super::render::Page;

async fn require_owner(
    state: &AppState,
    session: &Session,
) -> Result<Option<User>, WebError> {
    auth::require_role(&state.store, session, UserRole::Owner).await
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, WebError> {
    let Some(owner) = require_owner(&state, &session).await? else {
        return Ok(auth::login_redirect());
    };

    let properties = state.store.list_owner_properties(owner.id).await?;

    let ctx = page_context(&state.store, &session).await?;
    Ok(state
        .renderer
        .render(&ctx, &Page::OwnerDashboard { properties })
        .into_response())
}

// ---- property form plumbing ----

/// Raw multipart fields from the property form.
#[derive(Debug, Default)]
struct PropertyFormData {
    title: String,
    description: String,
    location: String,
    rent_amount: String,
    property_type: String,
    availability_status: String,
    image: Option<(String, Vec<u8>)>,
}

async fn read_property_form(multipart: &mut Multipart) -> Result<PropertyFormData, WebError> {
    let mut data = PropertyFormData::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("title") => data.title = field.text().await?,
            Some("description") => data.description = field.text().await?,
            Some("location") => data.location = field.text().await?,
            Some("rent_amount") => data.rent_amount = field.text().await?,
            Some("property_type") => data.property_type = field.text().await?,
            Some("availability_status") => data.availability_status = field.text().await?,
            Some("image") => {
                let filename = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;
                if let Some(filename) = filename.filter(|f| !f.is_empty()) {
                    if !bytes.is_empty() {
                        data.image = Some((filename, bytes.to_vec()));
                    }
                }
            }
            _ => {}
        }
    }

    Ok(data)
}

struct ValidatedProperty {
    title: String,
    description: String,
    location: String,
    rent_amount: Decimal,
    property_type: PropertyType,
    availability_status: Option<AvailabilityStatus>,
}

/// Shape validation for the listing fields. Property type and availability
/// status are rejected on unknown values rather than silently defaulted.
fn validate_property_form(
    data: &PropertyFormData,
    require_status: bool,
) -> Result<ValidatedProperty, &'static str> {
    let title = data.title.trim();
    let description = data.description.trim();
    let location = data.location.trim();

    if title.is_empty() || description.is_empty() || location.is_empty() {
        return Err("Title, description and location are required.");
    }

    let Ok(rent_amount) = Decimal::from_str(data.rent_amount.trim()) else {
        return Err("Rent amount must be a number.");
    };

    let Some(property_type) = PropertyType::parse(data.property_type.trim()) else {
        return Err("Unknown property type.");
    };

    let availability_status = if require_status {
        let Some(status) = AvailabilityStatus::parse(data.availability_status.trim()) else {
            return Err("Unknown availability status.");
        };
        Some(status)
    } else {
        None
    };

    Ok(ValidatedProperty {
        title: title.to_string(),
        description: description.to_string(),
        location: location.to_string(),
        rent_amount,
        property_type,
        availability_status,
    })
}

/// Persist an uploaded image under the uploads dir, namespaced by owner id
/// and the upload's final filename component. Returns the public path.
async fn store_image(
    state: &AppState,
    owner_id: i32,
    original_name: &str,
    bytes: &[u8],
) -> Result<String, WebError> {
    let filename = std::path::Path::new(original_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");
    let stored = format!("{owner_id}_{filename}");

    let dest = state.config.uploads_dir().join(&stored);
    tokio::fs::write(&dest, bytes).await?;

    Ok(format!("/static/uploads/{stored}"))
}

/// Best-effort removal of a previously stored image file.
async fn remove_stored_image(state: &AppState, public_path: &str) {
    let Some(relative) = public_path.strip_prefix("/static/") else {
        return;
    };
    let path = std::path::Path::new(&state.config.uploads.static_path).join(relative);
    if let Err(err) = tokio::fs::remove_file(&path).await {
        tracing::warn!("failed to remove stored image {}: {err}", path.display());
    }
}

// ---- property CRUD ----

pub async fn new_property_form(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, WebError> {
    let Some(_owner) = require_owner(&state, &session).await? else {
        return Ok(auth::login_redirect());
    };

    let ctx = page_context(&state.store, &session).await?;
    Ok(state
        .renderer
        .render(&ctx, &Page::PropertyForm { property: None })
        .into_response())
}

pub async fn create_property(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut multipart: Multipart,
) -> Result<Response, WebError> {
    let Some(owner) = require_owner(&state, &session).await? else {
        return Ok(auth::login_redirect());
    };

    let data = read_property_form(&mut multipart).await?;
    let validated = match validate_property_form(&data, false) {
        Ok(validated) => validated,
        Err(message) => {
            flash::set(&session, Flash::danger(message)).await?;
            return Ok(Redirect::to("/owner/properties/new").into_response());
        }
    };

    let main_image_path = match &data.image {
        Some((filename, bytes)) => Some(store_image(&state, owner.id, filename, bytes).await?),
        None => None,
    };

    if let Err(err) = state
        .store
        .add_property(NewProperty {
            owner_id: owner.id,
            title: validated.title,
            description: validated.description,
            location: validated.location,
            rent_amount: validated.rent_amount,
            property_type: validated.property_type,
            main_image_path,
        })
        .await
    {
        tracing::error!("property create failed: {err:#}");
        flash::set(&session, Flash::danger("Could not save the property. Please try again.")).await?;
        return Ok(Redirect::to("/owner/properties/new").into_response());
    }

    Ok(Redirect::to("/owner/dashboard").into_response())
}

pub async fn edit_property_form(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(property_id): Path<i32>,
) -> Result<Response, WebError> {
    let Some(owner) = require_owner(&state, &session).await? else {
        return Ok(auth::login_redirect());
    };

    let Some(property) = state.store.get_owned_property(property_id, owner.id).await? else {
        return Ok(Redirect::to("/owner/dashboard").into_response());
    };

    let ctx = page_context(&state.store, &session).await?;
    Ok(state
        .renderer
        .render(
            &ctx,
            &Page::PropertyForm {
                property: Some(property),
            },
        )
        .into_response())
}

pub async fn update_property(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(property_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Response, WebError> {
    let Some(owner) = require_owner(&state, &session).await? else {
        return Ok(auth::login_redirect());
    };

    // Ownership is re-verified before any mutation.
    let Some(existing) = state.store.get_owned_property(property_id, owner.id).await? else {
        return Ok(Redirect::to("/owner/dashboard").into_response());
    };

    let data = read_property_form(&mut multipart).await?;
    let validated = match validate_property_form(&data, true) {
        Ok(validated) => validated,
        Err(message) => {
            flash::set(&session, Flash::danger(message)).await?;
            return Ok(Redirect::to(&format!("/owner/properties/{property_id}/edit")).into_response());
        }
    };

    let new_image_path = match &data.image {
        Some((filename, bytes)) => Some(store_image(&state, owner.id, filename, bytes).await?),
        None => None,
    };
    let replaces_image = new_image_path.is_some();

    let update = PropertyUpdate {
        title: validated.title,
        description: validated.description,
        location: validated.location,
        rent_amount: validated.rent_amount,
        property_type: validated.property_type,
        availability_status: validated
            .availability_status
            .unwrap_or(existing.availability_status),
        new_image_path: new_image_path.clone(),
    };

    match state
        .store
        .update_owned_property(property_id, owner.id, update)
        .await
    {
        Ok(Some(_)) => {
            // The replaced file would otherwise leak on disk.
            if replaces_image {
                if let Some(old) = existing.main_image_path.as_deref() {
                    if Some(old) != new_image_path.as_deref() {
                        remove_stored_image(&state, old).await;
                    }
                }
            }
        }
        Ok(None) => {}
        Err(err) => {
            tracing::error!("property update failed: {err:#}");
            flash::set(&session, Flash::danger("Could not save the property. Please try again.")).await?;
            return Ok(Redirect::to(&format!("/owner/properties/{property_id}/edit")).into_response());
        }
    }

    Ok(Redirect::to("/owner/dashboard").into_response())
}

pub async fn delete_property(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(property_id): Path<i32>,
) -> Result<Response, WebError> {
    let Some(owner) = require_owner(&state, &session).await? else {
        return Ok(auth::login_redirect());
    };

    match state.store.remove_owned_property(property_id, owner.id).await {
        Ok(Some(deleted)) => {
            if let Some(image) = deleted.main_image_path.as_deref() {
                remove_stored_image(&state, image).await;
            }
        }
        Ok(None) => {}
        Err(err) => {
            tracing::error!("property delete failed: {err:#}");
            flash::set(&session, Flash::danger("Could not delete the property. Please try again.")).await?;
        }
    }

    Ok(Redirect::to("/owner/dashboard").into_response())
}

// ---- rent payments ----

pub async fn payments(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(property_id): Path<i32>,
) -> Result<Response, WebError> {
    let Some(owner) = require_owner(&state, &session).await? else {
        return Ok(auth::login_redirect());
    };

    let Some(property) = state.store.get_owned_property(property_id, owner.id).await? else {
        return Ok(Redirect::to("/owner/dashboard").into_response());
    };

    let payments = state.store.list_property_payments(property_id).await?;

    let ctx = page_context(&state.store, &session).await?;
    Ok(state
        .renderer
        .render(&ctx, &Page::PropertyPayments { property, payments })
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct PaymentForm {
    pub tenant_id: String,
    /// Expected as YYYY-MM-01.
    pub month: String,
    pub amount: String,
    #[serde(default)]
    pub status: String,
}

pub async fn record_payment(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(property_id): Path<i32>,
    Form(form): Form<PaymentForm>,
) -> Result<Response, WebError> {
    let Some(owner) = require_owner(&state, &session).await? else {
        return Ok(auth::login_redirect());
    };

    let Some(_property) = state.store.get_owned_property(property_id, owner.id).await? else {
        return Ok(Redirect::to("/owner/dashboard").into_response());
    };

    let back = format!("/owner/properties/{property_id}/payments");

    let Ok(tenant_id) = form.tenant_id.trim().parse::<i32>() else {
        flash::set(&session, Flash::danger("Tenant id must be a number.")).await?;
        return Ok(Redirect::to(&back).into_response());
    };

    let Ok(month) = NaiveDate::from_str(form.month.trim()) else {
        flash::set(&session, Flash::danger("Month must be a date like 2024-03-01.")).await?;
        return Ok(Redirect::to(&back).into_response());
    };

    let Ok(amount) = Decimal::from_str(form.amount.trim()) else {
        flash::set(&session, Flash::danger("Amount must be a number.")).await?;
        return Ok(Redirect::to(&back).into_response());
    };

    // Unrecognized status values fall back to pending.
    let status = PaymentStatus::parse(form.status.trim()).unwrap_or(PaymentStatus::Pending);

    if let Err(err) = state
        .store
        .upsert_payment(property_id, tenant_id, month, amount, status)
        .await
    {
        tracing::error!("payment upsert failed: {err:#}");
        flash::set(&session, Flash::danger("Could not record the payment. Please try again.")).await?;
        return Ok(Redirect::to(&back).into_response());
    }

    Ok(Redirect::to("/owner/dashboard").into_response())
}
