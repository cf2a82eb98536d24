use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::state::AppState;

pub mod admin;
pub mod auth;
mod error;
pub mod flash;
pub mod owner;
pub mod pages;
pub mod render;
pub mod tenant;

pub use error::WebError;

/// Assemble the full application router with the session layer configured
/// from `AppState`'s config (cookie name, signing secret, secure flag).
pub fn router(state: Arc<AppState>) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_name(state.config.session.cookie_name.clone())
        .with_secure(state.config.server.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(24)))
        .with_signed(Key::derive_from(state.config.session.secret.as_bytes()));

    let owner_routes = Router::new()
        .route("/dashboard", get(owner::dashboard))
        .route(
            "/properties/new",
            get(owner::new_property_form).post(owner::create_property),
        )
        .route(
            "/properties/{id}/edit",
            get(owner::edit_property_form).post(owner::update_property),
        )
        .route("/properties/{id}/delete", post(owner::delete_property))
        .route(
            "/properties/{id}/payments",
            get(owner::payments).post(owner::record_payment),
        );

    let admin_routes = Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/properties/{id}/remove", post(admin::remove_property))
        .route("/users/{id}/remove", post(admin::remove_user));

    Router::new()
        .route("/", get(pages::home))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/profile", get(pages::profile).post(pages::update_profile))
        .route("/properties/{id}", get(tenant::property_detail))
        .route("/rent-history", get(tenant::rent_history))
        .nest("/owner", owner_routes)
        .nest("/admin", admin_routes)
        .layer(session_layer)
        .route("/health", get(pages::health))
        .nest_service(
            "/static",
            ServeDir::new(state.config.uploads.static_path.clone()),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
