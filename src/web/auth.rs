use axum::Form;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use crate::db::{NewUser, Store, User};
use crate::entities::users::UserRole;
use crate::security;
use crate::state::AppState;

use super::error::WebError;
use super::flash::{self, Flash};
use super::render::{Page, PageContext};

pub const USER_ID_KEY: &str = "user_id";
pub const ROLE_KEY: &str = "role";

/// Resolve the current user from the session; absent session means anonymous.
pub async fn current_user(store: &Store, session: &Session) -> Result<Option<User>, WebError> {
    let Some(user_id) = session.get::<i32>(USER_ID_KEY).await? else {
        return Ok(None);
    };
    Ok(store.get_user(user_id).await?)
}

/// Accept the current user only with the required role; anything else
/// (anonymous or wrong role) yields `None` and callers redirect to login.
pub async fn require_role(
    store: &Store,
    session: &Session,
    role: UserRole,
) -> Result<Option<User>, WebError> {
    let user = current_user(store, session).await?;
    Ok(user.filter(|u| u.role == role))
}

/// Authorization failures are a redirect to the login page, never a 403.
pub fn login_redirect() -> Response {
    Redirect::to("/login").into_response()
}

pub(super) async fn page_context(
    store: &Store,
    session: &Session,
) -> Result<PageContext, WebError> {
    Ok(PageContext {
        current_user: current_user(store, session).await?,
        flash: flash::take(session).await?,
    })
}

// ---- register ----

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "tenant".to_string()
}

pub async fn register_form(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, WebError> {
    let ctx = page_context(&state.store, &session).await?;
    Ok(state.renderer.render(&ctx, &Page::Register).into_response())
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, WebError> {
    let full_name = form.full_name.trim().to_string();
    let email = form.email.trim().to_lowercase();
    let phone = form.phone.trim().to_string();

    if form.password.len() < 6 || form.password.len() > 64 {
        flash::set(
            &session,
            Flash::danger("Password must be between 6 and 64 characters."),
        )
        .await?;
        return Ok(Redirect::to("/register").into_response());
    }

    if state.store.email_exists(&email).await? {
        flash::set(
            &session,
            Flash::danger("Email already registered. Please log in."),
        )
        .await?;
        return Ok(Redirect::to("/register").into_response());
    }

    // Unrecognized role values fall back to tenant.
    let role = UserRole::parse(&form.role).unwrap_or(UserRole::Tenant);

    let password_hash = security::hash_password(&form.password).await?;

    let user = match state
        .store
        .create_user(NewUser {
            full_name,
            email,
            phone,
            password_hash,
            role,
        })
        .await
    {
        Ok(user) => user,
        Err(err) => {
            tracing::error!("registration failed: {err:#}");
            flash::set(&session, Flash::danger("Registration failed. Please try again.")).await?;
            return Ok(Redirect::to("/register").into_response());
        }
    };

    session.insert(USER_ID_KEY, user.id).await?;
    session.insert(ROLE_KEY, user.role.as_str()).await?;
    flash::set(
        &session,
        Flash::success("Registration successful. You are now logged in."),
    )
    .await?;

    Ok(Redirect::to("/").into_response())
}

// ---- login / logout ----

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub async fn login_form(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, WebError> {
    let ctx = page_context(&state.store, &session).await?;
    Ok(state.renderer.render(&ctx, &Page::Login).into_response())
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    let email = form.email.trim().to_lowercase();

    let found = state.store.get_user_by_email_with_password(&email).await?;

    // Same message for unknown email and wrong password: neither side of the
    // credential pair may be confirmed to a caller.
    let authenticated = match found {
        Some((user, password_hash)) => {
            if security::verify_password(&form.password, &password_hash).await {
                Some(user)
            } else {
                None
            }
        }
        None => None,
    };

    let Some(user) = authenticated else {
        flash::set(&session, Flash::danger("Invalid email or password.")).await?;
        return Ok(Redirect::to("/login").into_response());
    };

    session.insert(USER_ID_KEY, user.id).await?;
    session.insert(ROLE_KEY, user.role.as_str()).await?;
    flash::set(&session, Flash::success("Logged in successfully.")).await?;

    Ok(Redirect::to("/").into_response())
}

pub async fn logout(session: Session) -> Result<Response, WebError> {
    session.clear().await;
    flash::set(&session, Flash::info("You have been logged out.")).await?;
    Ok(Redirect::to("/").into_response())
}
