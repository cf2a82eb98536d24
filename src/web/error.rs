use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Infrastructure failures that cannot be turned into a redirect-with-flash.
/// Validation and authorization outcomes never end up here; handlers express
/// those as redirects per the error-handling design.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("database error: {0}")]
    Database(#[from] anyhow::Error),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("upload error: {0}")]
    Upload(#[from] axum::extract::multipart::MultipartError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        tracing::error!("request failed: {self}");
        (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong").into_response()
    }
}
