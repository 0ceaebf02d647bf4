use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// AppError
///
/// Every failure the portal can surface. None of these are recoverable at request time:
/// they describe broken configuration or a failing collaborator, so the client only ever
/// sees a generic 500 while the detail goes to the log.
#[derive(Debug, Error)]
pub enum AppError {
    /// A principal authenticated successfully but holds no authority the redirect table
    /// knows about.
    #[error("no redirect rule matches authorities {0:?}")]
    UnresolvableRedirect(Vec<String>),

    #[error("invalid redirect table: {0}")]
    InvalidRedirectTable(String),

    /// The user directory could not be built or read.
    #[error("user directory error: {0}")]
    Directory(String),

    #[error("session store error: {0}")]
    Session(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}
