//! Error types for the client

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Action not allowed: {0}")]
    ActionNotAllowed(String),

    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl AppError {
    /// Build an API error from a failed response body.
    ///
    /// The backend puts a human readable `message` field in JSON error bodies;
    /// anything else is reported verbatim.
    pub fn from_response_body(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                } else {
                    body.trim().to_string()
                }
            });

        AppError::Api { status, message }
    }

    /// HTTP status carried by this error, if it came from the backend
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AppError::Api { status, .. } => Some(*status),
            AppError::Http(e) => e.status(),
            AppError::SessionExpired | AppError::NotAuthenticated => {
                Some(StatusCode::UNAUTHORIZED)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
