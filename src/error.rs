//! Error types shared across the addon
//!
//! Remote and resolver failures are contained inside the stream path and
//! degrade to empty results. Only unknown ids reach the HTTP caller as 404.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Addon error taxonomy
#[derive(Error, Debug)]
pub enum AddonError {
    /// No Torbox credential configured, stream resolution disabled
    #[error("Configuration error: {0}")]
    Config(String),

    /// Torbox answered with a failure
    #[error("Upstream error ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Unknown episode, stream id or catalog resource
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AddonError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// HTTP status this error maps to when it reaches the dispatcher
    pub fn status(&self) -> StatusCode {
        match self {
            AddonError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this error ends the whole episode rather than one source
    ///
    /// A missing credential or a transport failure will hit every source
    /// alike. Anything Torbox answered with is scoped to the source that
    /// asked.
    pub fn aborts_episode(&self) -> bool {
        matches!(self, AddonError::Config(_) | AddonError::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, AddonError>;

impl IntoResponse for AddonError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AddonError::NotFound(what) => json!({ "error": "Not found", "detail": what }),
            _ => {
                tracing::error!(error = %self, "request failed");
                json!({ "error": "Internal server error" })
            }
        };
        (status, Json(body)).into_response()
    }
}
