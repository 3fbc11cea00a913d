//! Custom error types for the news service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the news service
#[derive(Error, Debug)]
pub enum NewsError {
    /// Malformed request input
    #[error("{0}")]
    BadRequest(String),

    /// An upstream provider call failed; message is route-specific and
    /// leaks no upstream detail
    #[error("{0}")]
    Upstream(&'static str),
}

impl IntoResponse for NewsError {
    fn into_response(self) -> Response {
        let status = match self {
            NewsError::BadRequest(_) => StatusCode::BAD_REQUEST,
            NewsError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Type alias for news results
pub type NewsResult<T> = Result<T, NewsError>;
