//! Custom error types for the authentication service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the authentication service
#[derive(Error, Debug)]
pub enum AuthError {
    /// Input failed shape or policy validation; every violated rule is listed
    #[error("Password does not meet requirements")]
    PasswordPolicy(Vec<String>),

    /// Malformed request input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Credentials did not match; message kept generic to avoid
    /// username enumeration
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// No session presented on a route that requires one
    #[error("Authentication required")]
    AuthRequired,

    /// Session missing, expired, or timed out; reason classifies which
    #[error("{0}")]
    SessionInvalid(&'static str),

    /// Mutating request failed origin validation
    #[error("{0}")]
    CsrfRejected(&'static str),

    /// Username or email already taken
    #[error("Username or email already exists")]
    Conflict,

    /// Storage unavailable or failed; not retried here
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),

    /// Anything unexpected at the boundary
    #[error("Internal server error")]
    Internal,
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            AuthError::PasswordPolicy(_) | AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::AuthRequired
            | AuthError::SessionInvalid(_) => StatusCode::UNAUTHORIZED,
            AuthError::CsrfRejected(_) => StatusCode::FORBIDDEN,
            AuthError::Conflict => StatusCode::CONFLICT,
            AuthError::Database(_) | AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Storage failures are logged server-side but never leak details.
        let body = match &self {
            AuthError::PasswordPolicy(errors) => Json(json!({
                "success": false,
                "error": self.to_string(),
                "errors": errors,
            })),
            AuthError::Database(e) => {
                tracing::error!("Storage error: {}", e);
                Json(json!({
                    "success": false,
                    "error": "Internal server error",
                }))
            }
            _ => Json(json!({
                "success": false,
                "error": self.to_string(),
            })),
        };

        (status, body).into_response()
    }
}

/// Type alias for auth results
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthError::PasswordPolicy(vec![]).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::AuthRequired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::CsrfRejected("CSRF validation failed").status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AuthError::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::Internal.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
