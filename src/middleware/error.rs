use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};

use crate::types::Role;

/// Authentication errors for the middleware layer.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No valid session found. `login_url` carries the return target.
    #[error("Not authenticated")]
    Unauthenticated { login_url: String },

    /// Valid session outside the caller's namespace.
    #[error("Role {0} is not permitted here")]
    RoleMismatch(Role),

    /// Credential verifier failed (not the same as bad credentials).
    #[error("Credential verifier error: {0}")]
    Verifier(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated { login_url } => Redirect::to(&login_url).into_response(),
            Self::RoleMismatch(role) => Redirect::to(role.home_path()).into_response(),
            Self::Verifier(_) => {
                tracing::error!(error = %self, "Login verification failed");
                let target = format!("{}?error=server_error", super::DEFAULT_LOGIN_PATH);
                Redirect::to(&target).into_response()
            }
            Self::Config(_) => {
                tracing::error!(error = %self, "Auth internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

impl From<crate::error::Error> for AuthError {
    fn from(e: crate::error::Error) -> Self {
        match e {
            crate::error::Error::Config(msg) => Self::Config(msg),
            other => Self::Verifier(other.to_string()),
        }
    }
}
