use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::DEFAULT_LOGIN_PATH;
use super::error::AuthError;
use super::gate::{LoginPath, login_redirect};
use crate::token::SessionClaims;
use crate::types::Role;

/// Verified session placed on the request by [`access_gate`](super::access_gate).
///
/// Use as an Axum extractor in handlers behind the gate. Without a session
/// it rejects with a redirect to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(AuthSession(claims): AuthSession) -> impl IntoResponse {
///     format!("Hello, {} ({})", claims.display_name(), claims.role())
/// }
///
/// // Optional: pages reachable with or without a session
/// async fn landing(session: Option<AuthSession>) -> impl IntoResponse {
///     match session {
///         Some(AuthSession(c)) => format!("Welcome back, {}", c.display_name()),
///         None => "Welcome".to_string(),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthSession(pub SessionClaims);

impl AuthSession {
    /// Rejects with [`AuthError::RoleMismatch`] unless the session may act as `role`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::RoleMismatch`] carrying the caller's own role.
    pub fn require(&self, role: Role) -> Result<&SessionClaims, AuthError> {
        let own = self.0.role();
        if own == role || own.is_override() {
            Ok(&self.0)
        } else {
            Err(AuthError::RoleMismatch(own))
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthSession {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<SessionClaims>() {
            return Ok(AuthSession(claims.clone()));
        }

        let login_path = parts
            .extensions
            .get::<LoginPath>()
            .map_or(DEFAULT_LOGIN_PATH, |p| p.0.as_str());
        let return_to = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());
        Err(AuthError::Unauthenticated {
            login_url: login_redirect(login_path, return_to),
        })
    }
}

impl<S: Send + Sync> axum::extract::OptionalFromRequestParts<S> for AuthSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<SessionClaims>().cloned().map(AuthSession))
    }
}
