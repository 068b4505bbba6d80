use std::future::Future;

use crate::token::NewSession;

/// Consumer-provided credential check.
///
/// Called by the login route. Password storage, hashing and user lookup live
/// entirely in the consumer; this crate only turns a verified identity into a
/// session.
///
/// # Example
///
/// ```rust,ignore
/// impl CredentialVerifier for MyAppState {
///     async fn verify(
///         &self,
///         email: &str,
///         password: &str,
///     ) -> Result<Option<NewSession>, Box<dyn std::error::Error + Send + Sync>> {
///         let Some(user) = self.repo.find_by_email(email).await? else {
///             return Ok(None);
///         };
///         if !self.hasher.verify(password, &user.password_hash)? {
///             return Ok(None);
///         }
///         Ok(Some(NewSession {
///             user_id: user.id.to_string().into(),
///             role: user.role,
///             email: user.email,
///             display_name: user.name,
///         }))
///     }
/// }
/// ```
pub trait CredentialVerifier: Send + Sync + 'static {
    /// Returns the verified identity, or `None` for unknown email or wrong password.
    ///
    /// `Err` is reserved for infrastructure failures (database down, ...).
    fn verify(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Option<NewSession>, Box<dyn std::error::Error + Send + Sync>>>
           + Send;
}
