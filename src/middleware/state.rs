use std::sync::Arc;

use time::Duration;

use super::config::{GateConfig, GateSettings};
use super::error::AuthError;
use super::policy::RouteTable;
use crate::token::{MAX_SESSION_TTL_DAYS, SessionCodec};

/// Read-only gate state shared by every request.
///
/// Built once at startup from a [`GateConfig`]; cloning is cheap.
#[derive(Clone)]
pub struct GateState {
    pub(super) codec: Arc<SessionCodec>,
    pub(super) routes: Arc<RouteTable>,
    pub(super) settings: GateSettings,
}

impl GateState {
    /// Builds the shared state, registering the configured login path as a
    /// guest-only page.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] unless the session lifetime is between
    /// one and [`MAX_SESSION_TTL_DAYS`] days.
    pub fn new(config: GateConfig) -> Result<Self, AuthError> {
        let days = config.settings.session_ttl_days;
        if !(1..=MAX_SESSION_TTL_DAYS).contains(&days) {
            return Err(AuthError::Config(format!(
                "session TTL must be between 1 and {MAX_SESSION_TTL_DAYS} days, got {days}"
            )));
        }
        let codec = SessionCodec::new(&config.secret).with_ttl(Duration::days(days))?;
        let routes = config.routes.with_guest_page(&config.settings.login_path);

        Ok(Self {
            codec: Arc::new(codec),
            routes: Arc::new(routes),
            settings: config.settings,
        })
    }

    /// Codec for issuing tokens outside the bundled login route.
    #[must_use]
    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    #[must_use]
    pub fn session_cookie_name(&self) -> &str {
        &self.settings.session_cookie_name
    }
}

/// State for the login/logout routes.
pub(super) struct LoginState<V> {
    pub(super) gate: GateState,
    pub(super) verifier: Arc<V>,
}

// Manual Clone: avoid derive adding a `V: Clone` bound.
impl<V> Clone for LoginState<V> {
    fn clone(&self) -> Self {
        Self {
            gate: self.gate.clone(),
            verifier: self.verifier.clone(),
        }
    }
}
