use super::error::AuthError;
use super::policy::RouteTable;
use crate::token::{SESSION_TTL_DAYS, SessionSecret};

/// Environment variable holding the signing secret.
pub const SECRET_ENV: &str = "SESSION_SECRET";

/// Shared gate settings used by both config and runtime state.
#[derive(Clone)]
pub(crate) struct GateSettings {
    pub(crate) session_cookie_name: String,
    pub(crate) session_ttl_days: i64,
    pub(crate) secure_cookies: bool,
    pub(crate) login_path: String,
    /// Falls back to `login_path` when unset.
    pub(crate) logout_redirect: Option<String>,
}

impl GateSettings {
    fn defaults() -> Self {
        Self {
            session_cookie_name: "session".into(),
            session_ttl_days: SESSION_TTL_DAYS,
            secure_cookies: true,
            login_path: super::DEFAULT_LOGIN_PATH.into(),
            logout_redirect: None,
        }
    }

    pub(crate) fn logout_redirect(&self) -> &str {
        self.logout_redirect.as_deref().unwrap_or(&self.login_path)
    }
}

/// Access gate configuration.
///
/// The signing secret is a constructor parameter, so a gate cannot exist
/// without one.
///
/// Use [`from_env()`](GateConfig::from_env) for convention-based setup,
/// or [`new()`](GateConfig::new) with `with_*` methods for full control.
pub struct GateConfig {
    pub(super) secret: SessionSecret,
    pub(super) routes: RouteTable,
    pub(super) settings: GateSettings,
}

impl GateConfig {
    /// Create config with the required signing secret.
    ///
    /// All optional fields use sensible defaults. Override with `with_*` methods.
    #[must_use]
    pub fn new(secret: SessionSecret) -> Self {
        Self {
            secret,
            routes: RouteTable::default(),
            settings: GateSettings::defaults(),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `SESSION_SECRET`: HMAC signing secret, at least 32 bytes
    ///
    /// # Optional env vars
    /// - `SESSION_COOKIE_NAME`: Override the session cookie name
    /// - `APP_ENV`: `"development"` or `"dev"` drops the `Secure` cookie attribute
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if the secret is missing or too short.
    pub fn from_env() -> Result<Self, AuthError> {
        let secret = SessionSecret::from_env(SECRET_ENV)?;

        let development = matches!(
            std::env::var("APP_ENV").as_deref(),
            Ok("development") | Ok("dev"),
        );

        let mut config = Self::new(secret).with_secure_cookies(!development);

        if let Ok(name) = std::env::var("SESSION_COOKIE_NAME") {
            if name.is_empty() {
                return Err(AuthError::Config("SESSION_COOKIE_NAME must not be empty".into()));
            }
            config = config.with_session_cookie_name(name);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.settings.session_cookie_name = name.into();
        self
    }

    /// Session lifetime in days; checked by [`GateState::new`](super::GateState::new).
    #[must_use]
    pub fn with_session_ttl_days(mut self, days: i64) -> Self {
        self.settings.session_ttl_days = days;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.settings.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.settings.login_path = path.into();
        self
    }

    #[must_use]
    pub fn with_logout_redirect(mut self, path: impl Into<String>) -> Self {
        self.settings.logout_redirect = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_route_table(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }
}
