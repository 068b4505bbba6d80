use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::error::Error;
use crate::types::{Role, UserId};

/// Minimum required length for the signing secret in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Lifetime of an issued session.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Longest session lifetime accepted from configuration.
pub const MAX_SESSION_TTL_DAYS: i64 = 365;

/// HMAC key used to sign and verify session tokens.
///
/// Loaded once at startup and injected into [`SessionCodec`].
#[derive(Clone)]
pub struct SessionSecret(Vec<u8>);

impl SessionSecret {
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the secret is shorter than [`MIN_SECRET_LENGTH`] bytes.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, Error> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(Error::Config(format!(
                "session secret must be at least {MIN_SECRET_LENGTH} bytes, got {}",
                secret.len()
            )));
        }
        Ok(Self(secret))
    }

    /// Reads the secret from an environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the variable is unset, empty, or too short.
    pub fn from_env(var: &str) -> Result<Self, Error> {
        match std::env::var(var) {
            Ok(value) if !value.is_empty() => Self::new(value),
            _ => Err(Error::Config(format!("{var} is required"))),
        }
    }
}

impl std::fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionSecret([REDACTED])")
    }
}

/// Verified identity handed over by the login collaborator.
///
/// Only construct this after the password check has succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub user_id: UserId,
    pub role: Role,
    pub email: String,
    pub display_name: String,
}

/// Claims recovered from a verified, unexpired session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    user_id: UserId,
    role: Role,
    email: String,
    display_name: String,
    issued_at: OffsetDateTime,
    expires_at: OffsetDateTime,
}

impl SessionClaims {
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn issued_at(&self) -> OffsetDateTime {
        self.issued_at
    }

    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        self.expires_at
    }
}

/// Uniform rejection for any token that fails verification.
///
/// Carries no reason on purpose: callers cannot tell forged, corrupt and
/// expired tokens apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid session")]
pub struct InvalidSession;

#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    role: Role,
    email: String,
    name: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies stateless session tokens (HS256).
#[derive(Clone)]
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl SessionCodec {
    #[must_use]
    pub fn new(secret: &SessionSecret) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(&secret.0),
            decoding_key: DecodingKey::from_secret(&secret.0),
            ttl: Duration::days(SESSION_TTL_DAYS),
        }
    }

    /// Overrides the session lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] unless `ttl` is positive and at most
    /// [`MAX_SESSION_TTL_DAYS`] days.
    pub fn with_ttl(mut self, ttl: Duration) -> Result<Self, Error> {
        if !ttl.is_positive() || ttl > Duration::days(MAX_SESSION_TTL_DAYS) {
            return Err(Error::Config(format!(
                "session TTL must be positive and at most {MAX_SESSION_TTL_DAYS} days, got {ttl}"
            )));
        }
        self.ttl = ttl;
        Ok(self)
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for a verified user.
    ///
    /// # Errors
    ///
    /// See [`encode`](Self::encode).
    pub fn issue(
        &self,
        user_id: impl Into<UserId>,
        role: Role,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Result<String, Error> {
        self.encode(&NewSession {
            user_id: user_id.into(),
            role,
            email: email.into(),
            display_name: display_name.into(),
        })
    }

    /// Encodes a session issued now.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidClaims`] if `user_id` or `email` is empty,
    /// or [`Error::Token`] if signing fails.
    pub fn encode(&self, session: &NewSession) -> Result<String, Error> {
        self.encode_at(session, OffsetDateTime::now_utc())
    }

    /// Encodes a session as if issued at `now`.
    ///
    /// # Errors
    ///
    /// See [`encode`](Self::encode).
    pub fn encode_at(&self, session: &NewSession, now: OffsetDateTime) -> Result<String, Error> {
        if session.user_id.as_str().is_empty() {
            return Err(Error::InvalidClaims("user id must not be empty".into()));
        }
        if session.email.is_empty() {
            return Err(Error::InvalidClaims("email must not be empty".into()));
        }

        let iat = now.unix_timestamp();
        let claims = WireClaims {
            sub: session.user_id.to_string(),
            role: session.role,
            email: session.email.clone(),
            name: session.display_name.clone(),
            iat,
            exp: iat + self.ttl.whole_seconds(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| Error::Token(e.to_string()))
    }

    /// Verifies an untrusted token against the current time.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSession`] for any malformed, forged, or expired token.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, InvalidSession> {
        self.decode_at(token, OffsetDateTime::now_utc())
    }

    /// Verifies an untrusted token; valid only while `now < expires_at`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSession`] for any malformed, forged, or expired token.
    pub fn decode_at(&self, token: &str, now: OffsetDateTime) -> Result<SessionClaims, InvalidSession> {
        // Expiry is checked below against the caller's clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let wire = jsonwebtoken::decode::<WireClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Session token rejected");
                InvalidSession
            })?
            .claims;

        if wire.sub.is_empty() || wire.email.is_empty() {
            tracing::debug!("Session token rejected: empty identity");
            return Err(InvalidSession);
        }

        let issued_at = OffsetDateTime::from_unix_timestamp(wire.iat).map_err(|_| InvalidSession)?;
        let expires_at = OffsetDateTime::from_unix_timestamp(wire.exp).map_err(|_| InvalidSession)?;

        if now >= expires_at {
            tracing::debug!(user_id = %wire.sub, "Session token rejected: expired");
            return Err(InvalidSession);
        }

        Ok(SessionClaims {
            user_id: UserId(wire.sub),
            role: wire.role,
            email: wire.email,
            display_name: wire.name,
            issued_at,
            expires_at,
        })
    }
}
