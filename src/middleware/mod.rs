//! Role-namespace access gate for Axum.
//!
//! Every request is classified against a static [`RouteTable`]. Protected
//! paths need a valid session cookie. Role namespaces additionally need a
//! matching role, or the `admin` override.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use campus_session::middleware::{GateConfig, GateState, auth_routes, with_access_gate};
//!
//! // 1. Implement CredentialVerifier for your app
//! // 2. Configure from environment (fails without SESSION_SECRET)
//! let state = GateState::new(GateConfig::from_env()?)?;
//!
//! // 3. Mount auth routes next to your pages, behind the gate
//! let app = axum::Router::new()
//!     .merge(pages)
//!     .merge(auth_routes(state.clone(), verifier));
//! let app = with_access_gate(app, state);
//!
//! // 4. Read the session in handlers with the AuthSession extractor
//! ```

mod config;
mod cookies;
mod error;
mod extractor;
mod gate;
mod policy;
mod routes;
mod state;
mod traits;

pub use config::{GateConfig, SECRET_ENV};
pub use error::AuthError;
pub use extractor::AuthSession;
pub use gate::{RETURN_TO_PARAM, access_gate, with_access_gate};
pub use policy::{Access, Outcome, Presented, RouteTable, evaluate};
pub use routes::auth_routes;
pub use state::GateState;
pub use traits::CredentialVerifier;

/// Public login page; also the target for unauthenticated redirects.
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";

/// Logout endpoint mounted by [`auth_routes`].
pub const LOGOUT_PATH: &str = "/auth/logout";
