#![doc = include_str!("../README.md")]

pub mod error;
#[cfg(feature = "middleware")]
pub mod middleware;
pub mod token;
pub mod types;

// Re-exports for convenient access
pub use error::Error;
pub use token::{InvalidSession, NewSession, SessionClaims, SessionCodec, SessionSecret};
pub use types::{Role, UserId};
