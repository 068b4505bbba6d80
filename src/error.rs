#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid role: {0}")]
    InvalidRole(String),
    #[error("Invalid session claims: {0}")]
    InvalidClaims(String),
    #[error("Token encoding error: {0}")]
    Token(String),
}
