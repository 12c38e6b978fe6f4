//! crates/eventify_core/src/error.rs
//!
//! The error taxonomy shared by the credential and session managers.

use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing or malformed input. Always raised before storage is touched.
    #[error("{0}")]
    Validation(String),

    #[error("Email already registered")]
    DuplicateAccount,

    /// Covers both an unknown email and a wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    /// Infrastructure failure. The detail is for server logs only.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PortError> for AuthError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::Duplicate(_) => AuthError::DuplicateAccount,
            PortError::Unexpected(detail) => AuthError::Internal(detail),
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
