// Error types for credential storage and session gating

use thiserror::Error;

/// Message returned for every failure that must not reveal whether an account exists.
pub const GENERIC_CREDENTIALS_MESSAGE: &str = "incorrect email or password";

/// Message returned when a protected operation is attempted without a usable session.
pub const UNAUTHENTICATED_MESSAGE: &str = "Unauthorized";

/// Result type alias for credential operations
pub type Result<T> = std::result::Result<T, CredentialError>;

/// Why a pair of credentials was rejected before reaching the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("empty email or password")]
    Empty,

    #[error("must be a valid email address")]
    InvalidEmail,

    #[error("the length must be between {min} and {max}")]
    PasswordLength { min: usize, max: usize },
}

/// Errors produced by the credential store and session gate.
///
/// `Conflict`, `NotFound` and `Auth` all display the same generic message. The
/// variants stay distinct so callers and tests can tell the causes apart.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Malformed email or password
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Email already registered
    #[error("{}", GENERIC_CREDENTIALS_MESSAGE)]
    Conflict,

    /// No record for the email
    #[error("{}", GENERIC_CREDENTIALS_MESSAGE)]
    NotFound,

    /// Unknown email or wrong password
    #[error("{}", GENERIC_CREDENTIALS_MESSAGE)]
    Auth,

    /// No identity in the session, or the identity no longer resolves to an account
    #[error("{}", UNAUTHENTICATED_MESSAGE)]
    Unauthenticated,

    /// Backing file could not be read, created or appended to
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing file exists but a line is not an `email,password_hash` record
    #[error("malformed record on line {line}: expected 2 fields, found {fields}")]
    MalformedRecord { line: usize, fields: usize },

    /// The hashing routine rejected its input or parameters
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    /// The session layer could not persist the session
    #[error("session error: {0}")]
    Session(String),
}

impl CredentialError {
    /// Create a session persistence error
    pub fn session(msg: impl Into<String>) -> Self {
        CredentialError::Session(msg.into())
    }
}
