// btcchecker core
//
// Credential storage and session gating, independent of the HTTP layer.
//
// Key design decisions:
// - CredentialStore mirrors an append-only `email,password_hash` file in memory
// - A record becomes visible in memory only after its line reached the file
// - Unknown email, wrong password and duplicate registration share one external message
// - SessionGate reaches accounts through the UserDirectory trait and sessions through the
//   Session trait, so either side can be swapped in tests

pub mod error;
pub mod gate;
pub mod password;
pub mod session;
pub mod store;
pub mod validation;

pub use error::{
    CredentialError, Result, ValidationError, GENERIC_CREDENTIALS_MESSAGE,
    UNAUTHENTICATED_MESSAGE,
};
pub use gate::{Identity, SessionGate};
pub use password::{HashCost, MAX_HASH_COST, MIN_HASH_COST};
pub use session::{MemorySession, Session, USER_EMAIL_KEY};
pub use store::{CredentialStore, UserDirectory};
pub use validation::{validate_credentials, MAX_PASSWORD_CHARS, MIN_PASSWORD_CHARS};
