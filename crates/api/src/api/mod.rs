// HTTP API routes
//
// Each submodule handles one resource with its own state; auth routes live in crate::auth.

pub mod btc_rate;
pub mod common;

// Re-export common types
pub use common::{ApiError, CredentialsRequest, ErrorResponse};
