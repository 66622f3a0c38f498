// Authentication: cookie sessions, the AuthUser extractor, registration and login routes

pub mod config;
pub mod middleware;
pub mod routes;
pub mod session;

pub use config::{SessionConfig, MAX_SESSION_MAX_AGE_SECS};
pub use middleware::{AuthState, AuthUser};
pub use routes::routes;
pub use session::{CookieSession, CookieSessionStore, SESSION_COOKIE_NAME};
