// Session cookie configuration
// Decision: An empty secret gets a random per-process key; sessions then end on restart

use rand::Rng;
use std::time::Duration;

/// Longest accepted session lifetime (ten years)
pub const MAX_SESSION_MAX_AGE_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Session cookie configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Secret key for signing session cookies
    pub secret: String,
    /// Session lifetime
    pub max_age: Duration,
    /// Send the cookie only over HTTPS
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            max_age: Duration::from_secs(30 * 24 * 60 * 60), // 30 days
            secure: false,
        }
    }
}

impl SessionConfig {
    /// The configured secret, or a freshly generated one when none is set
    pub fn signing_secret(&self) -> String {
        if !self.secret.is_empty() {
            return self.secret.clone();
        }

        tracing::warn!("session_key not set, sessions will not survive a restart");
        let bytes: [u8; 32] = rand::thread_rng().gen();
        hex::encode(bytes)
    }
}
