// Session abstraction
//
// The core never sees cookies. Anything that can hand out a named value for the current
// request, accept a new one and write itself back to the client is a session.

use std::collections::HashMap;

use crate::error::Result;

/// Session key holding the authenticated email
pub const USER_EMAIL_KEY: &str = "user_email";

/// Per-request key-value bag backed by the session layer
pub trait Session {
    /// Get a named value
    fn get(&self, key: &str) -> Option<&str>;

    /// Set a named value
    fn insert(&mut self, key: &str, value: String);

    /// Signal the session layer to persist the current values back to the client
    fn save(&mut self) -> Result<()>;
}

/// Session held entirely in memory, for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    values: HashMap<String, String>,
    saves: usize,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `save` has been called
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl Session for MemorySession {
    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn insert(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn save(&mut self) -> Result<()> {
        self.saves += 1;
        Ok(())
    }
}
