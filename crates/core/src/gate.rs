// Session gate for protected operations
// Decision: Re-check that the account exists on every protected call, not only at login
// Decision: No revocation list; a session dies only when its account disappears or the
//           session layer expires it

use std::fmt;
use std::sync::Arc;

use crate::error::{CredentialError, Result};
use crate::session::{Session, USER_EMAIL_KEY};
use crate::store::UserDirectory;

/// Authenticated identity resolved from a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    email: String,
}

impl Identity {
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn into_email(self) -> String {
        self.email
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

/// Capability check in front of protected operations
#[derive(Clone)]
pub struct SessionGate {
    users: Arc<dyn UserDirectory>,
}

impl SessionGate {
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self { users }
    }

    /// Resolve the session's identity, failing with `Unauthenticated` when the session has
    /// none or the account no longer exists
    pub fn require_authenticated<S>(&self, session: &S) -> Result<Identity>
    where
        S: Session + ?Sized,
    {
        let email = session
            .get(USER_EMAIL_KEY)
            .ok_or(CredentialError::Unauthenticated)?;

        if self.users.find(email).is_err() {
            tracing::debug!("Session refers to an account that no longer exists");
            return Err(CredentialError::Unauthenticated);
        }

        Ok(Identity {
            email: email.to_string(),
        })
    }

    /// Record `email` as the session's identity and ask the session layer to persist it.
    ///
    /// Callers must only pass an email that has just passed `CredentialStore::authenticate`.
    pub fn establish_session<S>(&self, session: &mut S, email: &str) -> Result<()>
    where
        S: Session + ?Sized,
    {
        session.insert(USER_EMAIL_KEY, email.to_string());
        session.save()
    }
}
