// Authentication extractor
// Decision: Protected handlers take `AuthUser`; the session gate runs on every request
// Decision: The resolved identity is recorded on the request span

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use btcchecker_core::{CredentialStore, SessionGate, UserDirectory};
use std::sync::Arc;

use super::session::CookieSessionStore;
use crate::api::common::ApiError;

/// Auth state shared across routes
#[derive(Clone)]
pub struct AuthState {
    pub store: Arc<CredentialStore>,
    pub gate: SessionGate,
    pub sessions: CookieSessionStore,
}

impl AuthState {
    pub fn new(store: Arc<CredentialStore>, sessions: CookieSessionStore) -> Self {
        let gate = SessionGate::new(store.clone() as Arc<dyn UserDirectory>);
        Self {
            store,
            gate,
            sessions,
        }
    }
}

/// Authenticated user extracted from the session cookie.
/// Rejects with 401 when the session has no identity or the account is gone.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let session = auth_state.sessions.load(&jar);

        let identity = auth_state.gate.require_authenticated(&session)?;

        tracing::Span::current().record("user", identity.email());

        Ok(AuthUser {
            email: identity.into_email(),
        })
    }
}
