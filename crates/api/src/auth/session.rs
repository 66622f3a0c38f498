// Cookie-backed sessions
// Decision: Session values ride in one HS256-signed cookie; nothing is kept server-side
// Decision: A tampered, expired or undecodable cookie reads as an empty session

use anyhow::Context;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use btcchecker_core::{CredentialError, Session};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::config::SessionConfig;

/// Name of the session cookie
pub const SESSION_COOKIE_NAME: &str = "btcchecker";

/// Signed cookie payload
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    values: BTreeMap<String, String>,
    /// Expiration time (Unix timestamp)
    exp: i64,
    /// Issued at (Unix timestamp)
    iat: i64,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    max_age: std::time::Duration,
    secure: bool,
}

/// Loads sessions from request cookies and builds the cookies that persist them
#[derive(Clone)]
pub struct CookieSessionStore {
    keys: Arc<Keys>,
}

impl CookieSessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        let secret = config.signing_secret();
        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
                max_age: config.max_age,
                secure: config.secure,
            }),
        }
    }

    /// Read the session carried by the request's cookies
    pub fn load(&self, jar: &CookieJar) -> CookieSession {
        let values = jar
            .get(SESSION_COOKIE_NAME)
            .and_then(|cookie| match self.decode(cookie.value()) {
                Ok(values) => Some(values),
                Err(e) => {
                    tracing::debug!("Ignoring unreadable session cookie: {}", e);
                    None
                }
            })
            .unwrap_or_default();

        CookieSession {
            keys: self.keys.clone(),
            values,
            pending: None,
        }
    }

    /// Expire the session cookie on the client
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(SESSION_COOKIE_NAME).path("/"))
    }

    fn decode(&self, token: &str) -> jsonwebtoken::errors::Result<BTreeMap<String, String>> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        decode::<SessionClaims>(token, &self.keys.decoding, &validation)
            .map(|data| data.claims.values)
    }
}

/// Session loaded from a cookie.
///
/// `save` signs the current values into a cookie, which `write_to` then attaches to the
/// response's jar.
pub struct CookieSession {
    keys: Arc<Keys>,
    values: BTreeMap<String, String>,
    pending: Option<Cookie<'static>>,
}

impl CookieSession {
    /// Attach the saved cookie, if any, to the outgoing jar
    pub fn write_to(self, jar: CookieJar) -> CookieJar {
        match self.pending {
            Some(cookie) => jar.add(cookie),
            None => jar,
        }
    }

    /// Signed token plus the cookie lifetime to send with it
    fn encode(&self) -> anyhow::Result<(String, time::Duration)> {
        let max_age = i64::try_from(self.keys.max_age.as_secs())
            .context("session max age out of range")?;
        let now = Utc::now();
        let exp = Duration::try_seconds(max_age)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .context("session expiry out of range")?;

        let claims = SessionClaims {
            values: self.values.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.keys.encoding)?;
        Ok((token, time::Duration::seconds(max_age)))
    }
}

impl Session for CookieSession {
    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn insert(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn save(&mut self) -> btcchecker_core::Result<()> {
        let (token, max_age) = self.encode().map_err(|e| {
            tracing::error!("Failed to encode session cookie: {}", e);
            CredentialError::session(e.to_string())
        })?;

        let cookie = Cookie::build((SESSION_COOKIE_NAME, token))
            .path("/")
            .http_only(true)
            .secure(self.keys.secure)
            .same_site(SameSite::Lax)
            .max_age(max_age)
            .build();

        self.pending = Some(cookie);
        Ok(())
    }
}
