//! Client-held sessions.
//!
//! A session is an HS256-signed token carrying the caller's identity and an expiry.
//! Nothing is kept server-side: the cookie is the session, and the signing secret is
//! the only thing that makes it trustworthy.

use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::AppError,
    model::{Identity, Role},
};

pub const SESSION_COOKIE: &str = "todo-session";
pub const SESSION_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    user_id: u32,
    username: String,
    role: Role,
    iat: i64,
    exp: i64,
}

pub struct SessionStore {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(secret: &[u8]) -> Self {
        Self::with_ttl(secret, Duration::days(SESSION_TTL_DAYS))
    }

    pub fn with_ttl(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Signs a token for `identity`, valid for the store's ttl.
    pub fn create(&self, identity: &Identity) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            user_id: identity.user_id,
            username: identity.username.clone(),
            role: identity.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Returns the identity inside `token`, or `None` when it is tampered, foreign or expired.
    pub fn read(&self, token: &str) -> Option<Identity> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(Identity {
                user_id: data.claims.user_id,
                username: data.claims.username,
                role: data.claims.role,
            }),
            Err(err) => {
                debug!(error = %err, "discarding session token");
                None
            }
        }
    }

    /// Looks up the session cookie on a request and reads it.
    pub fn read_headers(&self, headers: &HeaderMap) -> Option<Identity> {
        let token = parse_cookie(headers, SESSION_COOKIE)?;
        self.read(&token)
    }

    /// `Set-Cookie` value that hands `token` to the client.
    pub fn cookie(&self, token: &str) -> String {
        format!(
            "{}={}; Path=/; Max-Age={}; SameSite=Lax",
            SESSION_COOKIE,
            token,
            self.ttl.num_seconds().max(0)
        )
    }

    /// `Set-Cookie` value that makes the client drop its session, valid or not.
    pub fn invalidate(&self) -> String {
        format!(
            "{}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; SameSite=Lax",
            SESSION_COOKIE
        )
    }
}

pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}
