pub mod cookie;
pub mod identity;

pub use identity::{FixedCredentials, IdentityProvider, RemoteIdentity};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{SecurityConfig, MAX_SESSION_TTL_HOURS};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "mcs51docs_admin_auth";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username or email the session was issued to
    pub sub: String,
    /// Session id, keys the dashboard workspace
    pub sid: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(username: impl Into<String>, ttl_hours: u64) -> Self {
        let now = Utc::now();
        let ttl_hours = ttl_hours.min(MAX_SESSION_TTL_HOURS) as i64;
        let exp = (now + Duration::hours(ttl_hours)).timestamp();

        Self {
            sub: username.into(),
            sid: Uuid::new_v4(),
            exp,
            iat: now.timestamp(),
        }
    }
}

/// Who is signed in for the current request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub username: String,
    pub session_id: Uuid,
    /// When the session token stops being accepted
    pub expires_at: DateTime<Utc>,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.sub,
            session_id: claims.sid,
            expires_at: DateTime::from_timestamp(claims.exp, 0).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }
}

/// Result of evaluating the session cookie on a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated(Identity),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    /// Evaluate an optional session token; any invalid token is anonymous
    pub fn from_token(token: Option<&str>, security: &SecurityConfig) -> Self {
        match token.map(|t| validate_session_token(t, security)) {
            Some(Ok(claims)) => AuthState::Authenticated(claims.into()),
            Some(Err(e)) => {
                tracing::debug!("Ignoring session token: {}", e);
                AuthState::Unauthenticated
            }
            None => AuthState::Unauthenticated,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Identity service unavailable: {0}")]
    Unavailable(String),

    #[error("Session secret not configured")]
    MissingSecret,

    #[error("Session token error: {0}")]
    Token(String),
}

pub fn issue_session_token(claims: &Claims, security: &SecurityConfig) -> Result<String, AuthError> {
    if security.session_secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(security.session_secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| AuthError::Token(e.to_string()))
}

pub fn validate_session_token(token: &str, security: &SecurityConfig) -> Result<Claims, AuthError> {
    if security.session_secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.session_secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| AuthError::Token(e.to_string()))?;

    Ok(token_data.claims)
}
