// auth/identity.rs - Credential checks behind POST /login

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::AuthError;
use crate::config::{AuthConfig, AuthProvider};

/// Verifies a username/password pair and names the signed-in user
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, username: &str, password: &str) -> Result<String, AuthError>;

    /// Shown next to a failed login, e.g. which demo account to use
    fn hint(&self) -> Option<&str> {
        None
    }
}

/// A fixed set of accounts compared verbatim
pub struct FixedCredentials {
    accounts: Vec<(String, String)>,
    hint: Option<String>,
}

impl FixedCredentials {
    pub fn new(accounts: Vec<(String, String)>) -> Self {
        Self { accounts, hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Default for FixedCredentials {
    fn default() -> Self {
        Self::new(vec![
            ("admin".to_string(), "admin".to_string()),
            ("demo".to_string(), "demo".to_string()),
        ])
        .with_hint("Use the demo credentials demo/demo")
    }
}

#[async_trait]
impl IdentityProvider for FixedCredentials {
    async fn verify(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let matched = self
            .accounts
            .iter()
            .any(|(u, p)| u == username && p == password);
        if matched {
            Ok(username.to_string())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }
}

/// Email/password sign-in against an external auth service
pub struct RemoteIdentity {
    client: reqwest::Client,
    base_url: url::Url,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoteUser {
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoteSession {
    user: Option<RemoteUser>,
}

impl RemoteIdentity {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, AuthError> {
        let base_url = url::Url::parse(base_url)
            .map_err(|e| AuthError::Unavailable(format!("invalid auth service URL: {}", e)))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        })
    }

    fn token_url(&self) -> Result<url::Url, AuthError> {
        let mut url = self
            .base_url
            .join("auth/v1/token")
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        Ok(url)
    }
}

#[async_trait]
impl IdentityProvider for RemoteIdentity {
    async fn verify(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let mut request = self
            .client
            .post(self.token_url()?)
            .json(&json!({ "email": username, "password": password }));
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(AuthError::InvalidCredentials);
        }
        if !status.is_success() {
            warn!("Identity service answered {}", status);
            return Err(AuthError::Unavailable(format!("status {}", status)));
        }

        let session: RemoteSession = response
            .json()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;
        let email = session
            .user
            .and_then(|u| u.email)
            .unwrap_or_else(|| username.to_string());
        Ok(email)
    }
}

/// Build the provider selected by configuration
pub fn from_config(config: &AuthConfig) -> Result<Box<dyn IdentityProvider>, AuthError> {
    match config.provider {
        AuthProvider::Fixed => Ok(Box::new(FixedCredentials::default())),
        AuthProvider::Remote => {
            let url = config
                .remote_url
                .as_deref()
                .ok_or_else(|| AuthError::Unavailable("AUTH_REMOTE_URL is not set".to_string()))?;
            info!("Using remote identity service at {}", url);
            Ok(Box::new(RemoteIdentity::new(url, config.remote_api_key.clone())?))
        }
    }
}
