use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

/// Upper bound for `SESSION_TTL_HOURS` (one year)
pub const MAX_SESSION_TTL_HOURS: u64 = 24 * 366;
/// Upper bound for `DASHBOARD_NOTICE_TTL_SECS` (one day)
pub const MAX_NOTICE_TTL_SECS: u64 = 24 * 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub auth: AuthConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Unset means the in-memory store seeded from the bundled fixtures
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub session_secret: String,
    pub session_ttl_hours: u64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    /// admin/admin and demo/demo
    Fixed,
    /// Email/password sign-in against an external auth service
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub provider: AuthProvider,
    pub remote_url: Option<String>,
    #[serde(skip_serializing)]
    pub remote_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub notice_ttl_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("MCS51_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.server.cors_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("SESSION_SECRET") {
            self.security.session_secret = v;
        }
        if let Ok(v) = env::var("SESSION_TTL_HOURS") {
            self.security.session_ttl_hours = v
                .parse()
                .unwrap_or(self.security.session_ttl_hours)
                .min(MAX_SESSION_TTL_HOURS);
        }
        if let Ok(v) = env::var("SESSION_COOKIE_SECURE") {
            self.security.cookie_secure = v.parse().unwrap_or(self.security.cookie_secure);
        }

        // Auth overrides
        match env::var("AUTH_PROVIDER").as_deref() {
            Ok("remote") => self.auth.provider = AuthProvider::Remote,
            Ok("fixed") => self.auth.provider = AuthProvider::Fixed,
            _ => {}
        }
        if let Ok(v) = env::var("AUTH_REMOTE_URL") {
            self.auth.remote_url = Some(v);
        }
        if let Ok(v) = env::var("AUTH_REMOTE_KEY") {
            self.auth.remote_api_key = Some(v);
        }

        // Dashboard overrides
        if let Ok(v) = env::var("DASHBOARD_NOTICE_TTL_SECS") {
            self.dashboard.notice_ttl_secs = v
                .parse()
                .unwrap_or(self.dashboard.notice_ttl_secs)
                .min(MAX_NOTICE_TTL_SECS);
        }

        self
    }

    /// Settings the server cannot start without
    pub fn validate(&self) -> Result<(), String> {
        if self.security.session_secret.trim().is_empty() {
            return Err(format!(
                "SESSION_SECRET must be set in {:?}",
                self.environment
            ));
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                session_secret: "mcs51docs-development-secret".to_string(),
                session_ttl_hours: 24 * 7, // 1 week
                cookie_secure: false,
            },
            auth: AuthConfig {
                provider: AuthProvider::Fixed,
                remote_url: None,
                remote_api_key: None,
            },
            dashboard: DashboardConfig { notice_ttl_secs: 3 },
        }
    }

    pub(crate) fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                cors_origins: vec![],
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                session_secret: String::new(),
                session_ttl_hours: 24,
                cookie_secure: true,
            },
            auth: AuthConfig {
                provider: AuthProvider::Fixed,
                remote_url: None,
                remote_api_key: None,
            },
            dashboard: DashboardConfig { notice_ttl_secs: 3 },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                cors_origins: vec![],
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                session_secret: String::new(),
                session_ttl_hours: 8,
                cookie_secure: true,
            },
            auth: AuthConfig {
                provider: AuthProvider::Remote,
                remote_url: None,
                remote_api_key: None,
            },
            dashboard: DashboardConfig { notice_ttl_secs: 3 },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults_use_memory_store_and_fixed_accounts() {
        let config = AppConfig::development();
        assert!(config.database.url.is_none());
        assert_eq!(config.auth.provider, AuthProvider::Fixed);
        assert!(!config.security.session_secret.is_empty());
        assert_eq!(config.dashboard.notice_ttl_secs, 3);
    }

    #[test]
    fn production_requires_explicit_secret() {
        let config = AppConfig::production();
        assert!(config.security.session_secret.is_empty());
        assert!(config.security.cookie_secure);
        assert_eq!(config.auth.provider, AuthProvider::Remote);

        let err = config.validate().unwrap_err();
        assert!(err.contains("SESSION_SECRET"));
        assert!(AppConfig::staging().validate().is_err());
        assert!(AppConfig::development().validate().is_ok());
    }

    #[test]
    fn oversized_ttls_are_clamped() {
        env::set_var("SESSION_TTL_HOURS", u64::MAX.to_string());
        env::set_var("DASHBOARD_NOTICE_TTL_SECS", "99999999999999");
        let config = AppConfig::development().with_env_overrides();
        env::remove_var("SESSION_TTL_HOURS");
        env::remove_var("DASHBOARD_NOTICE_TTL_SECS");

        assert_eq!(config.security.session_ttl_hours, MAX_SESSION_TTL_HOURS);
        assert_eq!(config.dashboard.notice_ttl_secs, MAX_NOTICE_TTL_SECS);
    }
}
