use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub cookies: CookieConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Base URL of the external auth provider (owns session issuance and lookup).
    pub service_url: String,
    /// Base URL of the platform auth REST API (register/login/logout).
    pub api_url: String,
    /// Upper bound on a single session-lookup call. A lookup that exceeds it
    /// is treated as "no session", not retried.
    pub lookup_timeout_secs: u64,
    /// Bound on the health-probe call to the auth provider.
    pub health_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    pub ttl_days: i64,
    pub secure: bool,
}

impl GateConfig {
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
        if let Ok(v) = env::var("GATE_PORT").or_else(|_| env::var("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("GATE_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Auth overrides
        if let Ok(v) = env::var("AUTH_SERVICE_URL") {
            self.auth.service_url = v;
        }
        if let Ok(v) = env::var("AUTH_API_URL") {
            self.auth.api_url = v;
        }
        if let Ok(v) = env::var("AUTH_LOOKUP_TIMEOUT_SECS") {
            self.auth.lookup_timeout_secs = v.parse().unwrap_or(self.auth.lookup_timeout_secs);
        }
        if let Ok(v) = env::var("AUTH_HEALTH_TIMEOUT_SECS") {
            self.auth.health_timeout_secs = v.parse().unwrap_or(self.auth.health_timeout_secs);
        }

        // Cookie overrides
        if let Ok(v) = env::var("COOKIE_TTL_DAYS") {
            self.cookies.ttl_days = v.parse().unwrap_or(self.cookies.ttl_days);
        }
        if let Ok(v) = env::var("COOKIE_SECURE") {
            self.cookies.secure = v.parse().unwrap_or(self.cookies.secure);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 8088,
                enable_request_logging: true,
            },
            auth: AuthConfig {
                service_url: "http://localhost:3000".to_string(),
                api_url: "http://localhost:8080/api/auth".to_string(),
                lookup_timeout_secs: 10,
                health_timeout_secs: 5,
            },
            cookies: CookieConfig {
                ttl_days: 7,
                secure: false,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 8088,
                enable_request_logging: true,
            },
            auth: AuthConfig {
                service_url: "https://auth.staging.example.com".to_string(),
                api_url: "https://api.staging.example.com/api/auth".to_string(),
                lookup_timeout_secs: 10,
                health_timeout_secs: 5,
            },
            cookies: CookieConfig {
                ttl_days: 7,
                secure: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 8088,
                enable_request_logging: false,
            },
            auth: AuthConfig {
                service_url: "https://auth.example.com".to_string(),
                api_url: "https://api.example.com/api/auth".to_string(),
                lookup_timeout_secs: 10,
                health_timeout_secs: 5,
            },
            cookies: CookieConfig {
                ttl_days: 7,
                secure: true,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<GateConfig> = Lazy::new(GateConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static GateConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = GateConfig::development();
        assert_eq!(config.auth.lookup_timeout_secs, 10);
        assert_eq!(config.cookies.ttl_days, 7);
        assert!(!config.cookies.secure);
        assert!(config.server.enable_request_logging);
    }

    #[test]
    fn test_default_production_config() {
        let config = GateConfig::production();
        assert_eq!(config.auth.lookup_timeout_secs, 10);
        assert!(config.cookies.secure);
        assert!(!config.server.enable_request_logging);
    }
}
