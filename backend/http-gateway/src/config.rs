//! Configuration for the HTTP gateway
//!
//! Loads settings from:
//! 1. Environment variables
//! 2. .env file (local development)

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use grpc_auth::AlgorithmFamily;

#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Backend endpoints and timeouts
    pub services: ServiceEndpoints,

    /// Credential verification
    pub jwt: JwtConfig,

    /// Extra operations callable without a credential
    pub access: AccessConfig,

    /// Error body rendering
    pub errors: ErrorConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Clone)]
pub struct ServiceEndpoints {
    pub user_service: String,
    pub post_service: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC secret or PEM encoded public key
    pub signing_key: String,
    pub algorithm_family: AlgorithmFamily,
    pub leeway_seconds: u64,
}

// Never print the key
impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("signing_key", &"<redacted>")
            .field("algorithm_family", &self.algorithm_family)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccessConfig {
    pub public_operations: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ErrorConfig {
    /// Emit `"feild"` instead of `"field"` in error details
    pub legacy_field_key: bool,
}

impl Config {
    /// Load configuration from environment variables (after `.env`)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("GATEWAY_PORT", 8081)?,
                workers: parse_var("SERVER_WORKERS", num_cpus::get())?,
            },
            services: ServiceEndpoints {
                user_service: env::var("USER_SERVICE_ENDPOINT")
                    .unwrap_or_else(|_| "http://user:9001".to_string()),
                post_service: env::var("POST_SERVICE_ENDPOINT")
                    .unwrap_or_else(|_| "http://post:9002".to_string()),
                connect_timeout: Duration::from_secs(parse_var("CONNECT_TIMEOUT_SECS", 5)?),
                request_timeout: Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 10)?),
            },
            jwt: Self::jwt_from_env()?,
            access: AccessConfig {
                public_operations: env::var("PUBLIC_OPERATIONS")
                    .map(|ops| split_list(&ops))
                    .unwrap_or_default(),
            },
            errors: ErrorConfig {
                legacy_field_key: parse_var("ERROR_LEGACY_FIELD_KEY", false)?,
            },
        })
    }

    fn jwt_from_env() -> Result<JwtConfig> {
        let signing_key = env::var("JWT_SIGNING_KEY").context("JWT_SIGNING_KEY must be set")?;
        if signing_key.trim().is_empty() {
            return Err(anyhow!("JWT_SIGNING_KEY must not be empty"));
        }

        let algorithm_family = env::var("JWT_ALGORITHM_FAMILY")
            .unwrap_or_else(|_| "hmac".to_string())
            .parse::<AlgorithmFamily>()
            .map_err(|e| anyhow!(e))
            .context("Invalid JWT_ALGORITHM_FAMILY")?;

        Ok(JwtConfig {
            signing_key,
            algorithm_family,
            leeway_seconds: parse_var("JWT_LEEWAY_SECONDS", 0)?,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}: '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "SERVER_HOST",
        "GATEWAY_PORT",
        "SERVER_WORKERS",
        "USER_SERVICE_ENDPOINT",
        "POST_SERVICE_ENDPOINT",
        "JWT_SIGNING_KEY",
        "JWT_ALGORITHM_FAMILY",
        "JWT_LEEWAY_SECONDS",
        "PUBLIC_OPERATIONS",
        "CONNECT_TIMEOUT_SECS",
        "REQUEST_TIMEOUT_SECS",
        "ERROR_LEGACY_FIELD_KEY",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env();
        env::set_var("JWT_SIGNING_KEY", "test-secret-key");

        let config = Config::from_env().unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.services.user_service, "http://user:9001");
        assert_eq!(config.services.post_service, "http://post:9002");
        assert_eq!(config.services.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.services.request_timeout, Duration::from_secs(10));
        assert_eq!(config.jwt.algorithm_family, AlgorithmFamily::Hmac);
        assert_eq!(config.jwt.leeway_seconds, 0);
        assert!(config.access.public_operations.is_empty());
        assert!(!config.errors.legacy_field_key);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_overrides() {
        clear_env();
        env::set_var("JWT_SIGNING_KEY", "test-secret-key");
        env::set_var("GATEWAY_PORT", "9090");
        env::set_var("JWT_ALGORITHM_FAMILY", "RSA");
        env::set_var("JWT_LEEWAY_SECONDS", "30");
        env::set_var(
            "PUBLIC_OPERATIONS",
            "/post.PostService/GetPost, ,/user.UserService/GetUser",
        );
        env::set_var("ERROR_LEGACY_FIELD_KEY", "true");

        let config = Config::from_env().unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.jwt.algorithm_family, AlgorithmFamily::Rsa);
        assert_eq!(config.jwt.leeway_seconds, 30);
        assert_eq!(
            config.access.public_operations,
            vec!["/post.PostService/GetPost", "/user.UserService/GetUser"]
        );
        assert!(config.errors.legacy_field_key);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_signing_key_fails() {
        clear_env();

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("JWT_SIGNING_KEY"));
    }

    #[test]
    #[serial]
    fn test_invalid_values_fail_with_context() {
        clear_env();
        env::set_var("JWT_SIGNING_KEY", "test-secret-key");
        env::set_var("GATEWAY_PORT", "not-a-port");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("GATEWAY_PORT"));

        env::set_var("GATEWAY_PORT", "8081");
        env::set_var("JWT_ALGORITHM_FAMILY", "none");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("JWT_ALGORITHM_FAMILY"));

        clear_env();
    }

    #[test]
    fn test_debug_redacts_signing_key() {
        let jwt = JwtConfig {
            signing_key: "super-secret".to_string(),
            algorithm_family: AlgorithmFamily::Hmac,
            leeway_seconds: 0,
        };

        let printed = format!("{:?}", jwt);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("redacted"));
    }
}
