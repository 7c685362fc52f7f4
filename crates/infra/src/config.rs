//! Service configuration loaded from environment variables.
//!
//! | variable | default |
//! |---|---|
//! | `JWT_SECRET` | insecure development secret (logged as a warning) |
//! | `USERS_DATABASE_URL` | unset: in-memory credential store |
//! | `BIND_ADDR` | `0.0.0.0:8080` |
//! | `ACCESS_TOKEN_TTL_SECS` | `900` |
//! | `REFRESH_TOKEN_TTL_SECS` | `86400` |
//! | `BCRYPT_COST` | `12` |
//! | `DATABASE_MAX_CONNECTIONS` | `10` |

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use vidstream_auth::TokenTtls;

pub const DEV_JWT_SECRET: &str = "dev-insecure-secret-change-me";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ACCESS_TTL_SECS: i64 = 900;
const DEFAULT_REFRESH_TTL_SECS: i64 = 86_400;
const DEFAULT_BCRYPT_COST: u32 = 12;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            var,
            reason: reason.into(),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// True when `JWT_SECRET` was not set and the development secret is in use.
    pub jwt_secret_is_default: bool,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub bcrypt_cost: u32,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let (jwt_secret, jwt_secret_is_default) = match get("JWT_SECRET") {
            Some(secret) => (secret, false),
            None => (DEV_JWT_SECRET.to_string(), true),
        };

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("BIND_ADDR", e.to_string()))?;

        let access_secs = parse_or("ACCESS_TOKEN_TTL_SECS", get("ACCESS_TOKEN_TTL_SECS"), DEFAULT_ACCESS_TTL_SECS)?;
        let refresh_secs = parse_or("REFRESH_TOKEN_TTL_SECS", get("REFRESH_TOKEN_TTL_SECS"), DEFAULT_REFRESH_TTL_SECS)?;
        if access_secs <= 0 {
            return Err(ConfigError::invalid("ACCESS_TOKEN_TTL_SECS", "must be positive"));
        }
        if refresh_secs <= 0 {
            return Err(ConfigError::invalid("REFRESH_TOKEN_TTL_SECS", "must be positive"));
        }

        let bcrypt_cost = parse_or("BCRYPT_COST", get("BCRYPT_COST"), DEFAULT_BCRYPT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::invalid("BCRYPT_COST", "must be between 4 and 31"));
        }

        let database_max_connections =
            parse_or("DATABASE_MAX_CONNECTIONS", get("DATABASE_MAX_CONNECTIONS"), DEFAULT_MAX_CONNECTIONS)?;
        if database_max_connections == 0 {
            return Err(ConfigError::invalid("DATABASE_MAX_CONNECTIONS", "must be positive"));
        }

        Ok(Self {
            bind_addr,
            jwt_secret,
            jwt_secret_is_default,
            database_url: get("USERS_DATABASE_URL"),
            database_max_connections,
            access_token_ttl: Duration::seconds(access_secs),
            refresh_token_ttl: Duration::seconds(refresh_secs),
            bcrypt_cost,
        })
    }

    pub fn token_ttls(&self) -> TokenTtls {
        TokenTtls {
            access: self.access_token_ttl,
            refresh: self.refresh_token_ttl,
        }
    }
}

impl core::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_secret_is_default", &self.jwt_secret_is_default)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("database_max_connections", &self.database_max_connections)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(var, e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert!(cfg.jwt_secret_is_default);
        assert_eq!(cfg.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(cfg.token_ttls(), TokenTtls::default());
        assert_eq!(cfg.bcrypt_cost, 12);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let cfg = config(&[
            ("JWT_SECRET", "s3cret"),
            ("USERS_DATABASE_URL", "postgres://localhost/users"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("ACCESS_TOKEN_TTL_SECS", "60"),
            ("REFRESH_TOKEN_TTL_SECS", "3600"),
            ("BCRYPT_COST", "4"),
        ])
        .unwrap();
        assert!(!cfg.jwt_secret_is_default);
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/users"));
        assert_eq!(cfg.access_token_ttl, Duration::seconds(60));
        assert_eq!(cfg.refresh_token_ttl, Duration::hours(1));
        assert_eq!(cfg.bcrypt_cost, 4);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = config(&[("JWT_SECRET", "  "), ("USERS_DATABASE_URL", "")]).unwrap();
        assert!(cfg.jwt_secret_is_default);
        assert_eq!(cfg.database_url, None);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = config(&[("ACCESS_TOKEN_TTL_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "ACCESS_TOKEN_TTL_SECS", .. }));

        let err = config(&[("REFRESH_TOKEN_TTL_SECS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "REFRESH_TOKEN_TTL_SECS", .. }));

        let err = config(&[("BCRYPT_COST", "3")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "BCRYPT_COST", .. }));

        let err = config(&[("BIND_ADDR", "nowhere")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "BIND_ADDR", .. }));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let cfg = config(&[("JWT_SECRET", "s3cret"), ("USERS_DATABASE_URL", "postgres://u:pw@db/x")]).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("pw@db"));
    }
}
