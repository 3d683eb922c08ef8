//! Configuration loading from the process environment.

use std::net::SocketAddr;

use keygate_observability::LogFormat;

pub const BIND_ADDR_VAR: &str = "KEYGATE_BIND_ADDR";
pub const ADMIN_USERNAME_VAR: &str = "KEYGATE_ADMIN_USERNAME";
pub const SEED_PRODUCTS_VAR: &str = "KEYGATE_SEED_PRODUCTS";
pub const LOG_FORMAT_VAR: &str = "KEYGATE_LOG_FORMAT";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ADMIN_USERNAME: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Username of the administrative principal created at first start.
    pub admin_username: String,
    /// Seed the demo product catalog at startup.
    pub seed_products: bool,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup (unset and empty both mean "default").
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let bind_addr = get(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_addr.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            var: BIND_ADDR_VAR,
            value: bind_addr.clone(),
            reason: e.to_string(),
        })?;

        let admin_username =
            get(ADMIN_USERNAME_VAR).unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string());

        let seed_products = match get(SEED_PRODUCTS_VAR) {
            None => true,
            Some(v) => parse_bool(&v).ok_or_else(|| ConfigError::Invalid {
                var: SEED_PRODUCTS_VAR,
                value: v.clone(),
                reason: "expected true/false".to_string(),
            })?,
        };

        let log_format = match get(LOG_FORMAT_VAR) {
            None => LogFormat::default(),
            Some(v) => v.parse().map_err(|e: keygate_observability::UnknownLogFormat| {
                ConfigError::Invalid {
                    var: LOG_FORMAT_VAR,
                    value: v.clone(),
                    reason: e.to_string(),
                }
            })?,
        };

        Ok(Self {
            bind_addr,
            admin_username,
            seed_products,
            log_format,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(cfg.admin_username, "admin");
        assert!(cfg.seed_products);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn reads_overrides() {
        let cfg = config(&[
            (BIND_ADDR_VAR, "127.0.0.1:9000"),
            (ADMIN_USERNAME_VAR, "root"),
            (SEED_PRODUCTS_VAR, "off"),
            (LOG_FORMAT_VAR, "text"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.admin_username, "root");
        assert!(!cfg.seed_products);
        assert_eq!(cfg.log_format, LogFormat::Text);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = config(&[(BIND_ADDR_VAR, "nowhere")]).unwrap_err();
        assert!(err.to_string().starts_with(BIND_ADDR_VAR));

        let err = config(&[(SEED_PRODUCTS_VAR, "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: SEED_PRODUCTS_VAR, .. }));
    }
}
