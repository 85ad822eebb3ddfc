//! # Application Configuration
//!
//! Runtime switches for the dispatcher, loaded from the environment or a TOML file.
//!
//! ## Environment Variables
//!
//! ### `WAYPOST_DEVELOPMENT`
//!
//! Development mode echoes every request to the console with its latency and prints the
//! route table when the dispatcher is built. Default: `true`.
//!
//! ### `WAYPOST_LOG_ROUTES`
//!
//! Print the route table at build time. Default: follows `WAYPOST_DEVELOPMENT`.
//!
//! ### `WAYPOST_STACK_SIZE`
//!
//! Stack size in bytes for the `may` coroutines that serve connections, as hex (`0x10000`)
//! or decimal (`65536`). Unparseable or zero values fall back to the default, `0x10000`
//! (64 KB). Smaller stacks overflow on the request path in debug builds.
//!
//! ## TOML
//!
//! ```toml
//! development = false
//! log_routes = true
//! stack_size = 0x20000
//! ```

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Coroutine stack size used when none is configured.
pub const DEFAULT_STACK_SIZE: usize = 0x10000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub development: bool,
    pub log_routes: bool,
    /// Bytes per `may` coroutine stack, applied by [`HttpServer::start`](crate::server::HttpServer::start).
    pub stack_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            development: true,
            log_routes: true,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_stack_size(value: &str) -> Option<usize> {
    let value = value.trim();
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    };
    parsed.filter(|size| *size > 0)
}

impl AppConfig {
    /// Production defaults: no console echo, no route table.
    #[must_use]
    pub fn production() -> Self {
        Self {
            development: false,
            log_routes: false,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let development = lookup("WAYPOST_DEVELOPMENT")
            .and_then(|v| parse_flag(&v))
            .unwrap_or(true);
        let log_routes = lookup("WAYPOST_LOG_ROUTES")
            .and_then(|v| parse_flag(&v))
            .unwrap_or(development);
        let stack_size = lookup("WAYPOST_STACK_SIZE")
            .and_then(|v| parse_stack_size(&v))
            .unwrap_or(DEFAULT_STACK_SIZE);
        Self {
            development,
            log_routes,
            stack_size,
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(source)?;
        if config.stack_size == 0 {
            config.stack_size = DEFAULT_STACK_SIZE;
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_development() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config, AppConfig::default());
        assert!(config.development);
    }

    #[test]
    fn test_log_routes_follows_development() {
        let config = AppConfig::from_lookup(lookup(&[("WAYPOST_DEVELOPMENT", "false")]));
        assert_eq!(config, AppConfig::production());
        let config = AppConfig::from_lookup(lookup(&[
            ("WAYPOST_DEVELOPMENT", "0"),
            ("WAYPOST_LOG_ROUTES", "on"),
        ]));
        assert!(!config.development);
        assert!(config.log_routes);
    }

    #[test]
    fn test_unparseable_flag_uses_default() {
        let config = AppConfig::from_lookup(lookup(&[("WAYPOST_DEVELOPMENT", "maybe")]));
        assert!(config.development);
    }

    #[test]
    fn test_toml_partial_uses_defaults() {
        let config = AppConfig::from_toml_str("development = false").unwrap();
        assert!(!config.development);
        assert!(config.log_routes);
        assert!(AppConfig::from_toml_str("development = 3").is_err());
    }

    #[test]
    fn test_stack_size_hex_and_decimal() {
        let config = AppConfig::from_lookup(lookup(&[("WAYPOST_STACK_SIZE", "0x8000")]));
        assert_eq!(config.stack_size, 0x8000);
        let config = AppConfig::from_lookup(lookup(&[("WAYPOST_STACK_SIZE", " 131072 ")]));
        assert_eq!(config.stack_size, 0x20000);
    }

    #[test]
    fn test_bad_stack_size_uses_default() {
        for raw in ["big", "0xZZ", "0", "-4096", ""] {
            let config = AppConfig::from_lookup(lookup(&[("WAYPOST_STACK_SIZE", raw)]));
            assert_eq!(config.stack_size, DEFAULT_STACK_SIZE, "{raw:?}");
        }
        assert_eq!(AppConfig::production().stack_size, 0x10000);
    }

    #[test]
    fn test_toml_stack_size() {
        let config = AppConfig::from_toml_str("stack_size = 0x20000").unwrap();
        assert_eq!(config.stack_size, 0x20000);
        let config = AppConfig::from_toml_str("stack_size = 0").unwrap();
        assert_eq!(config.stack_size, DEFAULT_STACK_SIZE);
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
