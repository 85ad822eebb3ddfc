//! Structured logging setup on `tracing-subscriber`.
//!
//! ## Environment Variables
//!
//! - `WAYPOST_LOG_LEVEL`: `trace`, `debug`, `info` (default), `warn` or `error`
//! - `WAYPOST_LOG_FORMAT`: `pretty` (default) or `json`
//! - `WAYPOST_LOG_TARGET_FILTER`: extra comma-separated directives, e.g.
//!   `waypost::router=debug,may_minihttp=error`
//!
//! `RUST_LOG`, when set, replaces the level.

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    pub target_filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Pretty,
            target_filter: None,
        }
    }
}

fn parse_level(s: &str) -> Level {
    match s.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

impl LogConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            level: lookup("WAYPOST_LOG_LEVEL")
                .map(|v| parse_level(&v))
                .unwrap_or(Level::INFO),
            format: lookup("WAYPOST_LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or(LogFormat::Pretty),
            target_filter: lookup("WAYPOST_LOG_TARGET_FILTER").filter(|v| !v.trim().is_empty()),
        }
    }

    /// The filter this config installs, ignoring `RUST_LOG`.
    pub fn env_filter(&self) -> Result<EnvFilter> {
        let mut filter = EnvFilter::new(self.level.as_str());
        filter = self.apply_targets(filter)?;
        Ok(filter)
    }

    fn apply_targets(&self, mut filter: EnvFilter) -> Result<EnvFilter> {
        if let Some(targets) = &self.target_filter {
            for directive in targets.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                let parsed = directive
                    .parse::<Directive>()
                    .with_context(|| format!("invalid log filter directive: {directive}"))?;
                filter = filter.add_directive(parsed);
            }
        }
        Ok(filter)
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(from_env) => config.apply_targets(from_env)?,
        Err(_) => config.env_filter()?,
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LogConfig::from_lookup(|_| None);
        assert_eq!(config, LogConfig::default());
    }

    #[test]
    fn test_from_lookup() {
        let config = LogConfig::from_lookup(|key| match key {
            "WAYPOST_LOG_LEVEL" => Some("DEBUG".to_string()),
            "WAYPOST_LOG_FORMAT" => Some("json".to_string()),
            "WAYPOST_LOG_TARGET_FILTER" => Some("waypost::router=trace".to_string()),
            _ => None,
        });
        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.env_filter().is_ok());
    }

    #[test]
    fn test_bad_directive_is_an_error() {
        let config = LogConfig {
            target_filter: Some("waypost=loud".to_string()),
            ..LogConfig::default()
        };
        assert!(config.env_filter().is_err());
    }

    #[test]
    fn test_unknown_values_fall_back() {
        assert_eq!(parse_level("verbose"), Level::INFO);
        assert_eq!(LogFormat::parse("xml"), LogFormat::Pretty);
    }
}
