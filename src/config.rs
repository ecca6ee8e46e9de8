//! Service configuration
//!
//! Defaults can be overridden through `DISPATCH_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const ENV_LISTEN_ADDR: &str = "DISPATCH_LISTEN_ADDR";
pub const ENV_SEED_PATH: &str = "DISPATCH_SEED_PATH";
pub const ENV_BATTERY_REPORT_SECS: &str = "DISPATCH_BATTERY_REPORT_SECS";
pub const ENV_FLATTEN_ERRORS: &str = "DISPATCH_FLATTEN_ERRORS";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid {expected}: '{value}'")]
    Malformed {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    /// Address the TCP listener binds to
    pub listen_addr: String,
    /// Optional JSON seed file loaded at startup
    pub seed_path: Option<PathBuf>,
    /// Period of the battery level report
    pub battery_report_interval: Duration,
    /// Report every failure as BAD_REQUEST
    pub flatten_error_status: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            seed_path: None,
            battery_report_interval: Duration::from_secs(300),
            flatten_error_status: false,
        }
    }
}

impl DispatchConfig {
    /// Read overrides from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from an arbitrary variable source. Unset or empty
    /// variables keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(addr) = get(ENV_LISTEN_ADDR) {
            config.listen_addr = addr;
        }
        if let Some(path) = get(ENV_SEED_PATH) {
            config.seed_path = Some(PathBuf::from(path));
        }
        if let Some(value) = get(ENV_BATTERY_REPORT_SECS) {
            let secs = value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Malformed {
                    var: ENV_BATTERY_REPORT_SECS,
                    expected: "positive number of seconds",
                    value: value.clone(),
                })?;
            config.battery_report_interval = Duration::from_secs(secs);
        }
        if let Some(value) = get(ENV_FLATTEN_ERRORS) {
            config.flatten_error_status = parse_bool(&value).ok_or(ConfigError::Malformed {
                var: ENV_FLATTEN_ERRORS,
                expected: "boolean",
                value: value.clone(),
            })?;
        }

        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
