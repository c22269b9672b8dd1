//! Bridge configuration.
//!
//! Sources in priority order:
//! 1. TOML file (`-c FILE`, or `comfolink.toml` in the working directory)
//! 2. Environment variables (fallback)
//!
//! A file without a `host` still picks the host up from `COMFOLINK_HOST`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{BridgeError, BridgeResult};

/// Default values
pub mod defaults {
    pub const PORT: u16 = 502;
    pub const UNIT_ID: u8 = 1;
    pub const NAME: &str = comfolink_core::register_map::DEVICE_NAME;
    pub const SCAN_INTERVAL_SECS: u64 = 15;
    pub const TIMEOUT_MS: u64 = 3000;
    pub const CONFIG_FILE: &str = "comfolink.toml";
}

/// Environment variable names
pub mod env_vars {
    pub const HOST: &str = "COMFOLINK_HOST";
    pub const PORT: &str = "COMFOLINK_PORT";
    pub const UNIT_ID: &str = "COMFOLINK_UNIT_ID";
    pub const SCAN_INTERVAL: &str = "COMFOLINK_SCAN_INTERVAL";
    pub const TIMEOUT_MS: &str = "COMFOLINK_TIMEOUT_MS";
    pub const LOG_JSON: &str = "COMFOLINK_LOG_JSON";
}

fn default_port() -> u16 {
    defaults::PORT
}

fn default_unit_id() -> u8 {
    defaults::UNIT_ID
}

fn default_name() -> String {
    defaults::NAME.to_string()
}

fn default_scan_interval() -> u64 {
    defaults::SCAN_INTERVAL_SECS
}

fn default_timeout_ms() -> u64 {
    defaults::TIMEOUT_MS
}

/// Connection settings for one controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_unit_id")]
    pub unit_id: u8,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_port(),
            unit_id: default_unit_id(),
            name: default_name(),
            scan_interval_secs: default_scan_interval(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl DeviceConfig {
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Host, required for a TCP connection.
    pub fn require_host(&self) -> BridgeResult<&str> {
        self.host
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| {
                BridgeError::Config(format!(
                    "no device host configured (set [device].host or {})",
                    env_vars::HOST
                ))
            })
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub device: DeviceConfig,
}

impl BridgeConfig {
    pub fn from_toml_str(content: &str) -> BridgeResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| BridgeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Defaults overridden by whatever `lookup` returns.
    pub fn from_env_with<F>(lookup: F) -> BridgeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let device = &mut config.device;

        device.host = lookup(env_vars::HOST);
        if let Some(port) = parse_var(&lookup, env_vars::PORT)? {
            device.port = port;
        }
        if let Some(unit_id) = parse_var(&lookup, env_vars::UNIT_ID)? {
            device.unit_id = unit_id;
        }
        if let Some(secs) = parse_var(&lookup, env_vars::SCAN_INTERVAL)? {
            device.scan_interval_secs = secs;
        }
        if let Some(ms) = parse_var(&lookup, env_vars::TIMEOUT_MS)? {
            device.timeout_ms = ms;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> BridgeResult<Self> {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    /// Load from `path`, the default file if present, or the environment.
    pub fn load(path: Option<&Path>) -> BridgeResult<Self> {
        let default_path = Path::new(defaults::CONFIG_FILE);
        let file = match path {
            Some(p) => Some(p),
            None if default_path.exists() => Some(default_path),
            None => None,
        };

        let mut config = match file {
            Some(p) => {
                info!(path = %p.display(), "Loading config from file");
                Self::from_file(p)?
            }
            None => {
                info!("Loading config from environment variables");
                return Self::from_env();
            }
        };

        if config.device.host.is_none() {
            config.device.host = std::env::var(env_vars::HOST).ok();
        }
        Ok(config)
    }

    pub fn validate(&self) -> BridgeResult<()> {
        if self.device.scan_interval_secs == 0 {
            return Err(BridgeError::Config(
                "scan_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.device.timeout_ms == 0 {
            return Err(BridgeError::Config(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> BridgeResult<Option<T>>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| BridgeError::Config(format!("invalid value for {}: '{}'", name, raw))),
    }
}

/// Whether JSON log output was requested.
pub fn log_json_enabled() -> bool {
    std::env::var(env_vars::LOG_JSON)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.device.port, 502);
        assert_eq!(config.device.unit_id, 1);
        assert_eq!(config.device.name, "ComfoConnect PRO");
        assert_eq!(config.device.scan_interval(), Duration::from_secs(15));
        assert_eq!(config.device.timeout(), Duration::from_millis(3000));
        assert!(config.device.require_host().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config = BridgeConfig::from_toml_str(
            r#"
            [device]
            host = "192.168.1.50"
            scan_interval_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.device.require_host().unwrap(), "192.168.1.50");
        assert_eq!(config.device.scan_interval_secs, 30);
        assert_eq!(config.device.port, 502);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(BridgeConfig::from_toml_str("").unwrap(), BridgeConfig::default());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = BridgeConfig::from_toml_str("[device]\nscan_interval_secs = 0\n");
        assert!(matches!(result, Err(BridgeError::Config(_))));
    }

    #[test]
    fn test_env_lookup() {
        let vars: HashMap<&str, &str> = [
            (env_vars::HOST, "comfo.local"),
            (env_vars::PORT, "5020"),
            (env_vars::UNIT_ID, "3"),
        ]
        .into_iter()
        .collect();
        let config =
            BridgeConfig::from_env_with(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.device.host.as_deref(), Some("comfo.local"));
        assert_eq!(config.device.port, 5020);
        assert_eq!(config.device.unit_id, 3);
        assert_eq!(config.device.timeout_ms, 3000);
    }

    #[test]
    fn test_env_invalid_number() {
        let result = BridgeConfig::from_env_with(|name| {
            (name == env_vars::PORT).then(|| "not-a-port".to_string())
        });
        assert!(matches!(result, Err(BridgeError::Config(msg)) if msg.contains(env_vars::PORT)));
    }
}
