use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use crate::serial::{BAUD_RATE, DEFAULT_PORT_NAME};

pub const ENV_PORT: &str = "MOTOR_BRIDGE_PORT";
pub const ENV_BAUD_RATE: &str = "MOTOR_BRIDGE_BAUD_RATE";
pub const ENV_LISTEN_ADDR: &str = "MOTOR_BRIDGE_LISTEN_ADDR";
pub const ENV_LOG_LEVEL: &str = "MOTOR_BRIDGE_LOG_LEVEL";
pub const ENV_STATIC_DIR: &str = "MOTOR_BRIDGE_STATIC_DIR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid listen address {0}: {1}")]
    InvalidListenAddr(String, std::net::AddrParseError),
}

/// Bridge settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeSettings {
    pub port_name: String,
    pub baud_rate: u32,
    pub write_timeout_ms: u64,
    pub listen_addr: String,
    pub require_json_content_type: bool,
    pub log_level: String,
    /// Directory served for paths no API route claims (web UI assets)
    pub static_dir: Option<String>,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            port_name: DEFAULT_PORT_NAME.to_string(),
            baud_rate: BAUD_RATE,
            write_timeout_ms: 1000,
            listen_addr: "0.0.0.0:8080".to_string(),
            require_json_content_type: true,
            log_level: "info".to_string(),
            static_dir: None,
        }
    }
}

impl BridgeSettings {
    /// Defaults with the `MOTOR_BRIDGE_*` environment variables applied on top
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(port) = lookup(ENV_PORT) {
            settings.port_name = port;
        }
        if let Some(baud) = lookup(ENV_BAUD_RATE) {
            settings.baud_rate = baud
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key: ENV_BAUD_RATE, value: baud.clone() })?;
        }
        if let Some(addr) = lookup(ENV_LISTEN_ADDR) {
            settings.listen_addr = addr;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            settings.log_level = level;
        }
        if let Some(dir) = lookup(ENV_STATIC_DIR) {
            settings.static_dir = Some(dir);
        }

        settings.socket_addr()?;
        Ok(settings)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen_addr
            .parse()
            .map_err(|e| ConfigError::InvalidListenAddr(self.listen_addr.clone(), e))
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}
