//! Configuration for the prompter relay

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Default listening port for the relay
pub const DEFAULT_PORT: u16 = 2352;

/// Configuration for the relay server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Address to bind the listening socket to
    pub bind_address: IpAddr,

    /// Port to listen on (0 lets the OS pick, useful in tests)
    pub port: u16,

    /// Upper bound on an inbound text frame, in bytes
    ///
    /// The wire protocol imposes no cap, so the relay enforces an
    /// application-level one; oversized frames are dropped like any other
    /// malformed frame.
    pub max_message_bytes: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            max_message_bytes: 16 * 1024,
        }
    }
}

impl RelayConfig {
    /// The socket address the server will bind
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

/// Get the default configuration directory
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("prompter")
}

/// Get the default configuration file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: RelayConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to a file
pub fn save_config(path: &Path, config: &RelayConfig) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::Invalid(format!("Failed to create config dir: {}", e)))?;
    }

    std::fs::write(path, content)
        .map_err(|e| ConfigError::Invalid(format!("Failed to write config: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:2352");
        assert!(config.max_message_bytes > 0);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: RelayConfig = toml::from_str("port = 9000").unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.bind_address, IpAddr::from([0, 0, 0, 0]));
        assert_eq!(config.max_message_bytes, 16 * 1024);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = RelayConfig::default();
        config.port = 4000;
        config.max_message_bytes = 2048;

        save_config(&path, &config).unwrap();
        let loaded = load_config(&path).unwrap();

        assert_eq!(loaded.port, 4000);
        assert_eq!(loaded.max_message_bytes, 2048);
    }

    #[test]
    fn test_load_missing_config() {
        let err = load_config(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
