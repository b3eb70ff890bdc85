//! Interpreter configuration
//!
//! A small TOML-backed settings struct for the knobs the sandbox adapter
//! needs: the default speaker name responses are sent as, the base inline
//! style applied to HTML output, and the chat trigger character that marks
//! a message as a command.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write the config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize config to TOML
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings for one interpreter instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Name responses are spoken as when a response names no speaker
    pub speaker: String,
    /// Inline style rules prepended to every HTML response
    pub base_style: String,
    /// Leading character marking a chat message as a command
    pub trigger: char,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            speaker: "VTTCLI".to_string(),
            base_style: "padding: 0; margin: 0; white-space: pre-wrap;".to_string(),
            trigger: '!',
        }
    }
}

impl CliConfig {
    /// Load config from a file, creating the default if missing
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::debug!(?path, "loaded config");
            Ok(config)
        } else {
            let default = Self::default();
            default.save_to(path)?;
            tracing::info!(?path, "created default config");
            Ok(default)
        }
    }

    /// Save config to a file, creating parent directories as needed
    pub fn save_to(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!(?path, "saved config");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    // Unique paths per test to avoid parallel test interference
    static TEST_PATH_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn unique_config_path() -> PathBuf {
        let n = TEST_PATH_COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("vttcli-config-test-{}-{n}.toml", std::process::id()))
    }

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.speaker, "VTTCLI");
        assert_eq!(config.trigger, '!');
        assert!(config.base_style.contains("white-space"));
    }

    #[test]
    fn test_round_trip() {
        let path = unique_config_path();
        let config = CliConfig {
            speaker: "Turn Tracker".to_string(),
            base_style: String::new(),
            trigger: '/',
        };
        config.save_to(&path).unwrap();
        let loaded = CliConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_creates_default_when_missing() {
        let path = unique_config_path();
        assert!(!path.exists());
        let loaded = CliConfig::load_from(&path).unwrap();
        assert_eq!(loaded, CliConfig::default());
        assert!(path.exists());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = unique_config_path();
        std::fs::write(&path, "speaker = \"GM Helper\"\n").unwrap();
        let loaded = CliConfig::load_from(&path).unwrap();
        assert_eq!(loaded.speaker, "GM Helper");
        assert_eq!(loaded.trigger, '!');
        std::fs::remove_file(&path).ok();
    }
}
