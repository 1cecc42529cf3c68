//! Persistent settings for hd41ctl
//!
//! Stored as TOML, by default at `~/.config/hd41/hd41ctl.toml`. Every field
//! has a default so a partial (or missing) file is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use hd41_matrix::PollGroups;
use hd41_transport::protocol::{serial, timing};
use hd41_transport::RetryPolicy;
use serde::{Deserialize, Serialize};

/// Serial link settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Port path; the first USB adapter is used when unset
    pub port: Option<String>,
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: serial::DEFAULT_BAUD_RATE,
        }
    }
}

/// Command engine tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    pub attempts: usize,
    pub response_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            attempts: timing::ATTEMPTS,
            response_timeout_ms: timing::RESPONSE_TIMEOUT_MS,
            poll_interval_ms: timing::POLL_INTERVAL_MS,
        }
    }
}

impl ProtocolConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.attempts,
            self.response_timeout_ms,
            self.poll_interval_ms,
        )
    }
}

/// `watch` command settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// How often input/audio/auto-switch/ARC are polled
    pub switch_interval_ms: u64,
    /// How often connection state is polled
    pub sensor_interval_ms: u64,
    #[serde(flatten)]
    pub groups: PollGroups,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            switch_interval_ms: 1000,
            sensor_interval_ms: 5000,
            groups: PollGroups::all(),
        }
    }
}

impl WatchConfig {
    pub fn switch_interval(&self) -> Duration {
        Duration::from_millis(self.switch_interval_ms.max(1))
    }

    pub fn sensor_interval(&self) -> Duration {
        Duration::from_millis(self.sensor_interval_ms.max(1))
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub serial: SerialConfig,
    pub protocol: ProtocolConfig,
    pub watch: WatchConfig,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hd41")
            .join("hd41ctl.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, port: Option<String>, baud_rate: Option<u32>) -> Self {
        if port.is_some() {
            self.serial.port = port;
        }
        if let Some(baud_rate) = baud_rate {
            self.serial.baud_rate = baud_rate;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hd41_matrix::Port;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("baud_rate = 9600"));
        assert!(toml_str.contains("attempts = 3"));
        assert!(toml_str.contains("response_timeout_ms = 1000"));
        assert!(toml_str.contains("sensor_interval_ms = 5000"));
    }

    #[test]
    fn test_roundtrip() {
        let mut config = Config::default();
        config.serial.port = Some("/dev/ttyUSB1".into());
        config.watch.groups.arc = false;
        config.watch.groups.connections = vec![Port::Output];

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file() {
        let partial = r#"
[serial]
port = "/dev/ttyS0"

[watch]
audio = false
connections = ["input1", "input2"]
"#;
        let config: Config = toml::from_str(partial).unwrap();
        assert_eq!(config.serial.port.as_deref(), Some("/dev/ttyS0"));
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.protocol, ProtocolConfig::default());
        assert!(!config.watch.groups.audio);
        assert!(config.watch.groups.input);
        assert_eq!(config.watch.groups.connections, vec![Port::Input1, Port::Input2]);
        assert_eq!(config.watch.switch_interval_ms, 1000);
    }

    #[test]
    fn test_overrides() {
        let config = Config::default().with_overrides(Some("COM3".into()), Some(19200));
        assert_eq!(config.serial.port.as_deref(), Some("COM3"));
        assert_eq!(config.serial.baud_rate, 19200);

        let config = config.with_overrides(None, None);
        assert_eq!(config.serial.port.as_deref(), Some("COM3"));
    }

    #[test]
    fn test_retry_policy() {
        let policy = ProtocolConfig {
            attempts: 5,
            response_timeout_ms: 250,
            poll_interval_ms: 2,
        }
        .retry_policy();
        assert_eq!(policy.attempts, 5);
        assert_eq!(policy.response_timeout, Duration::from_millis(250));
        assert_eq!(policy.poll_interval, Duration::from_millis(2));
    }

    #[test]
    fn test_load_missing_file_gives_default() {
        let path = std::env::temp_dir().join("hd41ctl-does-not-exist.toml");
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }
}
