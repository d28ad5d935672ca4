//! Stack engine configuration.
//!
//! Use the builder methods to customize engine behavior, or deserialize an
//! `EngineConfig` from a host config file.
//!
//! # Example
//!
//! ```ignore
//! use folio::config::{EngineConfig, RetentionPolicy};
//!
//! let config = EngineConfig::default()
//!     .with_retention(RetentionPolicy::KeepMounted)
//!     .with_frame_interval(Duration::from_millis(8));
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable selecting the retention policy (`retain` or `keep`).
pub const RETENTION_ENV: &str = "FOLIO_RETENTION";

/// Environment variable overriding the frame interval in milliseconds.
pub const FRAME_MS_ENV: &str = "FOLIO_FRAME_MS";

const DEFAULT_FRAME_MS: u64 = 16;

/// What happens to an entry once another entry covers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// The covered page is fully unmounted and its state retained until it
    /// is revealed again.
    #[default]
    UnmountAndRetain,
    /// The covered page stays mounted with its view hidden.
    KeepMounted,
}

impl RetentionPolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "retain" | "unmount" | "unmount_and_retain" => Some(Self::UnmountAndRetain),
            "keep" | "keep_mounted" => Some(Self::KeepMounted),
            _ => None,
        }
    }
}

/// Configuration shared by a root engine and every nested engine below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Policy for demoted entries.
    pub retention: RetentionPolicy,
    /// Delay between scheduling turns used by `StackEngine::settle`.
    pub frame_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retention: RetentionPolicy::default(),
            frame_interval_ms: DEFAULT_FRAME_MS,
        }
    }
}

impl EngineConfig {
    /// Create a new EngineConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `FOLIO_RETENTION` and `FOLIO_FRAME_MS`.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var(RETENTION_ENV) {
            match RetentionPolicy::parse(&raw) {
                Some(policy) => config.retention = policy,
                None => tracing::warn!(value = %raw, "ignoring unknown {}", RETENTION_ENV),
            }
        }

        if let Ok(raw) = std::env::var(FRAME_MS_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.frame_interval_ms = ms,
                _ => tracing::warn!(value = %raw, "ignoring invalid {}", FRAME_MS_ENV),
            }
        }

        config
    }

    /// Set the retention policy.
    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    /// Set the scheduling-turn interval.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval_ms = (interval.as_millis() as u64).max(1);
        self
    }

    /// Scheduling-turn interval as a `Duration`.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.retention, RetentionPolicy::UnmountAndRetain);
        assert_eq!(config.frame_interval(), Duration::from_millis(16));
    }

    #[test]
    fn test_builder_methods() {
        let config = EngineConfig::new()
            .with_retention(RetentionPolicy::KeepMounted)
            .with_frame_interval(Duration::from_millis(5));
        assert_eq!(config.retention, RetentionPolicy::KeepMounted);
        assert_eq!(config.frame_interval_ms, 5);
    }

    #[test]
    fn test_zero_frame_interval_is_clamped() {
        let config = EngineConfig::new().with_frame_interval(Duration::ZERO);
        assert_eq!(config.frame_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: EngineConfig = serde_json::from_str(r#"{"retention":"keep_mounted"}"#).unwrap();
        assert_eq!(config.retention, RetentionPolicy::KeepMounted);
        assert_eq!(config.frame_interval_ms, DEFAULT_FRAME_MS);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        std::env::set_var(RETENTION_ENV, "keep");
        std::env::set_var(FRAME_MS_ENV, "40");
        let config = EngineConfig::from_env();
        std::env::remove_var(RETENTION_ENV);
        std::env::remove_var(FRAME_MS_ENV);

        assert_eq!(config.retention, RetentionPolicy::KeepMounted);
        assert_eq!(config.frame_interval_ms, 40);
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_garbage() {
        std::env::set_var(RETENTION_ENV, "sometimes");
        std::env::set_var(FRAME_MS_ENV, "fast");
        let config = EngineConfig::from_env();
        std::env::remove_var(RETENTION_ENV);
        std::env::remove_var(FRAME_MS_ENV);

        assert_eq!(config, EngineConfig::default());
    }
}
