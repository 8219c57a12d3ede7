// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;

/// When the bridge tells the host which event keys have listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationPolicy {
    /// Register on the first listener for a key, deregister when the last one leaves.
    #[default]
    Transitions,
    /// Forward every subscribe and unsubscribe to the host.
    Always,
}

/// Runtime settings for a bridge instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Timeout applied by `Bridge::call`. `None` waits forever.
    pub call_timeout_ms: Option<u64>,
    /// Listener registration forwarding policy.
    pub registration: RegistrationPolicy,
    /// Log full argument payloads at TRACE level.
    pub log_payloads: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: None,
            registration: RegistrationPolicy::Transitions,
            log_payloads: false,
        }
    }
}

impl BridgeConfig {
    /// Load settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no bridge config file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        info!(path = %path.display(), ?config, "bridge config loaded");
        Ok(config)
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = BridgeConfig::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.call_timeout(), None);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"call_timeout_ms": 2500, "registration": "always"}}"#).unwrap();

        let config = BridgeConfig::load(file.path()).unwrap();
        assert_eq!(config.call_timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(config.registration, RegistrationPolicy::Always);
        assert!(!config.log_payloads);
    }

    #[test]
    fn malformed_file_is_a_serialization_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = BridgeConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, crate::HostlinkError::Serialization(_)));
    }
}
