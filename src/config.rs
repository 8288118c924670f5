//! Configuration for flux-reconcile
//!
//! ```yaml
//! namespace: flux-system
//! poll-interval: 2s
//! timeout: 5m
//! ```

use crate::error::AppError;
use reconcile_framework::ReconcileOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Namespace used when neither the command line nor the manifest names one
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Sleep between status checks
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Budget for the whole request-and-wait operation
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

fn default_namespace() -> String {
    "flux-system".to_string()
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_timeout() -> Duration {
    Duration::from_secs(5 * 60)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            poll_interval: default_poll_interval(),
            timeout: default_timeout(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let Some(path) = path else {
            return Ok(Config::default());
        };
        let content = std::fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| AppError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies command-line overrides on top of the loaded values.
    pub fn with_overrides(
        mut self,
        namespace: Option<String>,
        poll_interval: Option<Duration>,
        timeout: Option<Duration>,
    ) -> Self {
        if let Some(namespace) = namespace {
            self.namespace = namespace;
        }
        if let Some(poll_interval) = poll_interval {
            self.poll_interval = poll_interval;
        }
        if let Some(timeout) = timeout {
            self.timeout = timeout;
        }
        self
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            poll_interval: self.poll_interval,
            timeout: self.timeout,
            ..ReconcileOptions::default()
        }
    }
}

/// Serde adapter for durations written as `500ms`, `2s`, `5m`.
pub(crate) mod humantime_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
