use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use super::error::{ConfigError, Result};
use crate::defaults::{
    DEFAULT_HEALTH_PATH, PROBE_INTERVAL, PROBE_MAX_ATTEMPTS, PROBE_WARMUP,
};
use crate::readiness::ProbeConfig;

/// Optional shell settings file (`trackdesk.toml`)
///
/// Command-line flags and environment variables take precedence over every
/// value here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ShellConfig {
    /// Profile name, e.g. `vue-express`
    pub profile: Option<String>,

    /// Frontend override (`ng`, `vue`, `react`)
    pub frontend: Option<String>,

    /// Backend override (`nest`, `express`, `spring`)
    pub backend: Option<String>,

    /// Backend port
    pub port: Option<u16>,

    /// Runtime environment tag (`dev`, `staging`, `prod`)
    pub environment: Option<String>,

    /// Health check paths, probed in order
    #[serde(default = "default_health_paths")]
    pub health_paths: Vec<String>,

    #[serde(default)]
    pub probe: ProbeSettings,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            profile: None,
            frontend: None,
            backend: None,
            port: None,
            environment: None,
            health_paths: default_health_paths(),
            probe: ProbeSettings::default(),
        }
    }
}

/// `[probe]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeSettings {
    pub warmup_ms: u64,
    pub max_attempts: u32,
    pub interval_ms: u64,
    /// Unset leaves health GETs without a client timeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            warmup_ms: PROBE_WARMUP.as_millis() as u64,
            max_attempts: PROBE_MAX_ATTEMPTS,
            interval_ms: PROBE_INTERVAL.as_millis() as u64,
            request_timeout_ms: None,
        }
    }
}

impl ProbeSettings {
    pub fn to_probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            warmup: Duration::from_millis(self.warmup_ms),
            max_attempts: self.max_attempts,
            interval: Duration::from_millis(self.interval_ms),
            request_timeout: self.request_timeout_ms.map(Duration::from_millis),
        }
    }
}

fn default_health_paths() -> Vec<String> {
    vec![DEFAULT_HEALTH_PATH.to_string()]
}

impl ShellConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileRead(path.as_ref().to_path_buf(), e))?;
        Self::parse(&content)
    }

    /// Load `path` when given, otherwise the built-in defaults.
    pub fn load_optional<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: ShellConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.health_paths.is_empty() {
            return Err(ConfigError::Validation(
                "health_paths must list at least one path".to_string(),
            ));
        }
        if let Some(path) = self.health_paths.iter().find(|p| !p.starts_with('/')) {
            return Err(ConfigError::Validation(format!(
                "health path '{path}' must start with '/'"
            )));
        }
        if self.probe.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "probe.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn probe_config(&self) -> ProbeConfig {
        self.probe.to_probe_config()
    }
}
