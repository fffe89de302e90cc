use serde::Serialize;
use std::fmt;

use crate::defaults::{DEV_PORT, PROD_PORT};

/// Runtime environment (fixed for the lifetime of the shell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    Dev,
    Staging,
    Prod,
}

impl RuntimeEnvironment {
    /// Parse an environment tag. Unrecognised tags resolve to `Prod`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "staging" => Self::Staging,
            _ => Self::Prod,
        }
    }

    /// Resolve from an optional tag, defaulting by build profile when absent.
    pub fn resolve(tag: Option<&str>) -> Self {
        match tag.filter(|t| !t.trim().is_empty()) {
            Some(tag) => Self::from_tag(tag),
            None if cfg!(debug_assertions) => Self::Dev,
            None => Self::Prod,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
        }
    }

    /// Whether artifacts come from the packaged resources root rather than the
    /// project checkout.
    pub fn is_packaged(self) -> bool {
        matches!(self, Self::Prod)
    }

    pub fn default_port(self) -> u16 {
        match self {
            Self::Dev | Self::Staging => DEV_PORT,
            Self::Prod => PROD_PORT,
        }
    }

    /// Explicit port override wins; otherwise the environment default.
    pub fn resolve_port(self, explicit: Option<u16>) -> u16 {
        explicit.unwrap_or_else(|| self.default_port())
    }
}

impl fmt::Display for RuntimeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
