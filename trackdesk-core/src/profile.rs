//! Profile resolution - maps a profile name to a frontend/backend pair
//!
//! Resolution is total: unknown or malformed input falls back to the default
//! pair (Angular + Nest) so the shell can always start.

use serde::Serialize;
use std::fmt;

/// Profiles that ship as packaged builds.
pub const KNOWN_PROFILES: [&str; 9] = [
    "ng-nest",
    "ng-express",
    "ng-spring",
    "vue-nest",
    "vue-express",
    "vue-spring",
    "react-nest",
    "react-express",
    "react-spring",
];

/// Which prebuilt frontend bundle to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontendKind {
    Angular,
    Vue,
    React,
}

impl FrontendKind {
    pub const ALL: [FrontendKind; 3] = [Self::Angular, Self::Vue, Self::React];

    /// Directory name of the bundle under the resources root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Angular => "ng-tracker",
            Self::Vue => "vue-tracker",
            Self::React => "react-tracker",
        }
    }

    /// Angular output nests the entry one level deeper (`browser/index.html`).
    pub fn nests_browser_dir(self) -> bool {
        matches!(self, Self::Angular)
    }

    /// Normalize an explicit override value.
    pub fn from_override(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "vue" | "vue-tracker" => Self::Vue,
            "react" | "react-tracker" => Self::React,
            _ => Self::Angular,
        }
    }

    /// Infer the frontend from a profile string.
    pub fn infer(profile: &str) -> Self {
        let normalized = profile.trim().to_lowercase();
        if normalized.contains("vue") {
            Self::Vue
        } else if normalized.contains("react") {
            Self::React
        } else {
            Self::Angular
        }
    }
}

impl fmt::Display for FrontendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Which backend implementation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Nest server on the node runtime
    Nest,
    /// Express server on the node runtime
    Express,
    /// Spring Boot server on the JVM
    Spring,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [Self::Nest, Self::Express, Self::Spring];

    /// Directory name of the backend under the resources root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Nest => "nest-backend",
            Self::Express => "express-backend",
            Self::Spring => "spring-backend",
        }
    }

    pub fn runs_on_jvm(self) -> bool {
        matches!(self, Self::Spring)
    }

    /// Normalize an explicit override value.
    pub fn from_override(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "express" | "express-backend" => Self::Express,
            "spring" | "spring-boot" | "spring-backend" => Self::Spring,
            _ => Self::Nest,
        }
    }

    /// Infer the backend from a profile string.
    pub fn infer(profile: &str) -> Self {
        let normalized = profile.trim().to_lowercase();
        if normalized.contains("express") {
            Self::Express
        } else if normalized.contains("spring") {
            Self::Spring
        } else {
            Self::Nest
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Values that name the frontend or backend directly, bypassing the profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub frontend: Option<String>,
    pub backend: Option<String>,
}

impl Overrides {
    pub fn frontend(&self) -> Option<FrontendKind> {
        non_blank(self.frontend.as_deref()).map(FrontendKind::from_override)
    }

    pub fn backend(&self) -> Option<BackendKind> {
        non_blank(self.backend.as_deref()).map(BackendKind::from_override)
    }
}

/// One resolved frontend/backend pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub profile: Option<String>,
    pub frontend: FrontendKind,
    pub backend: BackendKind,
}

pub fn resolve_frontend(override_value: Option<&str>, profile: Option<&str>) -> FrontendKind {
    if let Some(value) = non_blank(override_value) {
        return FrontendKind::from_override(value);
    }
    FrontendKind::infer(profile.unwrap_or_default())
}

pub fn resolve_backend(override_value: Option<&str>, profile: Option<&str>) -> BackendKind {
    if let Some(value) = non_blank(override_value) {
        return BackendKind::from_override(value);
    }
    BackendKind::infer(profile.unwrap_or_default())
}

pub fn resolve(overrides: &Overrides, profile: Option<&str>) -> Selection {
    Selection {
        profile: non_blank(profile).map(str::to_string),
        frontend: resolve_frontend(overrides.frontend.as_deref(), profile),
        backend: resolve_backend(overrides.backend.as_deref(), profile),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
