//! Resolved settings for one run
//!
//! Merges command-line flags (which already carry their environment
//! variables), the optional settings file and the built-in defaults.

use std::path::{Path, PathBuf};

use trackdesk_core::launcher::Toolchain;
use trackdesk_core::{
    FrontendEntry, LaunchRequest, Layout, Overrides, ProbeConfig, RuntimeEnvironment, Selection,
    ShellConfig, paths, profile, readiness,
};

use crate::cli::Cli;
use crate::startup::StartupError;
use crate::resources::default_resources_root;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub profile: Option<String>,
    pub overrides: Overrides,
    pub environment: RuntimeEnvironment,
    pub port: u16,
    pub layout: Layout,
    pub health_paths: Vec<String>,
    pub probe: ProbeConfig,
}

impl Settings {
    pub fn load(cli: &Cli) -> Result<Self, StartupError> {
        let file = ShellConfig::load_optional(cli.config.as_deref())?;
        if let Some(path) = &cli.config {
            tracing::debug!(config = %path.display(), "Loaded settings file");
        }

        let cwd = std::env::current_dir()?;
        let node_env = std::env::var("NODE_ENV").ok();
        let settings = Self::merge(cli, file, node_env.as_deref(), &cwd);

        if let Some(name) = settings.profile.as_deref()
            && !profile::KNOWN_PROFILES.contains(&name)
        {
            tracing::debug!(
                profile = name,
                known = ?profile::KNOWN_PROFILES,
                "Unknown profile, inferring frontend and backend from its name"
            );
        }
        Ok(settings)
    }

    /// Precedence: flag/env > settings file > defaults.
    pub fn merge(cli: &Cli, file: ShellConfig, node_env: Option<&str>, cwd: &Path) -> Self {
        let probe = file.probe_config();
        let ShellConfig {
            profile,
            frontend,
            backend,
            port,
            environment,
            health_paths,
            ..
        } = file;

        let tag = pick(cli.environment.clone(), environment).or_else(|| non_blank(node_env));
        let environment = RuntimeEnvironment::resolve(tag.as_deref());
        let port = environment.resolve_port(cli.port.or(port));

        let resources_root =
            default_resources_root(cli.resources.as_deref(), environment.is_packaged(), cwd);

        Self {
            profile: pick(cli.profile.clone(), profile),
            overrides: Overrides {
                frontend: pick(cli.frontend.clone(), frontend),
                backend: pick(cli.backend.clone(), backend),
            },
            environment,
            port,
            layout: Layout::new(resources_root, cwd),
            health_paths,
            probe,
        }
    }

    pub fn selection(&self) -> Selection {
        profile::resolve(&self.overrides, self.profile.as_deref())
    }

    pub fn working_dir(&self) -> PathBuf {
        paths::backend_working_directory(
            self.environment,
            &self.layout,
            &self.overrides,
            self.profile.as_deref(),
        )
    }

    pub fn frontend_entry(&self) -> FrontendEntry {
        paths::frontend_entry(&self.layout, &self.overrides, self.profile.as_deref())
    }

    pub fn health_urls(&self) -> Vec<String> {
        readiness::health_urls(self.port, &self.health_paths)
    }

    pub fn launch_request(&self, tools: Toolchain) -> LaunchRequest {
        LaunchRequest {
            selection: self.selection(),
            environment: self.environment,
            working_dir: self.working_dir(),
            port: self.port,
            tools,
        }
    }
}

fn pick(flag: Option<String>, file: Option<String>) -> Option<String> {
    flag.filter(|v| !v.trim().is_empty())
        .or_else(|| file.filter(|v| !v.trim().is_empty()))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}
