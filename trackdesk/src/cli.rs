use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::settings::Settings;
use crate::startup::StartupError;
use crate::{plan, startup};

/// Trackdesk - desktop shell for the task tracker
#[derive(Parser, Debug)]
#[command(name = "trackdesk")]
#[command(version)]
#[command(about = "Trackdesk - desktop shell for the task tracker")]
pub struct Cli {
    /// Profile selecting the frontend/backend pair (e.g. ng-nest, vue-express, react-spring)
    #[arg(long, env = "APP_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Frontend override (ng, vue, react)
    #[arg(long, env = "FRONTEND", global = true)]
    pub frontend: Option<String>,

    /// Backend override (nest, express, spring)
    #[arg(long, env = "BACKEND", global = true)]
    pub backend: Option<String>,

    /// Backend port (default: 3000 in dev/staging, 5000 in prod)
    #[arg(long, env = "PORT", global = true)]
    pub port: Option<u16>,

    /// Runtime environment (dev, staging, prod)
    #[arg(long, env = "RUNTIME_ENVIRONMENT", global = true)]
    pub environment: Option<String>,

    /// Packaged resources directory
    #[arg(long, env = "TRACKDESK_RESOURCES", global = true)]
    pub resources: Option<PathBuf>,

    /// Settings file (TOML)
    #[arg(long, env = "TRACKDESK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Start the backend, wait for it, then open the UI (default)
    Run,

    /// Print the resolved launch plan as JSON without starting anything
    Plan,
}

impl Cli {
    pub fn run(self) -> Result<(), StartupError> {
        let settings = Settings::load(&self)?;

        match self.command.unwrap_or(Commands::Run) {
            Commands::Plan => plan::print(&settings),
            Commands::Run => {
                let rt = tokio::runtime::Runtime::new()?;
                rt.block_on(startup::run(settings))
            }
        }
    }
}

/// Parse `args` with every `env = ...` fallback removed, so tests do not
/// depend on variables such as `PORT` set in the calling environment.
#[cfg(test)]
pub(crate) fn parse_without_env<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    use clap::{CommandFactory, FromArgMatches};

    let matches = Cli::command()
        .mut_args(|arg| arg.env(None::<&'static str>))
        .try_get_matches_from(args)?;
    Cli::from_arg_matches(&matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_run() {
        let cli = parse_without_env(["trackdesk"]).unwrap();
        assert_eq!(cli.command.unwrap_or(Commands::Run), Commands::Run);
    }

    #[test]
    fn plan_accepts_global_flags_after_subcommand() {
        let cli = parse_without_env([
            "trackdesk",
            "plan",
            "--profile",
            "vue-spring",
            "--backend",
            "express",
            "--port",
            "8080",
            "--environment",
            "staging",
        ])
        .unwrap();

        assert_eq!(cli.command, Some(Commands::Plan));
        assert_eq!(cli.profile.as_deref(), Some("vue-spring"));
        assert_eq!(cli.backend.as_deref(), Some("express"));
        assert_eq!(cli.port, Some(8080));
        assert_eq!(cli.environment.as_deref(), Some("staging"));
    }

    #[test]
    fn rejects_invalid_port() {
        let res = parse_without_env(["trackdesk", "--port", "70000"]);
        assert!(res.is_err());
    }

    #[test]
    fn parsing_ignores_environment_fallbacks() {
        let cli = parse_without_env(["trackdesk"]).unwrap();
        assert_eq!(cli.port, None);
        assert_eq!(cli.profile, None);
        assert_eq!(cli.environment, None);
    }
}
