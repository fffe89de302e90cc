use serde::Serialize;
use std::path::PathBuf;

use trackdesk_core::launcher::Toolchain;
use trackdesk_core::{
    BackendLauncher, FrontendEntry, LaunchCommand, RuntimeEnvironment, Selection,
};

use crate::settings::Settings;
use crate::startup::StartupError;

/// What a run would do, resolved without touching any process.
#[derive(Debug, Serialize)]
pub struct LaunchPlan {
    pub selection: Selection,
    pub environment: RuntimeEnvironment,
    pub port: u16,
    pub working_dir: PathBuf,
    pub frontend_entry: FrontendEntry,
    pub launcher: BackendLauncher,
    pub command: LaunchCommand,
    pub health_urls: Vec<String>,
}

pub fn build(settings: &Settings, tools: Toolchain) -> LaunchPlan {
    let request = settings.launch_request(tools);
    LaunchPlan {
        selection: request.selection.clone(),
        environment: request.environment,
        port: request.port,
        working_dir: request.working_dir.clone(),
        frontend_entry: settings.frontend_entry(),
        launcher: request.launcher(),
        command: request.command(),
        health_urls: settings.health_urls(),
    }
}

pub fn print(settings: &Settings) -> Result<(), StartupError> {
    let plan = build(settings, Toolchain::from_env());
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::parse_without_env;
    use std::path::Path;
    use trackdesk_core::ShellConfig;

    #[test]
    fn plan_for_spring_carries_jvm_command() {
        let cli = parse_without_env([
            "trackdesk",
            "plan",
            "--profile",
            "ng-spring",
            "--environment",
            "dev",
            "--port",
            "3100",
        ])
        .unwrap();
        let settings = Settings::merge(&cli, ShellConfig::default(), None, Path::new("/project"));
        let tools = Toolchain {
            java_home: Some(PathBuf::from("/jdk")),
            ..Default::default()
        };

        let plan = build(&settings, tools);

        let wd = PathBuf::from("/project/dist/spring-backend");
        assert_eq!(plan.working_dir, wd);
        assert_eq!(plan.command.program, PathBuf::from("/jdk/bin/java"));
        assert_eq!(plan.command.cwd, wd);
        assert_eq!(plan.command.env["SERVER_PORT"], "3100");
        assert_eq!(plan.command.env["APP_PROFILE"], "ng-spring");
        assert_eq!(plan.command.env["FRONTEND"], "ng-tracker");
        assert_eq!(plan.health_urls, vec!["http://localhost:3100/health"]);

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["port"], 3100);
        assert!(json["command"]["args"].is_array());
    }
}
