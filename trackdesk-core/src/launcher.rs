//! Backend launch strategies
//!
//! A [`BackendLauncher`] is selected once per run from the backend kind and
//! the contents of its working directory, then turned into a concrete
//! [`LaunchCommand`] that the supervisor spawns.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use crate::defaults::{JVM_ARCHIVE_FILE, NATIVE_ENTRY_FILE, RUNTIME_ENTRY_FILE};
use crate::environment::RuntimeEnvironment;
use crate::profile::BackendKind;

/// External tools and overrides the launchers depend on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toolchain {
    /// `JAVA_HOME`
    pub java_home: Option<PathBuf>,
    /// `NODE_BINARY`; `node` from `PATH` when unset
    pub node_binary: Option<PathBuf>,
    /// `SPRING_PROFILES_ACTIVE`
    pub jvm_profile: Option<String>,
}

impl Toolchain {
    pub fn from_env() -> Self {
        Self {
            java_home: env_path("JAVA_HOME"),
            node_binary: env_path("NODE_BINARY"),
            jvm_profile: std::env::var("SPRING_PROFILES_ACTIVE")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// How the child's stdout/stderr are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputPolicy {
    /// Child writes to the shell's own stdout/stderr
    Inherit,
    /// Lines are piped into the log sink (stdout as info, stderr as error)
    PipeToLog,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum BackendLauncher {
    /// `node <working_dir>/main.js`
    RuntimeFork { runtime: PathBuf, entry: PathBuf },
    /// A self-contained executable in the working directory
    NativeProcess { binary: PathBuf },
    /// `java -jar <working_dir>/app.jar`
    JvmProcess {
        java: PathBuf,
        archive: PathBuf,
        active_profile: String,
    },
}

impl BackendLauncher {
    pub fn select(
        kind: BackendKind,
        working_dir: &Path,
        environment: RuntimeEnvironment,
        tools: &Toolchain,
    ) -> Self {
        if kind.runs_on_jvm() {
            return Self::JvmProcess {
                java: java_command(tools.java_home.as_deref()),
                archive: working_dir.join(JVM_ARCHIVE_FILE),
                active_profile: tools
                    .jvm_profile
                    .clone()
                    .unwrap_or_else(|| environment.as_str().to_string()),
            };
        }

        let entry = working_dir.join(RUNTIME_ENTRY_FILE);
        let native = working_dir.join(NATIVE_ENTRY_FILE);
        if !entry.exists() && native.is_file() {
            return Self::NativeProcess { binary: native };
        }

        Self::RuntimeFork {
            runtime: tools
                .node_binary
                .clone()
                .unwrap_or_else(|| PathBuf::from("node")),
            entry,
        }
    }

    /// The artifact this launcher runs.
    pub fn entry_path(&self) -> &Path {
        match self {
            Self::RuntimeFork { entry, .. } => entry,
            Self::NativeProcess { binary } => binary,
            Self::JvmProcess { archive, .. } => archive,
        }
    }

    pub fn output_policy(&self) -> OutputPolicy {
        match self {
            Self::RuntimeFork { .. } => OutputPolicy::Inherit,
            Self::NativeProcess { .. } | Self::JvmProcess { .. } => OutputPolicy::PipeToLog,
        }
    }

    pub fn command(
        &self,
        working_dir: &Path,
        port: u16,
        mut env: BTreeMap<String, String>,
    ) -> LaunchCommand {
        let (program, args) = match self {
            Self::RuntimeFork { runtime, entry } => {
                (runtime.clone(), vec![entry.to_string_lossy().to_string()])
            }
            Self::NativeProcess { binary } => (binary.clone(), Vec::new()),
            Self::JvmProcess {
                java,
                archive,
                active_profile,
            } => {
                env.insert("SERVER_PORT".to_string(), port.to_string());
                env.insert("SPRING_PROFILES_ACTIVE".to_string(), active_profile.clone());
                (
                    java.clone(),
                    vec![
                        "-jar".to_string(),
                        archive.to_string_lossy().to_string(),
                        format!("--server.port={port}"),
                        format!("--spring.profiles.active={active_profile}"),
                    ],
                )
            }
        };

        LaunchCommand {
            program,
            args,
            cwd: working_dir.to_path_buf(),
            env,
            output: self.output_policy(),
        }
    }
}

/// `$JAVA_HOME/bin/java` when set, otherwise `java` from `PATH`.
pub fn java_command(java_home: Option<&Path>) -> PathBuf {
    let exe = if cfg!(windows) { "java.exe" } else { "java" };
    match java_home {
        Some(home) => home.join("bin").join(exe),
        None => PathBuf::from(exe),
    }
}

/// Fully resolved process invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Variables layered on top of the inherited environment
    pub env: BTreeMap<String, String>,
    pub output: OutputPolicy,
}

impl LaunchCommand {
    pub fn display(&self) -> String {
        std::iter::once(self.program.to_string_lossy().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn to_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(&self.cwd)
            .envs(&self.env)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        match self.output {
            OutputPolicy::Inherit => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
            OutputPolicy::PipeToLog => {
                cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
        }
        cmd
    }
}
