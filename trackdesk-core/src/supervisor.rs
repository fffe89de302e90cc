//! Backend process supervisor - spawns the backend and owns its handle
//!
//! At most one backend process is active per run. Piped output is streamed
//! line by line into the working directory's log files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::task::JoinHandle;

use crate::defaults::DATABASE_FILE_NAME;
use crate::environment::RuntimeEnvironment;
use crate::launcher::{BackendLauncher, LaunchCommand, OutputPolicy, Toolchain};
use crate::log_sink::{LogSink, Severity};
use crate::profile::{BackendKind, Selection};

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("Backend is already running (pid {0:?})")]
    AlreadyRunning(Option<u32>),

    #[error("Backend working directory not found: {0}")]
    MissingWorkingDirectory(PathBuf),

    #[error("Failed to spawn backend `{program}`: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything needed to start the backend for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub selection: Selection,
    pub environment: RuntimeEnvironment,
    pub working_dir: PathBuf,
    pub port: u16,
    pub tools: Toolchain,
}

impl LaunchRequest {
    pub fn launcher(&self) -> BackendLauncher {
        BackendLauncher::select(
            self.selection.backend,
            &self.working_dir,
            self.environment,
            &self.tools,
        )
    }

    pub fn database_path(&self) -> PathBuf {
        self.working_dir.join(DATABASE_FILE_NAME)
    }

    /// Resolve the exact command that [`BackendSupervisor::start`] would spawn.
    pub fn command(&self) -> LaunchCommand {
        self.launcher()
            .command(&self.working_dir, self.port, child_environment(self))
    }
}

/// Variables layered over the inherited environment so the child sees the
/// same selection the shell computed.
pub fn child_environment(request: &LaunchRequest) -> BTreeMap<String, String> {
    let env_tag = request.environment.as_str().to_string();
    BTreeMap::from([
        (
            "DATABASE_PATH".to_string(),
            request.database_path().to_string_lossy().to_string(),
        ),
        ("PORT".to_string(), request.port.to_string()),
        ("RUNTIME_ENVIRONMENT".to_string(), env_tag.clone()),
        ("NODE_ENV".to_string(), env_tag),
        (
            "BACKEND".to_string(),
            request.selection.backend.dir_name().to_string(),
        ),
        (
            "FRONTEND".to_string(),
            request.selection.frontend.dir_name().to_string(),
        ),
        (
            "APP_PROFILE".to_string(),
            request.selection.profile.clone().unwrap_or_default(),
        ),
    ])
}

/// The live backend process
pub struct BackendProcessHandle {
    child: Child,
    kind: BackendKind,
    working_dir: PathBuf,
    port: u16,
    pid: Option<u32>,
    /// Log pumps for piped stdout/stderr
    pumps: Vec<JoinHandle<()>>,
}

impl BackendProcessHandle {
    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Check if process is still running
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Wait for exit, then drain the output pumps so every piped line is logged.
    pub async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        let status = self.child.wait().await?;
        self.drain_pumps().await;
        Ok(status)
    }

    /// Kill the process. Pending output is discarded.
    pub async fn kill(&mut self) -> std::io::Result<()> {
        if self.is_alive() {
            self.child.kill().await?;
        }
        // Grandchildren may still hold the pipes open.
        for pump in self.pumps.drain(..) {
            pump.abort();
        }
        Ok(())
    }

    async fn drain_pumps(&mut self) {
        for pump in self.pumps.drain(..) {
            if let Err(e) = pump.await {
                tracing::debug!(error = %e, "Output pump ended abnormally");
            }
        }
    }
}

/// Starts the backend and holds its handle for the rest of the run
#[derive(Default)]
pub struct BackendSupervisor {
    handle: Option<BackendProcessHandle>,
}

impl BackendSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the backend without waiting for it to become ready.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        &mut self,
        request: &LaunchRequest,
    ) -> Result<&mut BackendProcessHandle, SupervisorError> {
        if let Some(existing) = self.handle.as_mut()
            && existing.is_alive()
        {
            return Err(SupervisorError::AlreadyRunning(existing.pid()));
        }

        let backend = request.selection.backend;
        let sink = LogSink::new(&request.working_dir);

        // Must precede every log write: appending creates the directory.
        if !request.working_dir.is_dir() {
            let err = SupervisorError::MissingWorkingDirectory(request.working_dir.clone());
            sink.error(&err.to_string());
            tracing::error!(backend = %backend, "{}", err);
            return Err(err);
        }

        sink.info(&format!("Starting backend service ({backend})..."));

        let env = child_environment(request);
        match serde_json::to_string_pretty(&env) {
            Ok(json) => sink.info(&format!("Starting server with environment: {json}")),
            Err(e) => tracing::debug!(error = %e, "Failed to serialize backend environment"),
        }

        let launcher = request.launcher();
        sink.info(&format!("Server path: {}", launcher.entry_path().display()));

        let command = launcher.command(&request.working_dir, request.port, env);
        sink.info(&format!("Starting backend: {}", command.display()));
        tracing::info!(
            backend = %backend,
            port = request.port,
            cwd = %request.working_dir.display(),
            "Spawning backend"
        );

        let mut child = match command.to_command().spawn() {
            Ok(child) => child,
            Err(source) => {
                let err = SupervisorError::Spawn {
                    program: command.program.clone(),
                    source,
                };
                sink.error(&err.to_string());
                tracing::error!(backend = %backend, "{}", err);
                return Err(err);
            }
        };

        let mut pumps = Vec::new();
        if command.output == OutputPolicy::PipeToLog {
            if let Some(stdout) = child.stdout.take() {
                pumps.push(tokio::spawn(pump_lines(stdout, sink.clone(), Severity::Info)));
            }
            if let Some(stderr) = child.stderr.take() {
                pumps.push(tokio::spawn(pump_lines(stderr, sink.clone(), Severity::Error)));
            }
        }

        let pid = child.id();
        tracing::info!(backend = %backend, pid = ?pid, "Backend process started");

        Ok(self.handle.insert(BackendProcessHandle {
            child,
            kind: backend,
            working_dir: request.working_dir.clone(),
            port: request.port,
            pid,
            pumps,
        }))
    }

    pub fn handle(&self) -> Option<&BackendProcessHandle> {
        self.handle.as_ref()
    }

    pub fn handle_mut(&mut self) -> Option<&mut BackendProcessHandle> {
        self.handle.as_mut()
    }

    pub fn is_running(&mut self) -> bool {
        self.handle.as_mut().is_some_and(|h| h.is_alive())
    }

    /// Kill the backend (if any) and release its handle.
    pub async fn shutdown(&mut self) -> std::io::Result<()> {
        if let Some(mut handle) = self.handle.take() {
            tracing::info!(backend = %handle.kind(), pid = ?handle.pid(), "Stopping backend");
            handle.kill().await?;
        }
        Ok(())
    }
}

async fn pump_lines<R>(reader: R, sink: LogSink, severity: Severity)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        sink.log(&line, severity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::FrontendKind;
    use tempfile::TempDir;

    fn request(working_dir: &Path, backend: BackendKind) -> LaunchRequest {
        LaunchRequest {
            selection: Selection {
                profile: Some("vue-express".to_string()),
                frontend: FrontendKind::Vue,
                backend,
            },
            environment: RuntimeEnvironment::Staging,
            working_dir: working_dir.to_path_buf(),
            port: 3000,
            tools: Toolchain {
                node_binary: Some(PathBuf::from("/definitely/missing/node")),
                ..Default::default()
            },
        }
    }

    #[test]
    fn child_environment_carries_selection() {
        let req = request(Path::new("/wd"), BackendKind::Express);
        let env = child_environment(&req);

        assert_eq!(
            env["DATABASE_PATH"],
            Path::new("/wd").join("database.sqlite3").to_string_lossy()
        );
        assert_eq!(env["PORT"], "3000");
        assert_eq!(env["RUNTIME_ENVIRONMENT"], "staging");
        assert_eq!(env["NODE_ENV"], "staging");
        assert_eq!(env["BACKEND"], "express-backend");
        assert_eq!(env["FRONTEND"], "vue-tracker");
        assert_eq!(env["APP_PROFILE"], "vue-express");
    }

    #[test]
    fn jvm_command_adds_server_port() {
        let req = request(Path::new("/wd"), BackendKind::Spring);
        let cmd = req.command();
        assert_eq!(cmd.env["SERVER_PORT"], "3000");
        assert_eq!(cmd.env["SPRING_PROFILES_ACTIVE"], "staging");
        assert_eq!(cmd.env["PORT"], "3000");
    }

    #[tokio::test]
    async fn missing_working_directory_is_fatal_and_logged() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let mut supervisor = BackendSupervisor::new();

        let err = supervisor
            .start(&request(&missing, BackendKind::Nest))
            .err()
            .expect("start should fail");
        assert!(matches!(err, SupervisorError::MissingWorkingDirectory(_)));
        assert!(supervisor.handle().is_none());

        let errors = std::fs::read_to_string(missing.join("error.log")).unwrap();
        assert!(errors.contains("working directory not found"));
        let info = std::fs::read_to_string(missing.join("info.log")).unwrap_or_default();
        assert!(!info.contains("Starting backend"));
    }

    #[tokio::test]
    async fn missing_jvm_working_directory_never_spawns_java() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("spring-backend");
        let mut req = request(&missing, BackendKind::Spring);
        req.tools.java_home = Some(dir.path().join("jdk"));

        let mut supervisor = BackendSupervisor::new();
        let err = supervisor.start(&req).err().expect("start should fail");

        assert!(
            matches!(&err, SupervisorError::MissingWorkingDirectory(path) if path == &missing),
            "{err}"
        );
        assert!(!supervisor.is_running());
    }

    #[tokio::test]
    async fn spawn_failure_is_logged_and_propagated() {
        let dir = TempDir::new().unwrap();
        let mut supervisor = BackendSupervisor::new();

        let err = supervisor
            .start(&request(dir.path(), BackendKind::Nest))
            .err()
            .expect("spawn should fail");
        assert!(matches!(err, SupervisorError::Spawn { .. }));
        assert!(!supervisor.is_running());

        let info = std::fs::read_to_string(dir.path().join("info.log")).unwrap();
        assert!(info.contains("Starting backend service (nest-backend)..."));
        assert!(info.contains("Server path: "));
        let errors = std::fs::read_to_string(dir.path().join("error.log")).unwrap();
        assert!(errors.contains("/definitely/missing/node"));
    }

    #[tokio::test]
    async fn shutdown_without_handle_is_noop() {
        let mut supervisor = BackendSupervisor::new();
        supervisor.shutdown().await.unwrap();
        assert!(supervisor.handle().is_none());
    }
}
