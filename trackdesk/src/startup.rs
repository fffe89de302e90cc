//! Startup flow: resolve, spawn, probe, then promote the UI.

use std::process::ExitStatus;
use thiserror::Error;

use trackdesk_core::launcher::Toolchain;
use trackdesk_core::readiness::{Delay, HealthClient, ReadinessProber};
use trackdesk_core::{
    BackendSupervisor, ConfigError, LaunchRequest, LogSink, ReadinessError, SupervisorError,
    WindowError, WindowManager, WindowSystem,
};

use crate::settings::Settings;
use crate::windows::TerminalWindows;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    #[error(transparent)]
    Readiness(#[from] ReadinessError),

    #[error(transparent)]
    Window(#[from] WindowError),

    #[error("Backend exited unexpectedly ({0})")]
    BackendExited(ExitStatus),

    #[error("Failed to encode launch plan: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub async fn run(settings: Settings) -> Result<(), StartupError> {
    let request = settings.launch_request(Toolchain::from_env());
    let sink = LogSink::new(&request.working_dir);

    tracing::info!(
        profile = ?request.selection.profile,
        frontend = %request.selection.frontend,
        backend = %request.selection.backend,
        environment = %request.environment,
        port = request.port,
        "Starting trackdesk"
    );

    let prober = ReadinessProber::http(settings.probe.clone())?;
    let mut windows = WindowManager::new(TerminalWindows::new(sink.clone()), sink.clone());
    let mut supervisor = BackendSupervisor::new();

    launch(&settings, &request, &sink, &prober, &mut windows, &mut supervisor).await?;

    let outcome = wait_for_exit(&mut supervisor).await;
    windows.close_main_window();
    supervisor.shutdown().await?;
    outcome
}

/// Bring the backend and UI up. On failure the loading window is closed and
/// the backend stopped before the error is returned.
async fn launch<S, C, D>(
    settings: &Settings,
    request: &LaunchRequest,
    sink: &LogSink,
    prober: &ReadinessProber<C, D>,
    windows: &mut WindowManager<S>,
    supervisor: &mut BackendSupervisor,
) -> Result<(), StartupError>
where
    S: WindowSystem,
    C: HealthClient,
    D: Delay,
{
    let Err(e) = bring_up(settings, request, sink, prober, windows, supervisor).await else {
        return Ok(());
    };

    windows.close_loading_window();
    if let Err(stop) = supervisor.shutdown().await {
        tracing::warn!(error = %stop, "Failed to stop backend");
    }
    Err(e)
}

async fn bring_up<S, C, D>(
    settings: &Settings,
    request: &LaunchRequest,
    sink: &LogSink,
    prober: &ReadinessProber<C, D>,
    windows: &mut WindowManager<S>,
    supervisor: &mut BackendSupervisor,
) -> Result<(), StartupError>
where
    S: WindowSystem,
    C: HealthClient,
    D: Delay,
{
    windows.create_loading_window();

    supervisor.start(request)?;

    let probe = prober
        .wait_until_ready(&settings.health_urls(), sink, Some(&mut *windows))
        .await?;
    tracing::debug!(status = ?probe.last_status, "Opening main window");

    windows.create_window(&settings.frontend_entry())?;
    windows.close_loading_window();
    Ok(())
}

/// Block until Ctrl+C or until the backend exits on its own.
async fn wait_for_exit(supervisor: &mut BackendSupervisor) -> Result<(), StartupError> {
    let Some(handle) = supervisor.handle_mut() else {
        return Ok(());
    };

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("Interrupted, shutting down");
            Ok(())
        }
        status = handle.wait() => {
            let status = status?;
            if status.success() {
                tracing::info!("Backend exited");
                Ok(())
            } else {
                Err(StartupError::BackendExited(status))
            }
        }
    }
}
