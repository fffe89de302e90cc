//! Trackdesk Core - backend orchestration for the Trackdesk desktop shell
//!
//! This crate resolves which frontend/backend pair a run uses, locates their
//! artifacts on disk, starts and supervises the backend process, and probes it
//! for readiness before the shell promotes the UI.
//!
//! Window rendering lives behind the [`window::WindowSystem`] trait; the
//! `trackdesk` binary provides the concrete implementation.

pub mod config;
pub mod defaults;
pub mod environment;
pub mod launcher;
pub mod log_sink;
pub mod paths;
pub mod profile;
pub mod readiness;
pub mod supervisor;
pub mod window;

pub use config::{ConfigError, ProbeSettings, ShellConfig};
pub use environment::RuntimeEnvironment;
pub use launcher::{BackendLauncher, LaunchCommand, OutputPolicy};
pub use log_sink::{LogSink, Severity};
pub use paths::{FrontendEntry, Layout};
pub use profile::{BackendKind, FrontendKind, Overrides, Selection};
pub use readiness::{ProbeConfig, ProbeResult, ReadinessError};
pub use supervisor::{BackendProcessHandle, BackendSupervisor, LaunchRequest, SupervisorError};
pub use window::{Window, WindowError, WindowKind, WindowManager, WindowState, WindowSystem};
