//! Readiness probing - waits for the backend to answer its health check
//!
//! After an unconditional warm-up the prober polls each URL in order, once per
//! round, for a bounded number of rounds. Any 2xx from any URL is overall
//! readiness. Attempts are strictly sequential.

mod http;
mod machine;

pub use http::*;
pub use machine::*;

use std::time::Duration;
use thiserror::Error;

use crate::defaults::{
    DEFAULT_HEALTH_PATH, PROBE_INTERVAL, PROBE_MAX_ATTEMPTS, PROBE_WARMUP,
};
use crate::log_sink::LogSink;
use crate::window::{WindowManager, WindowSystem};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Wait before the first attempt
    pub warmup: Duration,
    /// Number of rounds over the URL list
    pub max_attempts: u32,
    /// Wait between rounds
    pub interval: Duration,
    /// Client-level timeout for each GET; `None` waits for the server
    pub request_timeout: Option<Duration>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            warmup: PROBE_WARMUP,
            max_attempts: PROBE_MAX_ATTEMPTS,
            interval: PROBE_INTERVAL,
            request_timeout: None,
        }
    }
}

/// Outcome of a successful probe run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub ready: bool,
    /// Round in which readiness was observed
    pub attempts: u32,
    pub last_status: Option<u16>,
    pub last_body: Option<String>,
}

#[derive(Debug, Error)]
pub enum ReadinessError {
    #[error("No health check URLs configured")]
    NoHealthUrls,

    #[error("Failed to connect to the server after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        last_status: Option<u16>,
    },

    #[error("Failed to build HTTP client for health checks: {0}")]
    Client(#[from] reqwest::Error),
}

/// `http://localhost:<port><path>` for each health path
pub fn health_urls(port: u16, paths: &[String]) -> Vec<String> {
    paths
        .iter()
        .map(|path| format!("http://localhost:{port}{path}"))
        .collect()
}

pub fn default_health_urls(port: u16) -> Vec<String> {
    health_urls(port, &[DEFAULT_HEALTH_PATH.to_string()])
}

pub struct ReadinessProber<C, D> {
    client: C,
    delay: D,
    config: ProbeConfig,
}

impl ReadinessProber<ReqwestHealthClient, TokioDelay> {
    pub fn http(config: ProbeConfig) -> Result<Self, ReadinessError> {
        let client = ReqwestHealthClient::new(config.request_timeout)?;
        Ok(Self::new(client, TokioDelay, config))
    }
}

impl<C: HealthClient, D: Delay> ReadinessProber<C, D> {
    pub fn new(client: C, delay: D, config: ProbeConfig) -> Self {
        Self {
            client,
            delay,
            config,
        }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Poll `urls` until one answers 2xx or the attempt budget runs out.
    ///
    /// On exhaustion the loading window (if a manager is supplied) is closed
    /// before the error is returned.
    pub async fn wait_until_ready<S: WindowSystem>(
        &self,
        urls: &[String],
        sink: &LogSink,
        windows: Option<&mut WindowManager<S>>,
    ) -> Result<ProbeResult, ReadinessError> {
        if urls.is_empty() {
            let err = ReadinessError::NoHealthUrls;
            sink.error(&err.to_string());
            return Err(err);
        }

        let mut machine = ProbeMachine::new(&self.config, urls.len());
        let mut last_status = None;
        let mut last_body = None;
        let mut action = machine.action();

        loop {
            action = match action {
                ProbeAction::Sleep(duration) => {
                    let warming_up = machine.phase() == ProbePhase::WarmingUp;
                    if !warming_up {
                        tracing::debug!(delay_ms = duration.as_millis() as u64, "Waiting before next attempt");
                    }
                    self.delay.sleep(duration).await;
                    if warming_up {
                        sink.info(&format!("Checking if ports are open: {}", urls.join(",")));
                    }
                    machine.on_delay_elapsed()
                }
                ProbeAction::Probe { attempt, url_index } => {
                    let url = &urls[url_index];
                    sink.info(&format!("Attempt {attempt}: Checking port: {url}"));

                    let ready = match self.client.get(url).await {
                        Ok(resp) => {
                            tracing::debug!(attempt, url = %url, status = resp.status, "Health check response");
                            last_status = Some(resp.status);
                            sink.info(&resp.body);
                            let ok = resp.is_success();
                            if ok {
                                sink.info(&format!("Server is ready: {}", resp.body));
                            } else {
                                sink.warning(&format!(
                                    "Server responded with status: {}",
                                    resp.status
                                ));
                            }
                            last_body = Some(resp.body);
                            ok
                        }
                        Err(e) => {
                            tracing::debug!(attempt, url = %url, error = %e, "Health check failed");
                            sink.error(&format!("Attempt {attempt}: {e}"));
                            false
                        }
                    };
                    machine.on_probe(ready)
                }
                ProbeAction::Ready { attempt } => {
                    tracing::info!(attempts = attempt, "Backend is ready");
                    return Ok(ProbeResult {
                        ready: true,
                        attempts: attempt,
                        last_status,
                        last_body,
                    });
                }
                ProbeAction::Exhausted { attempts } => {
                    if let Some(windows) = windows {
                        windows.close_loading_window();
                    }
                    let err = ReadinessError::Exhausted {
                        attempts,
                        last_status,
                    };
                    sink.error(&err.to_string());
                    tracing::error!(attempts, "{}", err);
                    return Err(err);
                }
            };
        }
    }
}
