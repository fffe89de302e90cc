use async_trait::async_trait;
use std::time::Duration;

/// Status and body of one health check response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: u16,
    pub body: String,
}

impl HealthResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a single GET against a health check URL
#[async_trait]
pub trait HealthClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<HealthResponse, String>;
}

/// Suspends the prober between steps
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct ReqwestHealthClient {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestHealthClient {
    /// Without `request_timeout` a GET waits as long as the server takes.
    pub fn new(request_timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().no_proxy();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            timeout: request_timeout,
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl HealthClient for ReqwestHealthClient {
    async fn get(&self, url: &str) -> Result<HealthResponse, String> {
        let resp = self.client.get(url).send().await.map_err(|e| e.to_string())?;
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Ok(HealthResponse { status, body })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
