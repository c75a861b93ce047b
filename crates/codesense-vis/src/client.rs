//! HTTP client for the external trace generator.

use std::future::Future;
use std::time::Duration;

use codesense_trace::{BugReport, ErrorBody, Explanation, Step, TraceRequest, VisualizeResponse};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ClientError;

/// Request timeout for generator calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Produces traces and explanations for source code.
///
/// The session talks to the generator through this trait so tests can
/// substitute an in-process source.
pub trait TraceSource: Send + Sync + 'static {
    fn visualize(
        &self,
        request: &TraceRequest,
    ) -> impl Future<Output = Result<Vec<Step>, ClientError>> + Send;

    fn explain(
        &self,
        request: &TraceRequest,
    ) -> impl Future<Output = Result<Explanation, ClientError>> + Send;

    fn detect_bugs(
        &self,
        request: &TraceRequest,
    ) -> impl Future<Output = Result<BugReport, ClientError>> + Send;
}

/// reqwest-backed [`TraceSource`].
#[derive(Debug, Clone)]
pub struct GeneratorClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeneratorClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: &TraceRequest,
    ) -> Result<T, ClientError> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(%url, language = %request.language, "generator request");

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message())
                .unwrap_or_else(|| format!("server error {}", status.as_u16()));
            warn!(status = status.as_u16(), %message, "generator rejected request");
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

impl TraceSource for GeneratorClient {
    async fn visualize(&self, request: &TraceRequest) -> Result<Vec<Step>, ClientError> {
        let response: VisualizeResponse = self.post("visualize", request).await?;
        Ok(response.into_steps()?)
    }

    async fn explain(&self, request: &TraceRequest) -> Result<Explanation, ClientError> {
        self.post("explain", request).await
    }

    async fn detect_bugs(&self, request: &TraceRequest) -> Result<BugReport, ClientError> {
        self.post("detect-bugs", request).await
    }
}
