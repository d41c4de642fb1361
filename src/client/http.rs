//! HTTP client for the analysis service.
//!
//! Uses the synchronous `ureq` client. A submission blocks on exactly one
//! `POST {base_url}{endpoint}` call; the only timeout is the transport's own
//! (`backend.timeout_ms`), the controller adds none.
use std::io::Read;
use std::time::Duration;

use anyhow::{Context, Result};

use super::{AnalysisClient, AnalysisReply, Backend};
use crate::analysis::AnalysisRequest;
use crate::config::schema::BackendConfig;

/// Upper bound for proxied chart images.
const MAX_ASSET_BYTES: u64 = 16 * 1024 * 1024;

/// Timeout for the reachability probe used by `health`.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// A file fetched from the service (chart images).
#[derive(Debug, Clone)]
pub struct Asset {
    pub status: u16,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Synchronous client bound to one backend.
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    agent: ureq::Agent,
    base_url: String,
    endpoint: String,
}

impl HttpAnalysisClient {
    /// Build a client from the resolved backend config.
    pub fn from_config(config: &BackendConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build();
        Self {
            agent,
            base_url: normalize_base_url(&config.base_url),
            endpoint: normalize_endpoint(&config.endpoint),
        }
    }

    /// Send one analysis request and return the status and body as sent.
    pub fn post_topic(&self, request: &AnalysisRequest) -> Result<(u16, String)> {
        let url = self.analyze_url();
        let body = serde_json::to_string(request).context("failed to serialize analysis request")?;

        // Non-2xx replies still carry a JSON body worth reading.
        let response = match self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(&body)
        {
            Ok(resp) => resp,
            Err(ureq::Error::Status(_, resp)) => resp,
            Err(e) => return Err(e).with_context(|| format!("analysis request to {url} failed")),
        };

        let status = response.status();
        let text = response
            .into_string()
            .context("failed reading analysis response body")?;
        Ok((status, text))
    }

    /// Full URL of the analysis endpoint.
    pub fn analyze_url(&self) -> String {
        format!("{}{}", self.base_url, self.endpoint)
    }
}

impl AnalysisClient for HttpAnalysisClient {
    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReply> {
        let (status, text) = self.post_topic(request)?;
        AnalysisReply::from_http(status, &text)
    }
}

impl Backend for HttpAnalysisClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check whether anything answers HTTP at the base URL.
    ///
    /// Any status code counts; the service root may well be a 404 when the
    /// frontend is not deployed alongside it.
    fn is_reachable(&self) -> bool {
        let url = format!("{}/", self.base_url);
        match self.agent.get(&url).timeout(PROBE_TIMEOUT).call() {
            Ok(_) | Err(ureq::Error::Status(..)) => true,
            Err(_) => false,
        }
    }

    /// Fetch a file served by the backend, e.g. `/static/visuals/x.png`.
    fn fetch_asset(&self, path: &str) -> Result<Asset> {
        let url = format!("{}{}", self.base_url, path);
        let response = match self.agent.get(&url).call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(_, resp)) => resp,
            Err(e) => return Err(e).with_context(|| format!("failed to fetch {url}")),
        };

        let status = response.status();
        let content_type = response.content_type().to_string();
        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_ASSET_BYTES)
            .read_to_end(&mut bytes)
            .with_context(|| format!("failed reading body of {url}"))?;

        Ok(Asset {
            status,
            content_type,
            bytes,
        })
    }
}

/// Drop the trailing slash and pin `localhost` to IPv4.
///
/// On Windows, "localhost" may resolve to `::1` first and stall when the
/// service only binds IPv4.
fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').replace("://localhost", "://127.0.0.1")
}

fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.starts_with('/') {
        endpoint.to_string()
    } else {
        format!("/{endpoint}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
