//! Transport seam between the form controller and the analysis service.
//!
//! The controller only sees [`AnalysisClient`]: one call per submission that
//! either yields a classified [`AnalysisReply`] or fails at the transport
//! level. [`http::HttpAnalysisClient`] is the production implementation;
//! tests substitute scripted clients.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::analysis::{AnalysisRequest, AnalysisResponse, non_empty};

pub mod http;

pub use http::{Asset, HttpAnalysisClient};

/// A reply the service actually sent.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisReply {
    /// 2xx with an analysis body.
    Success(AnalysisResponse),
    /// Any other status. `error` is the body's `error` string, if it had one.
    Failure { status: u16, error: Option<String> },
}

impl AnalysisReply {
    /// Classify a raw HTTP reply.
    ///
    /// A body that is not JSON (or does not fit the response shape on
    /// success) is an `Err`: the caller cannot tell it apart from a broken
    /// connection and reports it the same way.
    pub fn from_http(status: u16, body: &str) -> Result<Self> {
        if (200..300).contains(&status) {
            let data: AnalysisResponse = serde_json::from_str(body)
                .with_context(|| format!("analysis response (HTTP {status}) is not valid JSON"))?;
            return Ok(Self::Success(data));
        }

        let value: Value = serde_json::from_str(body)
            .with_context(|| format!("error response (HTTP {status}) is not valid JSON"))?;
        let error = non_empty(value.get("error").and_then(Value::as_str)).map(str::to_string);
        Ok(Self::Failure { status, error })
    }
}

/// Issues one analysis call per submission.
pub trait AnalysisClient {
    /// Send the request and wait for the reply.
    ///
    /// `Err` means no usable reply arrived (connection refused, timeout,
    /// unreadable body).
    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReply>;
}

impl<T: AnalysisClient + ?Sized> AnalysisClient for &T {
    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReply> {
        (**self).analyze(request)
    }
}

impl<T: AnalysisClient + ?Sized> AnalysisClient for Box<T> {
    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReply> {
        (**self).analyze(request)
    }
}

/// The rest of what the web front end needs from the service: a health probe
/// and the chart images it renders.
pub trait Backend: AnalysisClient {
    fn base_url(&self) -> &str;

    fn is_reachable(&self) -> bool;

    /// Fetch a path relative to the base URL. Non-2xx statuses come back as
    /// an [`Asset`] carrying that status.
    fn fetch_asset(&self, path: &str) -> Result<Asset>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
