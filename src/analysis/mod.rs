//! Wire model for the `/analyze` endpoint.
//!
//! Everything here lives for exactly one request/render cycle: a request is
//! built from the topic field, sent once, and the response is consumed by the
//! renderer. Nothing is cached or persisted.
//!
//! The backend omits sections it could not compute, so every response field
//! is optional and unknown keys are ignored. An explicit `null` reads the
//! same as a missing key.

use serde::{Deserialize, Deserializer, Serialize};

mod scores;

pub use scores::{EvaluationScores, MetricScore};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Body of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    topic: String,
}

impl AnalysisRequest {
    /// Build a request from raw field input.
    ///
    /// Returns `None` when the input is empty after trimming, which callers
    /// treat as a silent no-op rather than an error.
    pub fn new(raw: &str) -> Option<Self> {
        let topic = raw.trim();
        if topic.is_empty() {
            return None;
        }
        Some(Self {
            topic: topic.to_string(),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Successful (or at least 2xx) reply from the analysis service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResponse {
    /// Viewpoint clusters, in display order.
    #[serde(deserialize_with = "null_as_default")]
    pub perspectives: Vec<Perspective>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executive_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_evaluation: Option<EvaluationScores>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualizations: Option<Visualizations>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_bias_report: Option<String>,
    /// Only set by the backend on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResponse {
    /// The bias report, treating an empty string the same as a missing one.
    pub fn bias_report(&self) -> Option<&str> {
        non_empty(self.detailed_bias_report.as_deref())
    }
}

/// One labelled viewpoint summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Perspective {
    #[serde(deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(deserialize_with = "null_as_default")]
    pub summary: String,
}

/// Chart image locations produced by the backend.
///
/// The service emits paths relative to its own root
/// (`/static/visuals/<file>.png`); absolute URLs are passed through as well.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Visualizations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical_bias_chart_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_bias_chart_url: Option<String>,
}

impl Visualizations {
    pub fn historical_chart(&self) -> Option<&str> {
        non_empty(self.historical_bias_chart_url.as_deref())
    }

    pub fn source_chart(&self) -> Option<&str> {
        non_empty(self.source_bias_chart_url.as_deref())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Treat `Some("")` like `None`; the backend uses both for "not available".
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_trims_topic() {
        let req = AnalysisRequest::new("  monsoon session  ").unwrap();
        assert_eq!(req.topic(), "monsoon session");
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"topic":"monsoon session"}"#
        );
    }

    #[test]
    fn request_rejects_blank_input() {
        assert!(AnalysisRequest::new("").is_none());
        assert!(AnalysisRequest::new("   \t\n ").is_none());
    }

    #[test]
    fn response_deserializes_full_payload() {
        let json = r#"{
            "perspectives": [
                {"label": "Economic Perspective", "summary": "Costs rose."},
                {"label": "Policy Perspective", "summary": "New rules."}
            ],
            "executive_summary": "**Key events** happened.",
            "detailed_bias_report": "Overall tone: neutral",
            "summary_evaluation": {"Relevance to Query": "0.71"},
            "visualizations": {
                "historical_bias_chart_url": "/static/visuals/historical_bias_1.png",
                "source_bias_chart_url": "/static/visuals/source_bias_1.png"
            }
        }"#;
        let resp: AnalysisResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.perspectives.len(), 2);
        assert_eq!(resp.perspectives[1].label, "Policy Perspective");
        assert_eq!(resp.bias_report(), Some("Overall tone: neutral"));
        let vis = resp.visualizations.unwrap();
        assert_eq!(
            vis.historical_chart(),
            Some("/static/visuals/historical_bias_1.png")
        );
        assert!(resp.error.is_none());
    }

    #[test]
    fn response_tolerates_missing_and_unknown_fields() {
        let resp: AnalysisResponse =
            serde_json::from_str(r#"{"unexpected": 1, "perspectives": [{"label": "Only label"}]}"#)
                .unwrap();
        assert_eq!(resp.perspectives[0].summary, "");
        assert!(resp.executive_summary.is_none());
        assert!(resp.summary_evaluation.is_none());
        assert!(resp.visualizations.is_none());
    }

    #[test]
    fn null_fields_read_as_missing() {
        let resp: AnalysisResponse = serde_json::from_str(
            r#"{"perspectives": null, "executive_summary": "ok", "visualizations": null}"#,
        )
        .unwrap();
        assert!(resp.perspectives.is_empty());
        assert_eq!(resp.executive_summary.as_deref(), Some("ok"));

        let resp: AnalysisResponse =
            serde_json::from_str(r#"{"perspectives": [{"label": null, "summary": null}]}"#)
                .unwrap();
        assert_eq!(resp.perspectives[0], Perspective::default());
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let resp: AnalysisResponse = serde_json::from_str(
            r#"{"detailed_bias_report": "", "visualizations": {"source_bias_chart_url": ""}}"#,
        )
        .unwrap();
        assert!(resp.bias_report().is_none());
        assert!(resp.visualizations.unwrap().source_chart().is_none());
    }
}
