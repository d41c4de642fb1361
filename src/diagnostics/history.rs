use chrono::Utc;
use serde::{Deserialize, Serialize};

/// One line of `history.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub timestamp: String,
    pub topic: String,
    /// `"rendered"`, `"failed"`, or `"network_error"`.
    pub outcome: String,
    /// HTTP status for rejected submissions.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<u16>,
    /// Message shown to the user, or the transport error for network failures.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub perspectives: usize,
    pub latency_ms: u64,
}

impl SubmissionRecord {
    pub fn rendered(topic: &str, perspectives: usize, latency_ms: u64) -> Self {
        Self::new(topic, "rendered", None, None, perspectives, latency_ms)
    }

    pub fn failed(topic: &str, status: u16, message: &str, latency_ms: u64) -> Self {
        Self::new(
            topic,
            "failed",
            Some(status),
            Some(message.to_string()),
            0,
            latency_ms,
        )
    }

    pub fn network_error(topic: &str, error: &str, latency_ms: u64) -> Self {
        Self::new(
            topic,
            "network_error",
            None,
            Some(error.to_string()),
            0,
            latency_ms,
        )
    }

    fn new(
        topic: &str,
        outcome: &str,
        status: Option<u16>,
        detail: Option<String>,
        perspectives: usize,
        latency_ms: u64,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            topic: topic.to_string(),
            outcome: outcome.to_string(),
            status,
            detail,
            perspectives,
            latency_ms,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.outcome == "rendered"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_record_omits_empty_fields() {
        let json = serde_json::to_string(&SubmissionRecord::rendered("budget", 4, 1200)).unwrap();
        assert!(json.contains("\"outcome\":\"rendered\""));
        assert!(json.contains("\"perspectives\":4"));
        assert!(!json.contains("status"));
        assert!(!json.contains("detail"));
    }

    #[test]
    fn failed_record_round_trips() {
        let record = SubmissionRecord::failed("x", 404, "No articles found for the given topic.", 80);
        let parsed: SubmissionRecord =
            serde_json::from_str(&serde_json::to_string(&record).unwrap()).unwrap();
        assert_eq!(parsed, record);
        assert!(!parsed.succeeded());
    }
}
