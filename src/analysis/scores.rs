//! Summary-quality scores keyed by metric name.
//!
//! The backend returns a JSON object such as
//! `{"Faithfulness (BERTScore F1)": "0.84", "Relevance to Query": "0.71"}` and
//! the page lists the entries in the order the object was written. `serde_json`
//! maps sort their keys unless `preserve_order` is enabled, so the object is
//! read with a dedicated visitor into an ordered list instead.

use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// A single score value: usually a preformatted string, sometimes a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricScore {
    Number(serde_json::Number),
    Text(String),
    /// Anything else the service might emit (`null`, booleans, nested data).
    Other(serde_json::Value),
}

impl fmt::Display for MetricScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.write_str(&format_number(n)),
            Self::Text(s) => f.write_str(s),
            Self::Other(v) => f.write_str(&js_string(v)),
        }
    }
}

/// Integral floats print without a fractional part (`4.0` → `4`), matching
/// how the browser stringified scores.
fn format_number(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// String conversion as a browser template literal performs it.
fn js_string(value: &serde_json::Value) -> String {
    use serde_json::Value;
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Ordered `(metric, score)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationScores(Vec<(String, MetricScore)>);

impl EvaluationScores {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricScore)> {
        self.0.iter().map(|(metric, score)| (metric.as_str(), score))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert a score. A repeated metric keeps its first position and takes
    /// the newer value, like a JSON object parsed by a browser.
    pub fn insert(&mut self, metric: impl Into<String>, score: MetricScore) {
        let metric = metric.into();
        match self.0.iter_mut().find(|(m, _)| *m == metric) {
            Some(entry) => entry.1 = score,
            None => self.0.push((metric, score)),
        }
    }
}

impl FromIterator<(String, MetricScore)> for EvaluationScores {
    fn from_iter<I: IntoIterator<Item = (String, MetricScore)>>(iter: I) -> Self {
        let mut scores = Self::default();
        for (metric, score) in iter {
            scores.insert(metric, score);
        }
        scores
    }
}

impl<'de> Deserialize<'de> for EvaluationScores {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoresVisitor;

        impl<'de> Visitor<'de> for ScoresVisitor {
            type Value = EvaluationScores;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping metric names to scores")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut scores = EvaluationScores(Vec::with_capacity(map.size_hint().unwrap_or(0)));
                while let Some((metric, score)) = map.next_entry::<String, MetricScore>()? {
                    scores.insert(metric, score);
                }
                Ok(scores)
            }
        }

        deserializer.deserialize_map(ScoresVisitor)
    }
}

impl Serialize for EvaluationScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (metric, score) in &self.0 {
            map.serialize_entry(metric, score)?;
        }
        map.end()
    }
}
