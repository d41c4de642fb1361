/// Configuration schema and defaults for the bharatlens client.
///
/// Sections: `[backend]`, `[web]`, `[render]`, `[logging]`. Every field has a
/// built-in default, so a config file only needs the keys it changes.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level client configuration.
///
/// Maps onto `~/.bharatlens/config.toml` and `.bharatlens.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub backend: BackendConfig,
    pub web: WebConfig,
    pub render: RenderConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [backend]
// ---------------------------------------------------------------------------

/// Where the analysis service lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Service root, e.g. `http://127.0.0.1:5000`.
    pub base_url: String,
    /// Path of the analysis endpoint.
    pub endpoint: String,
    /// Transport timeout in milliseconds. Analyses fetch and summarise news
    /// articles server-side, so this is generous.
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            endpoint: "/analyze".to_string(),
            timeout_ms: 120_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Local web page server (`bharatlens serve`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub addr: String,
    /// Directory holding `index.html` and `results.html` overrides.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            template_dir: None,
        }
    }
}

// ---------------------------------------------------------------------------
// [render]
// ---------------------------------------------------------------------------

/// Rendering switches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Escape summary text before applying `**bold**` / `*italic*`
    /// formatting. Off by default: the service is trusted to send plain text.
    pub escape_summaries: bool,
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Diagnostic log and submission history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl ClientConfig {
    /// Annotated default config written by `bharatlens config init`.
    pub fn default_toml() -> String {
        r#"# bharatlens configuration
#
# Precedence (highest wins):
#   1. Environment variables (BHARATLENS_*)
#   2. Project config (.bharatlens.toml in the current directory)
#   3. User global config (~/.bharatlens/config.toml)
#   4. Built-in defaults

[backend]
base_url = "http://127.0.0.1:5000"
endpoint = "/analyze"
timeout_ms = 120000      # transport timeout; analyses can take a while

[web]
addr = "127.0.0.1:9747"  # bharatlens serve
# template_dir = "/path/to/templates"   # index.html + results.html overrides

[render]
escape_summaries = false # escape summary HTML before formatting

[logging]
enabled = true           # ~/.bharatlens/client.log and history.jsonl
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_matches_built_in_defaults() {
        let parsed: ClientConfig = toml::from_str(&ClientConfig::default_toml()).unwrap();
        assert_eq!(parsed, ClientConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let parsed: ClientConfig = toml::from_str(
            r#"
[backend]
base_url = "http://analysis.internal:8000"
"#,
        )
        .unwrap();
        assert_eq!(parsed.backend.base_url, "http://analysis.internal:8000");
        assert_eq!(parsed.backend.endpoint, "/analyze");
        assert_eq!(parsed.backend.timeout_ms, 120_000);
        assert!(parsed.logging.enabled);
        assert!(!parsed.render.escape_summaries);
    }

    #[test]
    fn serialized_defaults_round_trip() {
        let text = toml::to_string_pretty(&ClientConfig::default()).unwrap();
        let parsed: ClientConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, ClientConfig::default());
    }
}
