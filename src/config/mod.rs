/// Configuration system for bharatlens.
///
/// Layered, later layers win at the field level:
///
/// 1. **Built-in defaults**: [`schema::ClientConfig::default()`]
/// 2. **User global config**: `~/.bharatlens/config.toml`
/// 3. **Project local config**: `.bharatlens.toml` in the current directory
/// 4. **Environment variables**: `BHARATLENS_*`
///
/// Malformed files are skipped rather than reported: a broken config must not
/// stop a submission from going out with defaults.
///
/// # Usage
///
/// ```rust,ignore
/// let cfg = bharatlens::config::load();
/// let client = HttpAnalysisClient::from_config(&cfg.backend);
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::ClientConfig;

/// Directory under the home dir holding config and logs.
const DATA_DIR: &str = ".bharatlens";

/// Keys that are valid but absent from the serialized defaults.
const OPTIONAL_KEYS: &[&str] = &["web.template_dir"];

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
pub fn load() -> ClientConfig {
    let mut config = load_layers(&[global_config_path(), project_config_path()]);
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Merge TOML files in order over the defaults. Missing or malformed files
/// are skipped.
pub fn load_layers(paths: &[Option<PathBuf>]) -> ClientConfig {
    let mut merged = match toml::Value::try_from(ClientConfig::default()) {
        Ok(value) => value,
        Err(_) => return ClientConfig::default(),
    };

    for path in paths.iter().flatten() {
        if let Some(layer) = read_toml_value(path) {
            merge_values(&mut merged, layer);
        }
    }

    merged.try_into().unwrap_or_default()
}

fn read_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    let value: toml::Value = toml::from_str(&content).ok()?;
    // Reject files whose values have the wrong types for the schema.
    value.clone().try_into::<ClientConfig>().ok()?;
    Some(value)
}

/// Recursively overlay `overlay` onto `base`, table by table.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// `~/.bharatlens`, where config and logs live.
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DATA_DIR))
}

fn global_config_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".bharatlens.toml"))
}

/// Path of the global config file, for display and `config init`.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Path of the project config file, for display.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply `BHARATLENS_*` overrides (highest precedence layer).
///
/// - `BHARATLENS_BACKEND_URL`: service root
/// - `BHARATLENS_ENDPOINT`: analysis path
/// - `BHARATLENS_TIMEOUT_MS`: transport timeout
/// - `BHARATLENS_WEB_ADDR`: `serve` bind address
/// - `BHARATLENS_TEMPLATE_DIR`: page template overrides
/// - `BHARATLENS_ESCAPE_SUMMARIES`: escape summary HTML (`1`/`true`)
/// - `BHARATLENS_LOGGING`: diagnostic log and history (`0` disables)
pub fn apply_env_overrides(config: &mut ClientConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("BHARATLENS_BACKEND_URL")
        && !val.is_empty()
    {
        config.backend.base_url = val;
    }
    if let Some(val) = var("BHARATLENS_ENDPOINT")
        && !val.is_empty()
    {
        config.backend.endpoint = val;
    }
    if let Some(val) = var("BHARATLENS_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.backend.timeout_ms = ms;
    }
    if let Some(val) = var("BHARATLENS_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
    if let Some(val) = var("BHARATLENS_TEMPLATE_DIR")
        && !val.is_empty()
    {
        config.web.template_dir = Some(PathBuf::from(val));
    }
    if let Some(val) = var("BHARATLENS_ESCAPE_SUMMARIES") {
        config.render.escape_summaries = is_truthy(&val);
    }
    if let Some(val) = var("BHARATLENS_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
pub(crate) fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / show
// ---------------------------------------------------------------------------

/// Write the annotated default config to `~/.bharatlens/config.toml`.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.bharatlens/ directory")?;
    }
    fs::write(&path, ClientConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set one dotted key (e.g. `backend.base_url`) in the global config file.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let mut root: toml::Value = if path.exists() {
        let content = fs::read_to_string(&path).context("failed to read config file")?;
        toml::from_str(&content).context("failed to parse config file")?
    } else {
        toml::Value::try_from(ClientConfig::default())
            .context("failed to serialize default config")?
    };

    set_toml_value(&mut root, key, value)?;

    // Validate before writing so a bad value never lands on disk.
    root.clone()
        .try_into::<ClientConfig>()
        .with_context(|| format!("invalid value for '{key}': {value}"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    let output = toml::to_string_pretty(&root).context("failed to serialize config")?;
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML tree by dotted key, parsing it according to the
/// type of the value already there (or of the schema default).
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let Some((section, leaf)) = key.rsplit_once('.') else {
        anyhow::bail!("config keys look like 'section.key', got '{key}'");
    };

    let defaults = toml::Value::try_from(ClientConfig::default())
        .context("failed to serialize default config")?;
    let template = section
        .split('.')
        .try_fold(&defaults, |node, part| node.get(part))
        .and_then(|table| table.get(leaf));
    if template.is_none() && !OPTIONAL_KEYS.contains(&key) {
        anyhow::bail!("unknown config key: '{key}'");
    }

    let mut current = root;
    for part in section.split('.') {
        let table = current
            .as_table_mut()
            .with_context(|| format!("expected table above '{part}' in '{key}'"))?;
        current = table
            .entry(part.to_string())
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }
    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table at '{section}'"))?;

    let new_value = match table.get(leaf).or(template) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => toml::Value::Integer(
            raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?,
        ),
        _ => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// The effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    toml::to_string_pretty(&load()).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bharatlens-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn no_files_gives_defaults() {
        assert_eq!(load_layers(&[None, None]), ClientConfig::default());
    }

    #[test]
    fn project_layer_overrides_global_per_field() {
        let global = write_temp(
            "global.toml",
            "[backend]\nbase_url = \"http://global:5000\"\ntimeout_ms = 30000\n",
        );
        let project = write_temp("project.toml", "[backend]\nbase_url = \"http://project:5000\"\n");

        let config = load_layers(&[Some(global), Some(project)]);
        assert_eq!(config.backend.base_url, "http://project:5000");
        // Only set in the global layer; survives the project layer.
        assert_eq!(config.backend.timeout_ms, 30000);
        assert_eq!(config.backend.endpoint, "/analyze");
    }

    #[test]
    fn malformed_layer_is_ignored() {
        let broken = write_temp("broken.toml", "[backend\nbase_url = ");
        let wrong_type = write_temp("wrong.toml", "[backend]\ntimeout_ms = \"soon\"\n");
        let config = load_layers(&[Some(broken), Some(wrong_type)]);
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("BHARATLENS_BACKEND_URL", "http://10.0.0.5:5000"),
            ("BHARATLENS_TIMEOUT_MS", "2500"),
            ("BHARATLENS_ESCAPE_SUMMARIES", "yes"),
            ("BHARATLENS_LOGGING", "0"),
            ("BHARATLENS_TEMPLATE_DIR", "/srv/templates"),
        ]
        .into_iter()
        .collect();

        let mut config = ClientConfig::default();
        apply_env_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend.base_url, "http://10.0.0.5:5000");
        assert_eq!(config.backend.timeout_ms, 2500);
        assert!(config.render.escape_summaries);
        assert!(!config.logging.enabled);
        assert_eq!(config.web.template_dir, Some(PathBuf::from("/srv/templates")));
    }

    #[test]
    fn env_overrides_skip_empty_and_unparsable_values() {
        let mut config = ClientConfig::default();
        apply_env_overrides(&mut config, |key| match key {
            "BHARATLENS_BACKEND_URL" => Some(String::new()),
            "BHARATLENS_TIMEOUT_MS" => Some("soon".to_string()),
            _ => None,
        });
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn is_truthy_accepts_variants() {
        for yes in ["1", "true", "TRUE", "yes", "on", "ON"] {
            assert!(is_truthy(yes), "{yes}");
        }
        for no in ["0", "false", "no", "off", ""] {
            assert!(!is_truthy(no), "{no}");
        }
    }

    #[test]
    fn set_toml_value_parses_by_existing_type() {
        let mut root: toml::Value = toml::from_str("[backend]\ntimeout_ms = 100\n").unwrap();
        set_toml_value(&mut root, "backend.timeout_ms", "250").unwrap();
        set_toml_value(&mut root, "backend.base_url", "http://x:1").unwrap();
        set_toml_value(&mut root, "render.escape_summaries", "on").unwrap();

        assert_eq!(root["backend"]["timeout_ms"].as_integer(), Some(250));
        assert_eq!(root["backend"]["base_url"].as_str(), Some("http://x:1"));
        assert_eq!(root["render"]["escape_summaries"].as_bool(), Some(true));
    }

    #[test]
    fn set_toml_value_rejects_bad_input() {
        let mut root: toml::Value = toml::from_str("[backend]\n").unwrap();
        assert!(set_toml_value(&mut root, "backend.timeout_ms", "soon").is_err());
        assert!(set_toml_value(&mut root, "nonexistent.key", "x").is_err());
        assert!(set_toml_value(&mut root, "nodots", "x").is_err());
    }

    #[test]
    fn optional_key_can_be_set_on_an_empty_file() {
        let mut root: toml::Value = toml::from_str("").unwrap();
        set_toml_value(&mut root, "web.template_dir", "/srv/t").unwrap();
        assert_eq!(root["web"]["template_dir"].as_str(), Some("/srv/t"));
    }
}
