//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `bharatlens analyze <topic>`: one submission, rendered to the terminal, HTML, or JSON
//! - `bharatlens serve`: the web front end
//! - `bharatlens history`: recent submissions from `history.jsonl`
//! - `bharatlens health`: config, backend reachability, templates, log files
//! - `bharatlens config show|init|set|path`: configuration management

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::analysis::AnalysisRequest;
use crate::client::{AnalysisClient, AnalysisReply, Backend, HttpAnalysisClient};
use crate::config::{self, ClientConfig};
use crate::controller::{
    AnalysisFormController, ControllerOptions, NETWORK_ERROR, Outcome, Settled, Submission,
};
use crate::diagnostics::{Diagnostics, SubmissionRecord};
use crate::page::{Page, PageTemplate};
use crate::terminal::TerminalView;
use crate::ui::{ButtonState, Regions};
use crate::web;

/// Output format for `analyze`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeFormat {
    Terminal,
    Html,
    Json,
}

impl AnalyzeFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("html") => Self::Html,
            Some("json") => Self::Json,
            _ => Self::Terminal,
        }
    }
}

/// Output format for `history`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryFormat {
    Table,
    Json,
}

impl HistoryFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// bharatlens analyze
// ---------------------------------------------------------------------------

/// Keeps the last response body so `--format json` can print it verbatim.
struct Recording {
    inner: HttpAnalysisClient,
    last_body: RefCell<Option<String>>,
}

impl AnalysisClient for Recording {
    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReply> {
        let (status, body) = self.inner.post_topic(request)?;
        let reply = AnalysisReply::from_http(status, &body);
        self.last_body.replace(Some(body));
        reply
    }
}

/// Run one submission. Returns whether results were rendered.
pub fn run_analyze(topic: &str, format: AnalyzeFormat, output: Option<&Path>) -> Result<bool> {
    let cfg = config::load();
    let backend = HttpAnalysisClient::from_config(&cfg.backend);
    let base_url = backend.base_url().to_string();
    let client = Recording {
        inner: backend,
        last_body: RefCell::new(None),
    };
    let options = ControllerOptions::from_config(&cfg);

    if format == AnalyzeFormat::Terminal && output.is_none() {
        eprintln!(
            "{} {} {}",
            "Analyzing".bold().cyan(),
            topic.trim().bold(),
            format!("via {}", client.inner.analyze_url()).dimmed()
        );
    }

    let (rendered, settled) = match format {
        AnalyzeFormat::Html => {
            let page = load_page(&cfg)?;
            let mut controller = page.controller(&client).with_options(options);
            let settled = submit_topic(|t| controller.submit(t), topic)?;
            (page.render(&controller), settled)
        }
        AnalyzeFormat::Terminal => {
            let mut controller =
                AnalysisFormController::new(&client, Regions::initial(), ButtonState::default())
                    .with_options(options);
            let settled = submit_topic(|t| controller.submit(t), topic)?;
            if output.is_some() {
                colored::control::set_override(false);
            }
            let view = TerminalView::new(controller.regions()).with_link_base(&base_url);
            (view.to_string(), settled)
        }
        AnalyzeFormat::Json => {
            let mut controller =
                AnalysisFormController::new(&client, Regions::initial(), ButtonState::default())
                    .with_options(options);
            let settled = submit_topic(|t| controller.submit(t), topic)?;
            let body = client.last_body.borrow();
            (analysis_json(body.as_deref(), &settled.outcome), settled)
        }
    };

    match output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("{} Wrote {}", "✓".green().bold(), path.display());
        }
        None => print!("{rendered}"),
    }

    if format == AnalyzeFormat::Terminal {
        let latency = format!("{}ms", settled.latency_ms);
        eprintln!("{}", latency.dimmed());
    }

    Ok(settled.outcome.is_rendered())
}

fn submit_topic(submit: impl FnOnce(&str) -> Submission, topic: &str) -> Result<Settled> {
    match submit(topic) {
        Submission::Settled(settled) => Ok(settled),
        Submission::Skipped => anyhow::bail!("topic must not be empty"),
        Submission::Busy => anyhow::bail!("a submission is already in flight"),
    }
}

fn load_page(cfg: &ClientConfig) -> Result<Page> {
    let template = PageTemplate::load(cfg.web.template_dir.as_deref())?;
    Ok(Page::bind(template)?)
}

/// The response body as the service sent it, or `{"error": ...}`.
fn analysis_json(body: Option<&str>, outcome: &Outcome) -> String {
    match (body, outcome) {
        (Some(body), Outcome::Rendered { .. }) => format!("{}\n", body.trim_end()),
        (_, outcome) => {
            let message = outcome.banner().unwrap_or(NETWORK_ERROR);
            format!("{:#}\n", serde_json::json!({ "error": message }))
        }
    }
}

// ---------------------------------------------------------------------------
// bharatlens serve
// ---------------------------------------------------------------------------

pub fn run_serve(addr: Option<&str>, open: bool) -> Result<()> {
    let cfg = config::load();
    let addr = addr.unwrap_or(&cfg.web.addr).to_string();
    web::serve(&addr, &cfg, open)
}

// ---------------------------------------------------------------------------
// bharatlens history
// ---------------------------------------------------------------------------

/// Show the most recent submissions, oldest first.
pub fn run_history(limit: usize, format: HistoryFormat) -> Result<()> {
    let cfg = config::load();
    let diagnostics = Diagnostics::from_config(&cfg.logging);
    if !diagnostics.is_enabled() {
        println!(
            "{}",
            "Logging is disabled (logging.enabled = false); no history is kept.".yellow()
        );
        return Ok(());
    }

    let records = diagnostics.recent_submissions(limit);
    match format {
        HistoryFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        HistoryFormat::Table => {
            if records.is_empty() {
                println!(
                    "{}",
                    "No submissions yet. Run `bharatlens analyze <topic>` first.".yellow()
                );
            } else {
                print_history_table(&records);
            }
        }
    }
    Ok(())
}

fn print_history_table(records: &[SubmissionRecord]) {
    println!("{}", "Recent Submissions".bold().cyan());
    println!("{}", "=".repeat(78));
    println!(
        "  {:<17} {:<14} {:>6} {:>9}  {}",
        "Time".bold(),
        "Outcome".bold(),
        "Status".bold(),
        "Latency".bold(),
        "Topic".bold()
    );

    for record in records {
        let time = chrono::DateTime::parse_from_rfc3339(&record.timestamp)
            .map(|t| {
                t.with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
            })
            .unwrap_or_else(|_| record.timestamp.clone());
        let outcome = format!("{:<14}", record.outcome);
        let outcome = if record.succeeded() {
            outcome.green()
        } else {
            outcome.red()
        };
        let status = record
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "  {:<17} {} {:>6} {:>7}ms  {}",
            time, outcome, status, record.latency_ms, record.topic
        );
        if let Some(detail) = record.detail.as_deref().filter(|_| !record.succeeded()) {
            println!("  {:<17} {}", "", detail.dimmed());
        }
    }
}

// ---------------------------------------------------------------------------
// bharatlens health
// ---------------------------------------------------------------------------

/// Check config files, backend reachability, page templates, and log files.
pub fn run_health() -> Result<()> {
    println!("{}", "bharatlens Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let cfg = config::load();
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.bharatlens/config.toml found"
        } else {
            "not found (run `bharatlens config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".bharatlens.toml found"
        } else {
            "none (optional)"
        },
    );

    let backend = HttpAnalysisClient::from_config(&cfg.backend);
    let reachable = backend.is_reachable();
    print_health_item(
        "Analysis service",
        reachable,
        &if reachable {
            format!("reachable at {}", backend.base_url())
        } else {
            format!("not reachable at {}; is the service running?", backend.base_url())
        },
    );
    print_health_item("Endpoint", true, &backend.analyze_url());
    print_health_item(
        "Timeout",
        true,
        &format!("{}s", cfg.backend.timeout_ms / 1000),
    );

    match load_page(&cfg) {
        Ok(_) => print_health_item(
            "Page template",
            true,
            &match &cfg.web.template_dir {
                Some(dir) => format!("valid ({})", dir.display()),
                None => "embedded".to_string(),
            },
        ),
        Err(e) => print_health_item("Page template", false, &format!("{e:#}")),
    }

    let diagnostics = Diagnostics::from_config(&cfg.logging);
    if diagnostics.is_enabled() {
        let history = diagnostics
            .history_path()
            .filter(|p| p.exists())
            .map(|_| diagnostics.recent_submissions(usize::MAX).len());
        print_health_item(
            "Submission history",
            history.is_some(),
            &match history {
                Some(n) => format!("{n} entries"),
                None => "no history yet".to_string(),
            },
        );
    } else {
        print_health_item("Logging", false, "disabled");
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<25} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// bharatlens config show | init | set | path
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective bharatlens Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.bharatlens/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.bharatlens/config.toml (not found)".dimmed()
        );
    }
    if project_exists {
        println!("  {} {}", "✓".green(), ".bharatlens.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            ".bharatlens.toml (not found)".dimmed()
        );
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "BHARATLENS_* environment variables".dimmed()
    );

    Ok(())
}

/// Initialize a default config file at `~/.bharatlens/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!(
        "  {}",
        "Edit the file to point bharatlens at your analysis service.".dimmed()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Print where config files are read from.
pub fn run_config_path() -> Result<()> {
    let global = config::global_config_file().context("could not determine home directory")?;
    println!("{}", global.display());
    if let Some(project) = config::project_config_file() {
        println!("{}", project.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing_defaults() {
        assert_eq!(AnalyzeFormat::from_str_opt(None), AnalyzeFormat::Terminal);
        assert_eq!(AnalyzeFormat::from_str_opt(Some("html")), AnalyzeFormat::Html);
        assert_eq!(AnalyzeFormat::from_str_opt(Some("bogus")), AnalyzeFormat::Terminal);
        assert_eq!(HistoryFormat::from_str_opt(Some("json")), HistoryFormat::Json);
        assert_eq!(HistoryFormat::from_str_opt(None), HistoryFormat::Table);
    }

    #[test]
    fn json_output_is_the_body_as_sent() {
        let body = r#"{"executive_summary": "Calm.", "articles_used": 12}"#;
        let out = analysis_json(Some(body), &Outcome::Rendered { perspectives: 0 });
        assert_eq!(out, format!("{body}\n"));
    }

    #[test]
    fn json_output_reports_banner_on_failure() {
        let outcome = Outcome::Failed {
            status: 400,
            message: "Topic too vague".into(),
        };
        let out = analysis_json(Some(r#"{"error": "Topic too vague"}"#), &outcome);
        assert_eq!(out, "{\n  \"error\": \"Topic too vague\"\n}\n");

        let outcome = Outcome::NetworkError {
            detail: "refused".into(),
        };
        let out = analysis_json(None, &outcome);
        assert!(out.contains(NETWORK_ERROR));
    }

    #[test]
    fn blank_topic_is_an_error() {
        let err = submit_topic(|_| Submission::Skipped, "  ").unwrap_err();
        assert_eq!(err.to_string(), "topic must not be empty");
    }
}
