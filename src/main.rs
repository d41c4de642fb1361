use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use bharatlens::cli;

#[derive(Debug, Parser)]
#[command(name = "bharatlens")]
#[command(about = "Perspectives, summaries, and media bias for news topics")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze a topic and render the results
    Analyze {
        /// The topic to analyze
        #[arg(trailing_var_arg = true, required = true)]
        topic: Vec<String>,
        /// Output format: terminal (default), html, json
        #[arg(long, default_value = "terminal")]
        format: String,
        /// Write the output to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Serve the analysis page over HTTP
    Serve {
        /// Bind address (default: web.addr from config)
        #[arg(long)]
        addr: Option<String>,
        /// Open the page in the default browser
        #[arg(long)]
        open: bool,
    },
    /// Show recent submissions
    History {
        /// Number of submissions to show
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Check config, the analysis service, and log files
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Write a default config to ~/.bharatlens/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a value, e.g. `backend.base_url http://10.0.0.5:5000`
    Set { key: String, value: String },
    /// Print config file locations
    Path,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Analyze {
            topic,
            format,
            output,
        } => {
            let fmt = cli::AnalyzeFormat::from_str_opt(Some(&format));
            let rendered = cli::run_analyze(&topic.join(" "), fmt, output.as_deref())?;
            if !rendered {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Serve { addr, open } => cli::run_serve(addr.as_deref(), open),
        Commands::History { limit, format } => {
            let fmt = cli::HistoryFormat::from_str_opt(Some(&format));
            cli::run_history(limit, fmt)
        }
        Commands::Health => cli::run_health(),
        Commands::Config { command } => match command {
            ConfigCommand::Show => cli::run_config_show(),
            ConfigCommand::Init { force } => cli::run_config_init(force),
            ConfigCommand::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigCommand::Path => cli::run_config_path(),
        },
    }
}
