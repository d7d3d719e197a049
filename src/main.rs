//! # Homework Helper CLI (`hwh`)
//!
//! Runs the homework-assistant HTTP server and exposes the same operations
//! from the terminal.
//!
//! ## Usage
//!
//! ```bash
//! hwh --config ./config/hwh.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `hwh serve` | Start the HTTP server |
//! | `hwh reindex` | Rebuild the textbook index from the PDF directory |
//! | `hwh answer "<question>"` | Answer a question (CAPS topics, then textbooks) |
//! | `hwh search "<query>"` | Show scored textbook matches with snippets |
//! | `hwh stats` | Summarize the persisted index |
//! | `hwh calc "<expr>"` | Evaluate an expression |
//! | `hwh completions <shell>` | Print shell completions |
//!
//! When the config file does not exist, built-in defaults are used
//! (`./pdfs`, `./data/pdf_index.json`, `127.0.0.1:5000`).

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use homework_helper::calc::AngleMode;
use homework_helper::config::{self, Config};
use homework_helper::{commands, server, stats};

/// Homework Helper: offline homework help from CAPS topics and PDF textbooks.
#[derive(Parser)]
#[command(name = "hwh", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/hwh.toml`. If the file is missing, built-in
    /// defaults are used.
    #[arg(long, global = true, default_value = "./config/hwh.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind` and serves the homework API.
    Serve,

    /// Rebuild the textbook index.
    ///
    /// Extracts text from every PDF in `[library].pdf_dir` and writes the
    /// index to `[library].index_path`.
    Reindex,

    /// Answer a question.
    Answer {
        question: String,
        /// Grade 4..=9, e.g. `7` or `"Grade 7"`.
        #[arg(long)]
        grade: Option<String>,
        /// `Mathematics` or `Natural Sciences` (short forms accepted).
        #[arg(long)]
        subject: Option<String>,
    },

    /// Search indexed textbooks.
    Search {
        query: String,
        #[arg(long)]
        grade: Option<String>,
        #[arg(long)]
        subject: Option<String>,
    },

    /// Show index statistics.
    Stats,

    /// Evaluate an arithmetic expression.
    Calc {
        expression: String,
        /// Interpret trigonometric arguments as radians instead of degrees.
        #[arg(long)]
        rad: bool,
    },

    /// Print shell completions.
    Completions { shell: Shell },
}

fn load_or_default(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        config::load_config(path)
    } else {
        warn!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::minimal())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Commands that don't require config
    match &cli.command {
        Commands::Calc { expression, rad } => {
            let mode = if *rad {
                AngleMode::Radians
            } else {
                AngleMode::Degrees
            };
            return commands::run_calc(expression, mode);
        }
        Commands::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "hwh", &mut std::io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let cfg = load_or_default(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Reindex => {
            commands::run_reindex(&cfg).await?;
        }
        Commands::Answer {
            question,
            grade,
            subject,
        } => {
            commands::run_answer(&cfg, &question, grade, subject)?;
        }
        Commands::Search {
            query,
            grade,
            subject,
        } => {
            commands::run_search(&cfg, &query, grade, subject)?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg)?;
        }
        Commands::Calc { .. } | Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
