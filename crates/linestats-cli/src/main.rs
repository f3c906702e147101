//! linestats - pitch and interval histograms for annotated score corpora
//!
//! Subcommands:
//! - `linestats pitch` - Pitch histogram of the vocal lines
//! - `linestats interval` - Melodic interval histogram of the vocal lines
//! - `linestats config` - Show the effective configuration

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use linestats_conf::LinestatsConfig;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "linestats")]
#[command(about = "Pitch and interval histograms over annotated jingju scores")]
#[command(version)]
struct Cli {
    /// Config file to use instead of ./linestats.toml
    #[arg(long, global = true, env = "LINESTATS_CONFIG")]
    config: Option<PathBuf>,

    /// Line annotations file (overrides config)
    #[arg(long, global = true)]
    annotations: Option<PathBuf>,

    /// Folder holding the MusicXML scores (overrides config)
    #[arg(long, global = true)]
    scores: Option<PathBuf>,

    /// Treat the first annotation line as a header
    #[arg(long, global = true)]
    header: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Accepted category values; an absent flag keeps the configured values.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Role types to include (dan, laosheng)
    #[arg(long = "role-type", value_delimiter = ',')]
    pub role_types: Vec<String>,

    /// Modes to include (erhuang, xipi)
    #[arg(long = "mode", value_delimiter = ',')]
    pub modes: Vec<String>,

    /// Tempo categories to include (manban, yuanban, kuaiban)
    #[arg(long = "tempo", value_delimiter = ',')]
    pub tempo_categories: Vec<String>,

    /// Line types to include (o1, o2, o, c)
    #[arg(long = "line-type", value_delimiter = ',')]
    pub line_types: Vec<String>,
}

#[derive(Args, Debug, Default)]
pub struct OutputArgs {
    /// Print raw totals instead of percentages
    #[arg(long)]
    pub raw: bool,

    /// Write a bar chart as SVG (defaults to <plot_dir>/<command>.svg)
    #[arg(long, value_name = "FILE", num_args = 0..=1)]
    pub plot: Option<Option<PathBuf>>,

    /// Print one JSON document instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Pitch histogram of the vocal parts of matching scores
    Pitch {
        #[command(flatten)]
        filter: FilterArgs,

        /// Leave out grace notes
        #[arg(long)]
        no_grace_notes: bool,

        /// Count notes instead of summing their durations
        #[arg(long)]
        count: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Melodic interval histogram of the vocal parts of matching scores
    Interval {
        #[command(flatten)]
        filter: FilterArgs,

        /// Distinguish ascending and descending intervals
        #[arg(long)]
        directed: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the effective configuration and where it came from
    Config,
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let (mut config, sources) = LinestatsConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;

    if let Some(path) = cli.annotations {
        config.paths.annotations = path;
    }
    if let Some(path) = cli.scores {
        config.paths.scores_dir = path;
    }
    if cli.header {
        config.annotations.has_header = true;
    }

    init_tracing(&config.telemetry.log_level);
    tracing::debug!(files = ?sources.files, env = ?sources.env_overrides, "configuration loaded");

    match cli.command {
        Commands::Pitch {
            filter,
            no_grace_notes,
            count,
            output,
        } => commands::pitch(&config, &filter, !no_grace_notes, count, &output),
        Commands::Interval {
            filter,
            directed,
            output,
        } => commands::interval(&config, &filter, directed, &output),
        Commands::Config => commands::show_config(&config, &sources),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            for cause in e.chain().skip(1) {
                eprintln!("  {} {}", "caused by:".dimmed(), cause);
            }
            ExitCode::FAILURE
        }
    }
}
