//! BlameLens CLI
//!
//! Command-line interface for the BlameLens blame engine.

use anyhow::Result;
use blamelens_core::LineRange;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{parse_line, parse_lines, Context};

#[derive(Parser)]
#[command(name = "blamelens")]
#[command(author, version, about = "Line-by-line authorship for your working tree", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Path inside the repository (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    repo: PathBuf,

    /// Configuration file (defaults to .blamelens.json in the repository root)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Blame a file, or a range of its lines
    Blame {
        /// File to blame
        file: PathBuf,

        /// Line range, 1-indexed and inclusive (e.g. 10:20)
        #[arg(short, long, value_parser = parse_lines)]
        lines: Option<LineRange>,
    },

    /// Blame a single line
    Line {
        /// File to blame
        file: PathBuf,

        /// Line number (1-indexed)
        #[arg(value_parser = parse_line)]
        line: usize,
    },

    /// Rank authors by the lines they own
    Authors {
        /// File to blame
        file: PathBuf,

        /// Line range, 1-indexed and inclusive
        #[arg(short, long, value_parser = parse_lines)]
        lines: Option<LineRange>,
    },

    /// Show the lines one commit contributes
    Commit {
        /// File to blame
        file: PathBuf,

        /// Commit hash (full or short)
        sha: String,

        /// Line range, 1-indexed and inclusive
        #[arg(short, long, value_parser = parse_lines)]
        lines: Option<LineRange>,
    },

    /// List one location per commit touching a range
    Locations {
        /// File to blame
        file: PathBuf,

        /// Line range, 1-indexed and inclusive
        #[arg(short, long, value_parser = parse_lines)]
        lines: LineRange,
    },
}

/// Log filter when `RUST_LOG` is unset. The prefix matches every
/// `blamelens_*` crate target.
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "blamelens=debug"
    } else {
        "blamelens=info"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    let ctx = Context::open(&cli.repo, cli.config.as_deref(), cli.json)?;

    match cli.command {
        Commands::Blame { file, lines } => {
            commands::blame::run(&ctx, &file, lines).await?;
        }
        Commands::Line { file, line } => {
            commands::line::run(&ctx, &file, line).await?;
        }
        Commands::Authors { file, lines } => {
            commands::authors::run(&ctx, &file, lines).await?;
        }
        Commands::Commit { file, sha, lines } => {
            commands::commit::run(&ctx, &file, &sha, lines).await?;
        }
        Commands::Locations { file, lines } => {
            commands::locations::run(&ctx, &file, lines).await?;
        }
    }

    Ok(())
}
