//! git-reviewer CLI
//!
//! Recommends authors and reviewers for merging one revision into another.

use anyhow::Result;
use clap::Parser;
use reviewer_core::AnalysisMode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod report;

#[derive(Parser)]
#[command(name = "git-reviewer")]
#[command(author, version, about = "Suggest authors and reviewers for a merge", long_about = None)]
struct Cli {
    /// Revision the changes are merged into
    #[arg(short, long, required_unless_present = "init")]
    target: Option<String>,

    /// Revision holding the changes
    #[arg(short, long, default_value = "HEAD")]
    source: String,

    /// Only rank the authors of the changed lines
    #[arg(long)]
    analyze_author: bool,

    /// Only rank reviewers by ownership of the surrounding code
    #[arg(long)]
    analyze_reviewer: bool,

    /// Write the default .gitreviewer.json and exit
    #[arg(long)]
    init: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Path inside the repository to analyze
    #[arg(short, long, default_value = ".")]
    repo: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging. RUST_LOG takes precedence over the flag.
    let default_filter = if cli.verbose {
        "git_reviewer=debug,reviewer_core=debug,reviewer_git=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.init {
        return commands::init::run(cli.repo);
    }

    // clap enforces the target whenever --init is absent.
    let Some(target) = cli.target else {
        anyhow::bail!("--target is required");
    };

    let mode = AnalysisMode::from_flags(cli.analyze_author, cli.analyze_reviewer);
    commands::analyze::run(cli.repo, cli.source, target, mode, cli.json, cli.verbose).await
}
