//! Analyze command implementation.

use crate::report::Report;
use anyhow::{Context, Result};
use colored::Colorize;
use reviewer_core::{AnalysisMode, AttributionAnalyzer, CancellationToken, Error, ReviewerConfig};
use reviewer_git::GitGateway;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Run the analysis and print the report.
pub async fn run(
    repo: PathBuf,
    source: String,
    target: String,
    mode: AnalysisMode,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let gateway = GitGateway::open(&repo)
        .with_context(|| format!("Cannot open repository at {}", repo.display()))?;
    let config = ReviewerConfig::load(gateway.root())?;
    debug!(?config, "Loaded configuration");

    let token = CancellationToken::new();
    let analyzer = AttributionAnalyzer::new(
        Arc::new(gateway),
        config.diff_engine(),
        config.analyzer_config(),
    )
    .with_cancellation(token.clone());

    if !json {
        println!("{} Analyzing {} → {}", "→".blue(), source, target);
    }

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping before the next file");
            token.cancel();
        }
    });

    let (src, tgt) = (source.clone(), target.clone());
    let result = tokio::task::spawn_blocking(move || analyzer.analyze_changes(&src, &tgt, mode)).await?;

    // main prints the returned error, so nothing is printed here.
    let stats = result.map_err(describe_failure)?;

    let report = Report::new(source, target, mode, &stats, &config.weights);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print(verbose);
    }

    Ok(())
}

/// The error reported for a failed run.
fn describe_failure(err: Error) -> anyhow::Error {
    match err {
        Error::InvalidRevision(name) => anyhow::anyhow!("{} Revision not found: {}", "✗".red(), name),
        other => anyhow::Error::new(other).context(format!("{} Analysis failed", "✗".red())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_revision_is_reported_once() {
        let message = format!("{:#}", describe_failure(Error::InvalidRevision("nope".into())));
        assert!(message.contains("Revision not found: nope"));
        assert_eq!(message.matches("nope").count(), 1);
    }

    #[test]
    fn test_other_failures_keep_their_cause() {
        let message = format!("{:#}", describe_failure(Error::Cancelled));
        assert!(message.contains("Analysis failed"));
        assert!(message.contains("Analysis cancelled"));
    }
}
