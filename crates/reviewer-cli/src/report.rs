//! Human and JSON rendering of an analysis result.

use colored::Colorize;
use reviewer_core::{AnalysisMode, ContributionStats, RankedAuthor, ScoreWeights, SkippedFile};
use serde::Serialize;

/// Everything the CLI prints about one run.
#[derive(Debug, Serialize)]
pub struct Report {
    pub source: String,
    pub target: String,
    pub mode: AnalysisMode,
    pub files_analyzed: usize,
    pub replaced_files: Vec<String>,
    pub skipped: Vec<SkippedFile>,
    /// Authors of the changed lines, by lines added and removed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<RankedAuthor>>,
    /// Reviewers by weighted share of the touched lines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewers: Option<Vec<Reviewer>>,
}

/// A ranked reviewer with their share of the total score.
#[derive(Debug, Serialize)]
pub struct Reviewer {
    #[serde(flatten)]
    pub ranked: RankedAuthor,
    pub share: f64,
}

impl Report {
    pub fn new(
        source: String,
        target: String,
        mode: AnalysisMode,
        stats: &ContributionStats,
        weights: &ScoreWeights,
    ) -> Self {
        let authors = mode.includes_author().then(|| {
            stats.ranking_with(&ScoreWeights {
                context: 0,
                ..*weights
            })
        });

        let reviewers = mode.includes_reviewer().then(|| {
            let ranking = stats.ranking_with(weights);
            let total: u64 = ranking.iter().map(|r| r.score).sum();
            ranking
                .into_iter()
                .map(|ranked| Reviewer {
                    share: ranked.share(total),
                    ranked,
                })
                .collect::<Vec<_>>()
        });

        Self {
            source,
            target,
            mode,
            files_analyzed: stats.files_analyzed(),
            replaced_files: stats.replaced_files().to_vec(),
            skipped: stats.skipped().to_vec(),
            authors,
            reviewers,
        }
    }

    /// Print the coloured report to stdout.
    pub fn print(&self, verbose: bool) {
        println!();
        println!(
            "  Files analyzed: {}",
            self.files_analyzed.to_string().green()
        );
        if !self.replaced_files.is_empty() {
            println!(
                "  Files rewritten beyond the diff limit: {}",
                self.replaced_files.len().to_string().yellow()
            );
        }
        if !self.skipped.is_empty() {
            println!("  Files skipped: {}", self.skipped.len().to_string().yellow());
            if verbose {
                for skipped in &self.skipped {
                    println!("    {} {}: {}", "✗".red(), skipped.path, skipped.reason);
                }
            }
        }

        if let Some(authors) = &self.authors {
            println!();
            println!("{} Suggested authors", "→".blue());
            if authors.is_empty() {
                println!("  {}", "No changed lines could be attributed".dimmed());
            }
            for (rank, row) in authors.iter().enumerate() {
                println!(
                    "  {:>2}. {}  {} {}",
                    rank + 1,
                    row.author.bold(),
                    format!("+{}", row.stats.added).green(),
                    format!("-{}", row.stats.removed).red()
                );
            }
        }

        if let Some(reviewers) = &self.reviewers {
            println!();
            println!("{} Suggested reviewers", "→".blue());
            if reviewers.is_empty() {
                println!("  {}", "No candidates found".dimmed());
            }
            for (rank, row) in reviewers.iter().enumerate() {
                println!(
                    "  {:>2}. {}  {:>5.1}%  ({} context, {} owned)",
                    rank + 1,
                    row.ranked.author.bold(),
                    row.share * 100.0,
                    row.ranked.stats.touched_context,
                    row.ranked.stats.owned_lines
                );
            }
        }
    }
}
