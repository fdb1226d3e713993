//! Per-author contribution statistics and ranking.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Line counts attributed to one author.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorStats {
    /// Target-side lines inserted by the merge that this author introduced.
    pub added: u64,
    /// Source-side lines deleted by the merge that this author last touched.
    pub removed: u64,
    /// Unchanged lines next to a change that this author last touched.
    pub touched_context: u64,
    /// Lines this author owns in the analysed files (reviewer modes only).
    pub owned_lines: u64,
}

impl AuthorStats {
    /// Total touched lines, the default ranking key.
    pub fn total(&self) -> u64 {
        self.added + self.removed + self.touched_context
    }

    fn merge(&mut self, other: &AuthorStats) {
        self.added += other.added;
        self.removed += other.removed;
        self.touched_context += other.touched_context;
        self.owned_lines += other.owned_lines;
    }
}

/// Integer weights applied to each kind of touched line when ranking.
///
/// The defaults weigh every kind equally, which ranks by total touched lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub added: u64,
    pub removed: u64,
    pub context: u64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            added: 1,
            removed: 1,
            context: 1,
        }
    }
}

impl ScoreWeights {
    /// Weighted score for one author.
    pub fn score(&self, stats: &AuthorStats) -> u64 {
        // Weights come from user configuration; clamp instead of overflowing.
        self.added
            .saturating_mul(stats.added)
            .saturating_add(self.removed.saturating_mul(stats.removed))
            .saturating_add(self.context.saturating_mul(stats.touched_context))
    }
}

/// A file whose contribution was dropped, and why.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

/// One row of a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedAuthor {
    pub author: String,
    pub stats: AuthorStats,
    pub score: u64,
}

impl RankedAuthor {
    /// This author's proportion of `total_score`, between 0 and 1.
    pub fn share(&self, total_score: u64) -> f64 {
        if total_score == 0 {
            0.0
        } else {
            self.score as f64 / total_score as f64
        }
    }
}

/// Aggregated result of an analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionStats {
    authors: BTreeMap<String, AuthorStats>,
    files_analyzed: usize,
    replaced_files: Vec<String>,
    skipped: Vec<SkippedFile>,
}

impl ContributionStats {
    /// Create empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_added(&mut self, author: &str) {
        self.entry(author).added += 1;
    }

    pub fn record_removed(&mut self, author: &str) {
        self.entry(author).removed += 1;
    }

    pub fn record_context(&mut self, author: &str) {
        self.entry(author).touched_context += 1;
    }

    pub fn record_owned(&mut self, author: &str, lines: u64) {
        self.entry(author).owned_lines += lines;
    }

    /// Count a file as analysed; `replaced` marks the coarse diff fallback.
    pub fn mark_analyzed(&mut self, path: &str, replaced: bool) {
        self.files_analyzed += 1;
        if replaced {
            self.replaced_files.push(path.to_string());
        }
    }

    /// Record a file whose contribution was dropped.
    pub fn mark_skipped(&mut self, path: &str, reason: impl Into<String>) {
        self.skipped.push(SkippedFile {
            path: path.to_string(),
            reason: reason.into(),
        });
    }

    fn entry(&mut self, author: &str) -> &mut AuthorStats {
        self.authors.entry(author.to_string()).or_default()
    }

    /// Statistics for one author.
    pub fn author(&self, author: &str) -> Option<&AuthorStats> {
        self.authors.get(author)
    }

    /// All authors, ordered by identity.
    pub fn authors(&self) -> impl Iterator<Item = (&String, &AuthorStats)> {
        self.authors.iter()
    }

    pub fn files_analyzed(&self) -> usize {
        self.files_analyzed
    }

    /// Files classified as fully replaced, ordered by path.
    pub fn replaced_files(&self) -> &[String] {
        &self.replaced_files
    }

    /// Files dropped from the aggregate, ordered by path.
    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    pub fn total_added(&self) -> u64 {
        self.authors.values().map(|s| s.added).sum()
    }

    pub fn total_removed(&self) -> u64 {
        self.authors.values().map(|s| s.removed).sum()
    }

    pub fn total_context(&self) -> u64 {
        self.authors.values().map(|s| s.touched_context).sum()
    }

    /// Whether no author has been credited with anything.
    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    /// Fold another partial result into this one.
    pub fn merge(&mut self, other: ContributionStats) {
        self.absorb(other);
        self.sort_files();
    }

    /// Fold many partial results, sorting the file lists once at the end.
    pub fn merge_all(parts: impl IntoIterator<Item = ContributionStats>) -> Self {
        let mut total = Self::new();
        for part in parts {
            total.absorb(part);
        }
        total.sort_files();
        total
    }

    fn absorb(&mut self, other: ContributionStats) {
        for (author, stats) in &other.authors {
            self.entry(author).merge(stats);
        }
        self.files_analyzed += other.files_analyzed;
        self.replaced_files.extend(other.replaced_files);
        self.skipped.extend(other.skipped);
    }

    fn sort_files(&mut self) {
        self.replaced_files.sort();
        self.skipped.sort();
    }

    /// Authors by total touched lines, descending, ties by identity.
    pub fn ranking(&self) -> Vec<RankedAuthor> {
        self.ranking_with(&ScoreWeights::default())
    }

    /// Authors by weighted score, descending, ties by identity.
    ///
    /// Authors scoring zero are left out.
    pub fn ranking_with(&self, weights: &ScoreWeights) -> Vec<RankedAuthor> {
        let mut ranked: Vec<RankedAuthor> = self
            .authors
            .iter()
            .map(|(author, stats)| RankedAuthor {
                author: author.clone(),
                stats: *stats,
                score: weights.score(stats),
            })
            .filter(|row| row.score > 0)
            .collect();

        ranked.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.author.cmp(&b.author)));
        ranked
    }
}
