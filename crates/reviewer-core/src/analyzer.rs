//! Attribution of a merge's changes to the contributors who own them.
//!
//! Each changed file runs through `fetch → diff → blame lookup → aggregate`
//! on its own worker, producing a private partial result. The partials are
//! reduced once every file has finished, so no lock guards the aggregate and
//! the outcome does not depend on scheduling.

use crate::blame::{BlameBuilder, BlameCache, BlameIndex};
use crate::diff::{DiffEngine, EditOp, EditScript};
use crate::error::{Error, Result};
use crate::gateway::VersionControlGateway;
use crate::revision::Revision;
use crate::stats::ContributionStats;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which rankings an analysis should support.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Who wrote the lines the merge adds and removes.
    Author,
    /// Who owns the code around the change.
    Reviewer,
    /// Both of the above.
    #[default]
    Both,
}

impl AnalysisMode {
    /// Mode from the `--analyze-author` / `--analyze-reviewer` flags. Neither means both.
    pub fn from_flags(author: bool, reviewer: bool) -> Self {
        match (author, reviewer) {
            (true, false) => AnalysisMode::Author,
            (false, true) => AnalysisMode::Reviewer,
            _ => AnalysisMode::Both,
        }
    }

    pub fn includes_author(&self) -> bool {
        matches!(self, AnalysisMode::Author | AnalysisMode::Both)
    }

    pub fn includes_reviewer(&self) -> bool {
        matches!(self, AnalysisMode::Reviewer | AnalysisMode::Both)
    }
}

/// Analyzer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Unchanged lines on either side of a change credited as context.
    pub context_lines: usize,
    /// Worker threads; `None` uses the number of cores.
    pub workers: Option<usize>,
    /// Exact paths left out of the analysis.
    pub ignore_files: Vec<String>,
    /// Directories whose contents are left out of the analysis.
    pub ignore_folders: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            context_lines: 3,
            workers: None,
            ignore_files: Vec::new(),
            ignore_folders: Vec::new(),
        }
    }
}

impl AnalyzerConfig {
    /// Whether `path` is excluded by the ignore rules.
    pub fn is_ignored(&self, path: &str) -> bool {
        if self.ignore_files.iter().any(|file| file == path) {
            return true;
        }
        self.ignore_folders.iter().any(|folder| {
            let folder = folder.trim_end_matches('/');
            !folder.is_empty()
                && path.starts_with(folder)
                && path[folder.len()..].starts_with('/')
        })
    }
}

/// Cooperative cancellation, checked between files.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every run sharing this token to stop before its next file.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of one file's pipeline.
struct FileOutcome {
    stats: ContributionStats,
    cache: BlameCache,
}

/// Maps the edit scripts of a merge onto blame and aggregates per author.
pub struct AttributionAnalyzer {
    gateway: Arc<dyn VersionControlGateway>,
    diff: DiffEngine,
    config: AnalyzerConfig,
    cancellation: CancellationToken,
}

impl AttributionAnalyzer {
    /// Create an analyzer from its collaborators.
    pub fn new(gateway: Arc<dyn VersionControlGateway>, diff: DiffEngine, config: AnalyzerConfig) -> Self {
        Self {
            gateway,
            diff,
            config,
            cancellation: CancellationToken::new(),
        }
    }

    /// Use `token` to stop runs early.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Files changed between two revisions, minus ignored paths.
    pub fn changed_files(&self, source: &str, target: &str) -> Result<Vec<String>> {
        let source = self.gateway.resolve_revision(source)?;
        let target = self.gateway.resolve_revision(target)?;

        let files = self.gateway.list_changed_files(&source, &target)?;
        Ok(files
            .into_iter()
            .filter(|path| !self.config.is_ignored(path))
            .collect())
    }

    /// List the changed files and analyze them.
    pub fn analyze_changes(&self, source: &str, target: &str, mode: AnalysisMode) -> Result<ContributionStats> {
        let files = self.changed_files(source, target)?;
        self.analyze(source, target, &files, mode)
    }

    /// Attribute the changes from `source` to `target` in `changed_files`.
    ///
    /// Fails with `InvalidRevision` if either revision cannot be resolved and
    /// with `Cancelled` if the token fires; any failure confined to one file
    /// only drops that file, which is then listed in
    /// [`ContributionStats::skipped`].
    pub fn analyze(
        &self,
        source: &str,
        target: &str,
        changed_files: &[String],
        mode: AnalysisMode,
    ) -> Result<ContributionStats> {
        let source = self.gateway.resolve_revision(source)?;
        let target = self.gateway.resolve_revision(target)?;

        let mut paths: Vec<&str> = changed_files
            .iter()
            .map(String::as_str)
            .filter(|path| !self.config.is_ignored(path))
            .collect();
        paths.sort_unstable();
        paths.dedup();

        info!(
            source = %source,
            target = %target,
            files = paths.len(),
            ?mode,
            "Analyzing changes"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers.unwrap_or(0))
            .build()
            .map_err(|e| Error::Other(e.into()))?;

        let outcomes: Vec<FileOutcome> = pool.install(|| {
            paths
                .par_iter()
                .map(|path| {
                    if self.cancellation.is_cancelled() {
                        return Err(Error::Cancelled);
                    }
                    self.analyze_file(&source, &target, path, mode)
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let mut cache = BlameCache::new();
        let mut partials = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            partials.push(outcome.stats);
            cache.merge(outcome.cache);
        }
        let mut stats = ContributionStats::merge_all(partials);

        if mode.includes_reviewer() {
            if let Some(tree) = cache.tree(&source) {
                for (author, lines) in tree.line_owners() {
                    stats.record_owned(&author, lines);
                }
            }
        }

        info!(
            analyzed = stats.files_analyzed(),
            skipped = stats.skipped().len(),
            authors = stats.ranking().len(),
            "Analysis complete"
        );

        Ok(stats)
    }

    /// Run one file's pipeline. Failures confined to the file become a skip;
    /// anything else ends the run.
    fn analyze_file(
        &self,
        source: &Revision,
        target: &Revision,
        path: &str,
        mode: AnalysisMode,
    ) -> Result<FileOutcome> {
        let mut blame = BlameBuilder::new(self.gateway.as_ref());

        match self.attribute(&mut blame, source, target, path, mode) {
            Ok(stats) => Ok(FileOutcome {
                stats,
                cache: blame.into_cache(),
            }),
            Err(err) if err.is_file_local() => {
                warn!(path, "Skipping file: {}", err);
                let mut stats = ContributionStats::new();
                stats.mark_skipped(path, err.to_string());
                Ok(FileOutcome {
                    stats,
                    cache: BlameCache::new(),
                })
            }
            Err(err) => Err(err),
        }
    }

    fn attribute(
        &self,
        blame: &mut BlameBuilder<'_>,
        source: &Revision,
        target: &Revision,
        path: &str,
        mode: AnalysisMode,
    ) -> Result<ContributionStats> {
        let before = self.gateway.read_file_at(source, path)?;
        let after = self.gateway.read_file_at(target, path)?;

        let script = self.diff.compute_edit_script(before.lines(), after.lines());
        debug!(
            path,
            deletions = script.deletions(),
            insertions = script.insertions(),
            replaced = script.is_replaced(),
            "Diffed"
        );

        if script.deletions() > 0 || mode.includes_reviewer() {
            blame.build_blame_covering(source, path, before.len())?;
        }
        if script.insertions() > 0 {
            blame.build_blame_covering(target, path, after.len())?;
        }
        let source_blame = blame.cache().get(source, path);
        let target_blame = blame.cache().get(target, path);

        let context = if mode.includes_reviewer() {
            context_mask(&script, self.config.context_lines)
        } else {
            vec![false; script.len()]
        };

        let mut stats = ContributionStats::new();
        for (op, is_context) in script.iter().zip(context) {
            match *op {
                EditOp::Delete { source: i } => stats.record_removed(author_at(source_blame, i, path)?),
                EditOp::Insert { target: j } => stats.record_added(author_at(target_blame, j, path)?),
                EditOp::Keep { source: i, .. } if is_context => {
                    stats.record_context(author_at(source_blame, i, path)?)
                }
                EditOp::Keep { .. } => {}
            }
        }
        stats.mark_analyzed(path, script.is_replaced());

        Ok(stats)
    }
}

/// Author of the 0-based `line` in `index`.
fn author_at<'a>(index: Option<&'a BlameIndex>, line: usize, path: &str) -> Result<&'a str> {
    index
        .and_then(|index| index.line(line + 1))
        .map(|entry| entry.author.as_str())
        .ok_or_else(|| Error::IncompleteBlame {
            path: path.to_string(),
            blamed: index.map_or(0, BlameIndex::len),
            lines: line + 1,
        })
}

/// Mark the `Keep` operations within `radius` kept lines of a change.
fn context_mask(script: &EditScript, radius: usize) -> Vec<bool> {
    let ops = script.ops();
    let mut mask = vec![false; ops.len()];
    if radius == 0 {
        return mask;
    }

    let mut mark = |positions: &mut dyn Iterator<Item = usize>| {
        let mut since_change: Option<usize> = None;
        for pos in positions {
            if ops[pos].is_change() {
                since_change = Some(0);
            } else if let Some(kept) = since_change.as_mut() {
                *kept += 1;
                if *kept <= radius {
                    mask[pos] = true;
                }
            }
        }
    };
    mark(&mut (0..ops.len()));
    mark(&mut (0..ops.len()).rev());

    mask
}
