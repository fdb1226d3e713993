//! git-reviewer Core Library
//!
//! Diff-and-blame attribution engine: minimal line-level edit scripts, cached
//! per-line blame, and per-author contribution statistics for a proposed merge.

pub mod analyzer;
pub mod blame;
pub mod config;
pub mod diff;
pub mod error;
pub mod gateway;
pub mod revision;
pub mod stats;

#[cfg(test)]
pub mod testutils;

pub use analyzer::{AnalysisMode, AnalyzerConfig, AttributionAnalyzer, CancellationToken};
pub use blame::{BlameBuilder, BlameCache, BlameEntry, BlameIndex, BlameTree};
pub use config::ReviewerConfig;
pub use diff::{DiffEngine, EditOp, EditScript};
pub use error::{Error, Result};
pub use gateway::{InMemoryGateway, ParentPolicy, VersionControlGateway};
pub use revision::{FileSnapshot, Revision};
pub use stats::{AuthorStats, ContributionStats, RankedAuthor, ScoreWeights, SkippedFile};
