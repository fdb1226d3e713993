//! Version control abstraction.
//!
//! The attribution engine only talks to version control through the
//! [`VersionControlGateway`] trait, so backends (git2, an in-memory
//! fixture) can be swapped without touching the analysis.

mod memory;

pub use memory::InMemoryGateway;

use crate::blame::BlameEntry;
use crate::revision::{FileSnapshot, Revision};
use crate::Result;

/// How blame treats merge commits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ParentPolicy {
    /// Follow every parent; a backend may report the result as ambiguous.
    #[default]
    AllParents,
    /// Only follow the first parent of merges, which is always deterministic.
    FirstParent,
}

/// Read access to a version-controlled repository.
pub trait VersionControlGateway: Send + Sync {
    /// Paths that differ between two revisions, sorted and deduplicated.
    fn list_changed_files(&self, source: &Revision, target: &Revision) -> Result<Vec<String>>;

    /// Content of `path` at `revision`. Fails with `NotFound` if it does not exist there.
    fn read_file_at(&self, revision: &Revision, path: &str) -> Result<FileSnapshot>;

    /// Per-line blame of `path` at `revision`; element `i` covers line `i + 1`.
    ///
    /// Fails with `NotFound` if the file does not exist, or `Ambiguous` if a
    /// line cannot be attributed under `policy`.
    fn blame_file_at(
        &self,
        revision: &Revision,
        path: &str,
        policy: ParentPolicy,
    ) -> Result<Vec<BlameEntry>>;

    /// Resolve a branch, tag or commit name. Fails with `InvalidRevision`.
    fn resolve_revision(&self, name: &str) -> Result<Revision>;
}
