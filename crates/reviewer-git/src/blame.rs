//! Git blame at an arbitrary commit.

use crate::commit::timestamp;
use crate::repository::{GitError, GitRepository, Result};
use git2::BlameOptions;
use reviewer_core::{BlameEntry, ParentPolicy};
use std::path::Path;
use tracing::debug;

impl GitRepository {
    /// Blame every line of `path` as of commit `id`.
    ///
    /// Hunks are expanded so that element `i` of the result describes line
    /// `i + 1`.
    pub fn blame_at(&self, id: &str, path: &str, policy: ParentPolicy) -> Result<Vec<BlameEntry>> {
        if !self.has_file(id, path)? {
            return Err(GitError::MissingPath {
                revision: id.to_string(),
                path: path.to_string(),
            });
        }

        let commit = self.find_commit(id)?;
        let mut opts = BlameOptions::new();
        opts.newest_commit(commit.id());
        if policy == ParentPolicy::FirstParent {
            opts.first_parent(true);
        }

        let blame = self.inner().blame_file(Path::new(path), Some(&mut opts))?;

        let mut hunks: Vec<_> = blame.iter().collect();
        hunks.sort_by_key(|hunk| hunk.final_start_line());

        let mut entries = Vec::new();
        for hunk in hunks {
            let sig = hunk.final_signature();
            let entry = BlameEntry::new(
                BlameEntry::identity(sig.name().unwrap_or("Unknown"), sig.email().unwrap_or("")),
                hunk.final_commit_id().to_string(),
                timestamp(sig.when()),
            );
            entries.extend(std::iter::repeat(entry).take(hunk.lines_in_hunk()));
        }

        debug!(path, commit = id, lines = entries.len(), ?policy, "Blamed");
        Ok(entries)
    }
}
