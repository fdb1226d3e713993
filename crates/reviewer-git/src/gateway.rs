//! [`VersionControlGateway`] backed by a local git repository.

use crate::repository::{GitError, GitRepository};
use reviewer_core::{BlameEntry, FileSnapshot, ParentPolicy, Result, Revision, VersionControlGateway};
use std::path::{Path, PathBuf};

/// Git access for the attribution engine.
///
/// libgit2 handles cannot be shared across threads, so every call opens the
/// repository afresh. Opening is cheap next to a blame.
#[derive(Debug, Clone)]
pub struct GitGateway {
    root: PathBuf,
}

impl GitGateway {
    /// Open the repository containing `path`.
    pub fn open(path: impl AsRef<Path>) -> std::result::Result<Self, GitError> {
        let repo = GitRepository::open(path)?;
        Ok(Self { root: repo.root() })
    }

    /// Root of the working tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn repo(&self) -> Result<GitRepository> {
        Ok(GitRepository::open(&self.root)?)
    }
}

impl VersionControlGateway for GitGateway {
    fn list_changed_files(&self, source: &Revision, target: &Revision) -> Result<Vec<String>> {
        Ok(self.repo()?.changed_files(&source.id, &target.id)?)
    }

    fn read_file_at(&self, revision: &Revision, path: &str) -> Result<FileSnapshot> {
        let content = self.repo()?.read_file(&revision.id, path)?;
        Ok(FileSnapshot::from_content(&content))
    }

    fn blame_file_at(&self, revision: &Revision, path: &str, policy: ParentPolicy) -> Result<Vec<BlameEntry>> {
        Ok(self.repo()?.blame_at(&revision.id, path, policy)?)
    }

    fn resolve_revision(&self, name: &str) -> Result<Revision> {
        Ok(self.repo()?.resolve(name)?.to_revision(name))
    }
}
