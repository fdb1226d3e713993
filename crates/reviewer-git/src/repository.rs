//! Git repository wrapper.

use crate::commit::CommitInfo;
use git2::{ErrorCode, ObjectType, Oid, Repository};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    #[error("Invalid revision: {0}")]
    InvalidRevision(String),

    #[error("{path} does not exist at {revision}")]
    MissingPath { revision: String, path: String },
}

/// Result type for git operations.
pub type Result<T> = std::result::Result<T, GitError>;

impl From<GitError> for reviewer_core::Error {
    fn from(err: GitError) -> Self {
        let message = err.to_string();
        match err {
            GitError::InvalidRevision(name) => reviewer_core::Error::InvalidRevision(name),
            GitError::MissingPath { .. } => reviewer_core::Error::NotFound(message),
            GitError::Git(inner) if inner.code() == ErrorCode::NotFound => {
                reviewer_core::Error::NotFound(inner.message().to_string())
            }
            _ => reviewer_core::Error::Gateway(message),
        }
    }
}

/// Wrapper around a git repository.
pub struct GitRepository {
    repo: Repository,
    path: PathBuf,
}

impl GitRepository {
    /// Open the repository containing `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let repo = Repository::discover(&path).map_err(|e| match e.code() {
            ErrorCode::NotFound => GitError::NotARepository(path.clone()),
            _ => GitError::Git(e),
        })?;

        Ok(Self { repo, path })
    }

    /// Get the repository root path.
    pub fn root(&self) -> PathBuf {
        self.repo
            .workdir()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| self.path.clone())
    }

    /// Resolve a branch, tag, commit id or revspec such as `HEAD~1`.
    pub fn resolve(&self, revspec: &str) -> Result<CommitInfo> {
        let commit = self
            .repo
            .revparse_single(revspec)
            .and_then(|object| object.peel_to_commit())
            .map_err(|_| GitError::InvalidRevision(revspec.to_string()))?;
        Ok(CommitInfo::from_commit(&commit))
    }

    /// Look up a commit by its full id.
    pub fn find_commit(&self, id: &str) -> Result<git2::Commit<'_>> {
        let oid = Oid::from_str(id).map_err(|_| GitError::InvalidRevision(id.to_string()))?;
        self.repo
            .find_commit(oid)
            .map_err(|_| GitError::InvalidRevision(id.to_string()))
    }

    /// Whether `path` names a regular file at commit `id`.
    pub fn has_file(&self, id: &str, path: &str) -> Result<bool> {
        let tree = self.find_commit(id)?.tree()?;
        match tree.get_path(Path::new(path)) {
            Ok(entry) => Ok(entry.kind() == Some(ObjectType::Blob)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Contents of `path` at commit `id`. Invalid UTF-8 is replaced.
    pub fn read_file(&self, id: &str, path: &str) -> Result<String> {
        let tree = self.find_commit(id)?.tree()?;
        let missing = || GitError::MissingPath {
            revision: id.to_string(),
            path: path.to_string(),
        };

        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Err(missing()),
            Err(e) => return Err(e.into()),
        };
        if entry.kind() != Some(ObjectType::Blob) {
            return Err(missing());
        }

        let blob = self.repo.find_blob(entry.id())?;
        Ok(String::from_utf8_lossy(blob.content()).into_owned())
    }

    /// Paths that differ between two commits, on either side of the diff.
    pub fn changed_files(&self, old_id: &str, new_id: &str) -> Result<Vec<String>> {
        let old_tree = self.find_commit(old_id)?.tree()?;
        let new_tree = self.find_commit(new_id)?.tree()?;
        let diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), None)?;

        let mut paths = BTreeSet::new();
        for delta in diff.deltas() {
            for file in [delta.old_file(), delta.new_file()] {
                if let Some(path) = file.path().and_then(|p| p.to_str()) {
                    paths.insert(path.to_string());
                }
            }
        }

        Ok(paths.into_iter().collect())
    }

    /// Get the underlying git2 repository.
    pub fn inner(&self) -> &Repository {
        &self.repo
    }
}
