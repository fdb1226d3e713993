//! git-reviewer Git Integration
//!
//! Implements [`reviewer_core::VersionControlGateway`] on top of libgit2:
//! revision resolution, tree diffs, file content and per-line blame at any
//! commit.

pub mod blame;
pub mod commit;
pub mod gateway;
pub mod repository;

pub use commit::CommitInfo;
pub use gateway::GitGateway;
pub use repository::{GitError, GitRepository};
