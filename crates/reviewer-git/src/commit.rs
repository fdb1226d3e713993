//! Commit information structures.

use chrono::{DateTime, TimeZone, Utc};
use git2::Commit;
use reviewer_core::Revision;

/// Information about a git commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Full commit hash (40 hex characters).
    pub hash: String,
}

impl CommitInfo {
    /// Create from a git2 commit.
    pub fn from_commit(commit: &Commit) -> Self {
        Self {
            hash: commit.id().to_string(),
        }
    }

    /// The revision this commit resolves `name` to.
    pub fn to_revision(&self, name: &str) -> Revision {
        Revision::new(name, self.hash.clone())
    }
}

/// Convert a git timestamp to UTC.
pub(crate) fn timestamp(time: git2::Time) -> DateTime<Utc> {
    Utc.timestamp_opt(time.seconds(), 0)
        .single()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_revision_keeps_name() {
        let info = CommitInfo {
            hash: "0123456789abcdef0123456789abcdef01234567".to_string(),
        };
        let revision = info.to_revision("main");

        assert_eq!(revision.name, "main");
        assert_eq!(revision.id, info.hash);
    }

    #[test]
    fn test_timestamp() {
        let when = timestamp(git2::Time::new(1_700_000_000, 0));
        assert_eq!(when.timestamp(), 1_700_000_000);
    }
}
