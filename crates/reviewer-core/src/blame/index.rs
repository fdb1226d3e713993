//! Per-line attribution for one file at one revision.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who last touched a line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlameEntry {
    /// Author identity, `Name <email>` or just the name.
    pub author: String,
    /// Commit that last modified the line.
    pub commit: String,
    /// When the line was last modified.
    pub timestamp: DateTime<Utc>,
}

impl BlameEntry {
    /// Create a new blame entry.
    pub fn new(author: impl Into<String>, commit: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            author: author.into(),
            commit: commit.into(),
            timestamp,
        }
    }

    /// Build the author identity from a name and an optional email.
    pub fn identity(name: &str, email: &str) -> String {
        if email.is_empty() {
            name.to_string()
        } else {
            format!("{} <{}>", name, email)
        }
    }
}

/// Blame for every line of a file, addressed by 1-based line number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlameIndex {
    entries: Vec<BlameEntry>,
}

impl BlameIndex {
    /// Build an index from gateway output, where element `i` blames line `i + 1`.
    pub fn new(entries: Vec<BlameEntry>) -> Self {
        Self { entries }
    }

    /// Check that the index covers exactly `line_count` lines.
    pub fn ensure_covers(&self, path: &str, line_count: usize) -> Result<()> {
        if self.entries.len() != line_count {
            return Err(Error::IncompleteBlame {
                path: path.to_string(),
                blamed: self.entries.len(),
                lines: line_count,
            });
        }
        Ok(())
    }

    /// Blame for a 1-based line number.
    pub fn line(&self, line: usize) -> Option<&BlameEntry> {
        line.checked_sub(1).and_then(|idx| self.entries.get(idx))
    }

    /// Number of attributed lines.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(line number, entry)` pairs in line order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BlameEntry)> {
        self.entries.iter().enumerate().map(|(idx, entry)| (idx + 1, entry))
    }
}
