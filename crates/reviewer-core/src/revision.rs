//! Revisions and file snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A resolved repository snapshot (branch tip, tag or commit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
    /// Name as given by the user (e.g. `main`, `HEAD~2`).
    pub name: String,
    /// Resolved commit id.
    pub id: String,
}

impl Revision {
    /// Create a revision from a user-facing name and its resolved id.
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }

    /// Short form of the resolved id.
    pub fn short_id(&self) -> &str {
        self.id
            .char_indices()
            .nth(7)
            .map_or(&self.id[..], |(end, _)| &self.id[..end])
    }
}

// Two names that resolve to the same commit are the same snapshot.
impl PartialEq for Revision {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Revision {}

impl Hash for Revision {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.id {
            write!(f, "{}", self.short_id())
        } else {
            write!(f, "{} ({})", self.name, self.short_id())
        }
    }
}

/// Ordered lines of one file at one revision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSnapshot {
    lines: Vec<String>,
}

impl FileSnapshot {
    /// Create a snapshot from already split lines.
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Split file content into lines. A trailing newline does not start a new line.
    pub fn from_content(content: &str) -> Self {
        Self {
            lines: content.lines().map(String::from).collect(),
        }
    }

    /// The lines of the file.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the file has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
