//! Test utilities for git-reviewer.
//!
//! Provides reusable fixtures for blame and line data.

use crate::blame::{BlameEntry, BlameIndex};
use chrono::{TimeZone, Utc};

/// Test fixtures for blame data.
pub struct TestFixtures;

impl TestFixtures {
    /// A blame entry for `author` at a fixed commit and time.
    pub fn blame_entry(author: &str) -> BlameEntry {
        let when = Utc
            .timestamp_opt(1_700_000_000, 0)
            .single()
            .expect("valid timestamp");
        BlameEntry::new(author, "c0ffee0", when)
    }

    /// A blame index with one line per author, in order.
    pub fn blame_index(authors: &[&str]) -> BlameIndex {
        BlameIndex::new(authors.iter().map(|a| Self::blame_entry(a)).collect())
    }
}

/// Owned lines from string literals.
pub fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blame_index_fixture() {
        let index = TestFixtures::blame_index(&["alice", "bob"]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.line(2).unwrap().author, "bob");
    }

    #[test]
    fn test_lines() {
        assert_eq!(lines(&["a", "b"]), vec!["a".to_string(), "b".to_string()]);
    }
}
