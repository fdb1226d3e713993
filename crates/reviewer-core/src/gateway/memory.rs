//! In-memory gateway for tests and embedding.

use super::{ParentPolicy, VersionControlGateway};
use crate::blame::BlameEntry;
use crate::error::{Error, Result};
use crate::revision::{FileSnapshot, Revision};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
struct StoredFile {
    lines: Vec<String>,
    blame: Vec<BlameEntry>,
    /// Set when the all-parents blame is ambiguous; holds the first-parent answer.
    first_parent: Option<Vec<BlameEntry>>,
}

/// A repository held entirely in memory.
///
/// Revisions are plain ids registered under one or more names; files are
/// stored per revision id together with their blame.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    names: HashMap<String, String>,
    files: HashMap<(String, String), StoredFile>,
    blame_calls: AtomicUsize,
    read_calls: AtomicUsize,
}

impl InMemoryGateway {
    /// Create an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` as resolving to revision `id`. Ids always resolve to themselves.
    pub fn with_revision(mut self, name: &str, id: &str) -> Self {
        self.names.insert(name.to_string(), id.to_string());
        self.names.insert(id.to_string(), id.to_string());
        self
    }

    /// Store a file whose lines are each blamed to the paired author.
    ///
    /// Every line gets commit `revision` and the Unix epoch as timestamp.
    pub fn with_file(self, revision: &str, path: &str, lines: &[(&str, &str)]) -> Self {
        let when = DateTime::<Utc>::default();
        let (content, blame): (Vec<String>, Vec<BlameEntry>) = lines
            .iter()
            .map(|(line, author)| (line.to_string(), BlameEntry::new(*author, revision, when)))
            .unzip();
        self.with_blamed_file(revision, path, content, blame)
    }

    /// Store a file with explicit lines and blame. The two need not agree in length.
    pub fn with_blamed_file(
        mut self,
        revision: &str,
        path: &str,
        lines: Vec<String>,
        blame: Vec<BlameEntry>,
    ) -> Self {
        self.names.insert(revision.to_string(), revision.to_string());
        self.files.insert(
            (revision.to_string(), path.to_string()),
            StoredFile {
                lines,
                blame,
                first_parent: None,
            },
        );
        self
    }

    /// Make the all-parents blame of a stored file ambiguous.
    ///
    /// `first_parent` is what blame returns once restricted to first parents.
    pub fn with_ambiguous_blame(
        mut self,
        revision: &str,
        path: &str,
        first_parent: Vec<BlameEntry>,
    ) -> Self {
        if let Some(file) = self
            .files
            .get_mut(&(revision.to_string(), path.to_string()))
        {
            file.first_parent = Some(first_parent);
        }
        self
    }

    /// How many times blame has been queried.
    pub fn blame_calls(&self) -> usize {
        self.blame_calls.load(Ordering::Relaxed)
    }

    /// How many times file content has been read.
    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::Relaxed)
    }

    fn file(&self, revision: &Revision, path: &str) -> Result<&StoredFile> {
        self.files
            .get(&(revision.id.clone(), path.to_string()))
            .ok_or_else(|| Error::NotFound(format!("{} at {}", path, revision)))
    }

    fn paths_at(&self, revision: &Revision) -> impl Iterator<Item = &String> {
        let id = revision.id.clone();
        self.files
            .keys()
            .filter(move |(rev, _)| *rev == id)
            .map(|(_, path)| path)
    }
}

impl VersionControlGateway for InMemoryGateway {
    fn list_changed_files(&self, source: &Revision, target: &Revision) -> Result<Vec<String>> {
        let candidates: BTreeSet<&String> = self.paths_at(source).chain(self.paths_at(target)).collect();

        let changed = candidates
            .into_iter()
            .filter(|path| {
                let before = self.file(source, path).ok().map(|f| &f.lines);
                let after = self.file(target, path).ok().map(|f| &f.lines);
                before != after
            })
            .cloned()
            .collect();

        Ok(changed)
    }

    fn read_file_at(&self, revision: &Revision, path: &str) -> Result<FileSnapshot> {
        self.read_calls.fetch_add(1, Ordering::Relaxed);
        let file = self.file(revision, path)?;
        Ok(FileSnapshot::new(file.lines.clone()))
    }

    fn blame_file_at(
        &self,
        revision: &Revision,
        path: &str,
        policy: ParentPolicy,
    ) -> Result<Vec<BlameEntry>> {
        self.blame_calls.fetch_add(1, Ordering::Relaxed);
        let file = self.file(revision, path)?;

        match (&file.first_parent, policy) {
            (None, _) => Ok(file.blame.clone()),
            (Some(_), ParentPolicy::AllParents) => Err(Error::Ambiguous {
                revision: revision.to_string(),
                path: path.to_string(),
            }),
            (Some(first_parent), ParentPolicy::FirstParent) => Ok(first_parent.clone()),
        }
    }

    fn resolve_revision(&self, name: &str) -> Result<Revision> {
        self.names
            .get(name)
            .map(|id| Revision::new(name, id.as_str()))
            .ok_or_else(|| Error::InvalidRevision(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> InMemoryGateway {
        InMemoryGateway::new()
            .with_revision("main", "c1")
            .with_revision("feature", "c2")
            .with_file("c1", "same.txt", &[("x", "alice")])
            .with_file("c2", "same.txt", &[("x", "alice")])
            .with_file("c1", "changed.txt", &[("a", "alice")])
            .with_file("c2", "changed.txt", &[("b", "bob")])
            .with_file("c2", "added.txt", &[("new", "bob")])
    }

    #[test]
    fn test_resolve_revision() {
        let gateway = gateway();
        let main = gateway.resolve_revision("main").unwrap();
        assert_eq!(main.id, "c1");
        assert_eq!(gateway.resolve_revision("c1").unwrap(), main);
        assert!(matches!(
            gateway.resolve_revision("nope"),
            Err(Error::InvalidRevision(_))
        ));
    }

    #[test]
    fn test_list_changed_files() {
        let gateway = gateway();
        let source = gateway.resolve_revision("main").unwrap();
        let target = gateway.resolve_revision("feature").unwrap();

        let changed = gateway.list_changed_files(&source, &target).unwrap();
        assert_eq!(changed, vec!["added.txt", "changed.txt"]);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let gateway = gateway();
        let source = gateway.resolve_revision("main").unwrap();
        assert!(matches!(
            gateway.read_file_at(&source, "added.txt"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_missing_file_at_non_ascii_revision() {
        let gateway = InMemoryGateway::new().with_revision("main", "révisé1");
        let revision = gateway.resolve_revision("main").unwrap();

        let err = gateway.read_file_at(&revision, "missing.txt").unwrap_err();
        assert!(matches!(&err, Error::NotFound(msg) if msg.contains("révisé1")));
    }

    #[test]
    fn test_ambiguous_blame_needs_first_parent() {
        let when = DateTime::<Utc>::default();
        let gateway = gateway().with_ambiguous_blame(
            "c1",
            "changed.txt",
            vec![BlameEntry::new("carol", "m1", when)],
        );
        let source = gateway.resolve_revision("main").unwrap();

        assert!(matches!(
            gateway.blame_file_at(&source, "changed.txt", ParentPolicy::AllParents),
            Err(Error::Ambiguous { .. })
        ));
        let blame = gateway
            .blame_file_at(&source, "changed.txt", ParentPolicy::FirstParent)
            .unwrap();
        assert_eq!(blame[0].author, "carol");
        assert_eq!(gateway.blame_calls(), 2);
    }
}
