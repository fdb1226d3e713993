//! Hierarchical container of blame indices keyed by file path.

use super::index::BlameIndex;
use std::collections::BTreeMap;

/// Blame indices organised as a directory tree.
///
/// Entries are added one at a time as files are analysed; nothing is
/// populated up front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlameTree {
    root: DirNode,
    len: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct DirNode {
    dirs: BTreeMap<String, DirNode>,
    files: BTreeMap<String, BlameIndex>,
}

/// Split a `/`-separated path into its directories and file name.
fn components(path: &str) -> (Vec<&str>, &str) {
    let mut parts: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
    let file = parts.pop().unwrap_or("");
    (parts, file)
}

impl BlameTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the blame for `path`, returning the index it replaced.
    pub fn insert(&mut self, path: &str, index: BlameIndex) -> Option<BlameIndex> {
        let (dirs, file) = components(path);
        let mut node = &mut self.root;
        for dir in dirs {
            node = node.dirs.entry(dir.to_string()).or_default();
        }

        let previous = node.files.insert(file.to_string(), index);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Blame for `path`, if it has been built.
    pub fn lookup(&self, path: &str) -> Option<&BlameIndex> {
        let (dirs, file) = components(path);
        let mut node = &self.root;
        for dir in dirs {
            node = node.dirs.get(dir)?;
        }
        node.files.get(file)
    }

    /// Whether `path` has an entry.
    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// Every `(path, index)` pair, ordered by path.
    pub fn all_entries(&self) -> Vec<(String, &BlameIndex)> {
        let mut entries = Vec::with_capacity(self.len);
        self.root.collect("", &mut entries);
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Consume the tree, yielding owned entries ordered by path.
    pub fn into_entries(self) -> Vec<(String, BlameIndex)> {
        let mut entries = Vec::with_capacity(self.len);
        self.root.drain("", &mut entries);
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Move every entry of `other` into this tree. Entries from `other` win.
    pub fn merge(&mut self, other: BlameTree) {
        for (path, index) in other.into_entries() {
            self.insert(&path, index);
        }
    }

    /// Number of lines each author owns across all entries.
    pub fn line_owners(&self) -> BTreeMap<String, u64> {
        let mut owners = BTreeMap::new();
        for (_, index) in self.all_entries() {
            for (_, entry) in index.iter() {
                *owners.entry(entry.author.clone()).or_insert(0) += 1;
            }
        }
        owners
    }

    /// Number of files in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

impl DirNode {
    fn collect<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a BlameIndex)>) {
        for (name, index) in &self.files {
            out.push((join(prefix, name), index));
        }
        for (name, dir) in &self.dirs {
            dir.collect(&join(prefix, name), out);
        }
    }

    fn drain(self, prefix: &str, out: &mut Vec<(String, BlameIndex)>) {
        for (name, index) in self.files {
            out.push((join(prefix, &name), index));
        }
        for (name, dir) in self.dirs {
            dir.drain(&join(prefix, &name), out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::TestFixtures;

    fn index(authors: &[&str]) -> BlameIndex {
        TestFixtures::blame_index(authors)
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut tree = BlameTree::new();
        assert!(tree.insert("src/lib.rs", index(&["alice"])).is_none());
        tree.insert("src/blame/tree.rs", index(&["bob", "bob"]));
        tree.insert("README.md", index(&["carol"]));

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.lookup("src/blame/tree.rs").unwrap().len(), 2);
        assert!(tree.lookup("src/blame").is_none());
        assert!(tree.lookup("src/missing.rs").is_none());
        assert!(tree.contains("README.md"));
    }

    #[test]
    fn test_replacing_keeps_count() {
        let mut tree = BlameTree::new();
        tree.insert("a.txt", index(&["alice"]));
        let previous = tree.insert("a.txt", index(&["bob"]));

        assert_eq!(previous, Some(index(&["alice"])));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.lookup("a.txt").unwrap().line(1).unwrap().author, "bob");
    }

    #[test]
    fn test_all_entries_sorted_by_path() {
        let mut tree = BlameTree::new();
        tree.insert("src/z.rs", index(&["a"]));
        tree.insert("b.rs", index(&["a"]));
        tree.insert("src/a/b.rs", index(&["a"]));
        tree.insert("src/a.rs", index(&["a"]));

        let paths: Vec<String> = tree.all_entries().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["b.rs", "src/a.rs", "src/a/b.rs", "src/z.rs"]);
    }

    #[test]
    fn test_merge_and_owners() {
        let mut left = BlameTree::new();
        left.insert("src/a.rs", index(&["alice", "bob"]));

        let mut right = BlameTree::new();
        right.insert("src/b.rs", index(&["alice"]));

        left.merge(right);

        assert_eq!(left.len(), 2);
        let owners = left.line_owners();
        assert_eq!(owners.get("alice"), Some(&2));
        assert_eq!(owners.get("bob"), Some(&1));
    }
}
