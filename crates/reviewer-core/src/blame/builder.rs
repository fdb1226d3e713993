//! Cached blame lookups.

use super::index::BlameIndex;
use super::tree::BlameTree;
use crate::error::{Error, Result};
use crate::gateway::{ParentPolicy, VersionControlGateway};
use crate::revision::Revision;
use std::collections::HashMap;
use tracing::debug;

/// Blame indices already built, one [`BlameTree`] per revision.
///
/// Scoped to a single analysis run. Shards built for disjoint sets of paths
/// are combined with [`BlameCache::merge`].
#[derive(Debug, Clone, Default)]
pub struct BlameCache {
    trees: HashMap<Revision, BlameTree>,
}

impl BlameCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached blame for `(revision, path)`.
    pub fn get(&self, revision: &Revision, path: &str) -> Option<&BlameIndex> {
        self.trees.get(revision)?.lookup(path)
    }

    /// Store the blame for `(revision, path)`.
    pub fn insert(&mut self, revision: &Revision, path: &str, index: BlameIndex) {
        self.trees
            .entry(revision.clone())
            .or_default()
            .insert(path, index);
    }

    /// All blame built for one revision.
    pub fn tree(&self, revision: &Revision) -> Option<&BlameTree> {
        self.trees.get(revision)
    }

    /// Move the contents of another cache into this one.
    pub fn merge(&mut self, other: BlameCache) {
        for (revision, tree) in other.trees {
            self.trees.entry(revision).or_default().merge(tree);
        }
    }

    /// Number of cached `(revision, path)` entries.
    pub fn len(&self) -> usize {
        self.trees.values().map(BlameTree::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds blame indices through a gateway, caching per `(revision, path)`.
pub struct BlameBuilder<'g> {
    gateway: &'g dyn VersionControlGateway,
    cache: BlameCache,
}

impl<'g> BlameBuilder<'g> {
    /// Create a builder with an empty cache.
    pub fn new(gateway: &'g dyn VersionControlGateway) -> Self {
        Self::with_cache(gateway, BlameCache::new())
    }

    /// Create a builder that continues from an existing cache.
    pub fn with_cache(gateway: &'g dyn VersionControlGateway, cache: BlameCache) -> Self {
        Self { gateway, cache }
    }

    /// Blame for `path` at `revision`.
    ///
    /// The gateway is queried at most once per key. Merge commits the gateway
    /// cannot attribute are resolved through their first parent.
    pub fn build_blame(&mut self, revision: &Revision, path: &str) -> Result<&BlameIndex> {
        if self.cache.get(revision, path).is_none() {
            let index = BlameIndex::new(self.query(revision, path)?);
            self.cache.insert(revision, path, index);
        }

        self.cache
            .get(revision, path)
            .ok_or_else(|| Error::NotFound(format!("{} at {}", path, revision)))
    }

    /// Like [`build_blame`](Self::build_blame), but the index must cover
    /// exactly `line_count` lines.
    pub fn build_blame_covering(
        &mut self,
        revision: &Revision,
        path: &str,
        line_count: usize,
    ) -> Result<&BlameIndex> {
        let index = self.build_blame(revision, path)?;
        index.ensure_covers(path, line_count)?;
        Ok(index)
    }

    /// The cache built so far.
    pub fn cache(&self) -> &BlameCache {
        &self.cache
    }

    /// Give up the builder, keeping its cache.
    pub fn into_cache(self) -> BlameCache {
        self.cache
    }

    fn query(&self, revision: &Revision, path: &str) -> Result<Vec<super::BlameEntry>> {
        match self
            .gateway
            .blame_file_at(revision, path, ParentPolicy::AllParents)
        {
            Err(Error::Ambiguous { .. }) => {
                debug!(path, revision = %revision, "Ambiguous blame, following first parent");
                self.gateway
                    .blame_file_at(revision, path, ParentPolicy::FirstParent)
            }
            other => other,
        }
    }
}
