//! Minimal line-level edit scripts.
//!
//! Implements Myers' shortest-edit-script search in its linear-space form:
//! the common prefix and suffix are stripped, then the remaining region is
//! split recursively at the "middle snake" found by searching forward from
//! the top-left and backward from the bottom-right corner of the edit graph
//! at the same time. This keeps the auxiliary space at O(N+M) while the time
//! stays O((N+M)·D).
//!
//! A configurable bound on D makes the search give up early on files that
//! were rewritten wholesale; those are reported as fully replaced instead.

use crate::error::Error;
use serde::Serialize;
use std::ops::{Index, IndexMut, Range};
use tracing::debug;

/// A single edit operation. Indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EditOp {
    /// Line `source` of the source equals line `target` of the target.
    Keep { source: usize, target: usize },
    /// Line `source` of the source is removed.
    Delete { source: usize },
    /// Line `target` of the target is added.
    Insert { target: usize },
}

impl EditOp {
    /// Whether this operation changes the file.
    pub fn is_change(&self) -> bool {
        !matches!(self, EditOp::Keep { .. })
    }
}

/// Ordered operations transforming a source sequence into a target sequence.
///
/// Reading the `Keep`/`Delete` operations in order visits every source line
/// exactly once; reading `Keep`/`Insert` visits every target line exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditScript {
    ops: Vec<EditOp>,
    replaced: bool,
}

impl EditScript {
    /// The coarse "file fully replaced" classification.
    pub fn replacement(source_len: usize, target_len: usize) -> Self {
        let ops = (0..source_len)
            .map(|source| EditOp::Delete { source })
            .chain((0..target_len).map(|target| EditOp::Insert { target }))
            .collect();
        Self {
            ops,
            replaced: true,
        }
    }

    /// The operations in order.
    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    /// Iterate over the operations.
    pub fn iter(&self) -> std::slice::Iter<'_, EditOp> {
        self.ops.iter()
    }

    /// True when the exact search was abandoned for the coarse classification.
    pub fn is_replaced(&self) -> bool {
        self.replaced
    }

    /// Number of deletions plus insertions.
    pub fn distance(&self) -> usize {
        self.ops.iter().filter(|op| op.is_change()).count()
    }

    /// Number of deleted source lines.
    pub fn deletions(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, EditOp::Delete { .. }))
            .count()
    }

    /// Number of inserted target lines.
    pub fn insertions(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, EditOp::Insert { .. }))
            .count()
    }

    /// True when the script keeps every line.
    pub fn is_identity(&self) -> bool {
        !self.ops.iter().any(EditOp::is_change)
    }

    /// Total number of operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether there are no operations at all (both sides empty).
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl<'a> IntoIterator for &'a EditScript {
    type Item = &'a EditOp;
    type IntoIter = std::slice::Iter<'a, EditOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

/// Computes minimal edit scripts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffEngine {
    max_edit_distance: Option<usize>,
}

impl DiffEngine {
    /// Create an engine with no bound on the edit distance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up on the exact search once the edit distance is known to exceed `limit`.
    pub fn with_max_edit_distance(mut self, limit: usize) -> Self {
        self.max_edit_distance = Some(limit);
        self
    }

    /// The configured bound, if any.
    pub fn max_edit_distance(&self) -> Option<usize> {
        self.max_edit_distance
    }

    /// Compute a minimal edit script from `source` to `target`.
    ///
    /// Within every run of consecutive changes, deletions are listed before
    /// insertions. If the configured bound is exceeded the result is
    /// [`EditScript::replacement`].
    pub fn compute_edit_script<T: PartialEq>(&self, source: &[T], target: &[T]) -> EditScript {
        match self.search(source, target) {
            Ok(ops) => EditScript {
                ops: deletions_first(ops),
                replaced: false,
            },
            Err(err) => {
                debug!(
                    source_lines = source.len(),
                    target_lines = target.len(),
                    "{}, classifying as fully replaced",
                    err
                );
                EditScript::replacement(source.len(), target.len())
            }
        }
    }

    fn search<T: PartialEq>(&self, source: &[T], target: &[T]) -> Result<Vec<EditOp>, Error> {
        let bound = max_d(source.len(), target.len());
        let mut search = Search {
            source,
            target,
            forward: V::new(bound),
            backward: V::new(bound),
            limit: self.max_edit_distance.unwrap_or(usize::MAX),
            ops: Vec::with_capacity(source.len().max(target.len())),
        };
        search.conquer(0..source.len(), 0..target.len())?;
        Ok(search.ops)
    }
}

/// Furthest-reaching x per diagonal k, indexed by signed k.
struct V {
    offset: isize,
    v: Vec<usize>,
}

impl V {
    fn new(max_d: usize) -> Self {
        Self {
            offset: max_d as isize,
            v: vec![0; 2 * max_d + 1],
        }
    }
}

impl Index<isize> for V {
    type Output = usize;

    fn index(&self, k: isize) -> &usize {
        &self.v[(k + self.offset) as usize]
    }
}

impl IndexMut<isize> for V {
    fn index_mut(&mut self, k: isize) -> &mut usize {
        &mut self.v[(k + self.offset) as usize]
    }
}

/// Upper bound on the number of search rounds for a region.
fn max_d(n: usize, m: usize) -> usize {
    (n + m + 1) / 2 + 1
}

struct Search<'a, T> {
    source: &'a [T],
    target: &'a [T],
    forward: V,
    backward: V,
    limit: usize,
    ops: Vec<EditOp>,
}

impl<T: PartialEq> Search<'_, T> {
    fn conquer(&mut self, mut old: Range<usize>, mut new: Range<usize>) -> Result<(), Error> {
        let prefix = self.common_prefix(old.clone(), new.clone());
        for offset in 0..prefix {
            self.ops.push(EditOp::Keep {
                source: old.start + offset,
                target: new.start + offset,
            });
        }
        old.start += prefix;
        new.start += prefix;

        let suffix = self.common_suffix(old.clone(), new.clone());
        old.end -= suffix;
        new.end -= suffix;

        if old.is_empty() || new.is_empty() {
            // Only one kind of edit is left, so the distance is known exactly.
            self.check_limit(old.len() + new.len())?;
            self.ops
                .extend(old.clone().map(|source| EditOp::Delete { source }));
            self.ops
                .extend(new.clone().map(|target| EditOp::Insert { target }));
        } else if let Some((x, y)) = self.middle_snake(old.clone(), new.clone())? {
            self.conquer(old.start..x, new.start..y)?;
            self.conquer(x..old.end, y..new.end)?;
        } else {
            self.ops
                .extend(old.clone().map(|source| EditOp::Delete { source }));
            self.ops
                .extend(new.clone().map(|target| EditOp::Insert { target }));
        }

        for offset in 0..suffix {
            self.ops.push(EditOp::Keep {
                source: old.end + offset,
                target: new.end + offset,
            });
        }

        Ok(())
    }

    /// Find a point on an optimal path that splits the region in two.
    ///
    /// Coordinates in the search are relative to the region; the returned
    /// split point is absolute.
    fn middle_snake(
        &mut self,
        old: Range<usize>,
        new: Range<usize>,
    ) -> Result<Option<(usize, usize)>, Error> {
        let n = old.len();
        let m = new.len();
        let delta = n as isize - m as isize;
        let odd = delta & 1 == 1;

        self.forward[1] = 0;
        self.backward[1] = 0;

        for d in 0..max_d(n, m) as isize {
            for k in (-d..=d).rev().step_by(2) {
                let mut x = if k == -d || (k != d && self.forward[k - 1] < self.forward[k + 1]) {
                    // came from k+1, an insertion
                    self.forward[k + 1]
                } else {
                    // came from k-1, a deletion
                    self.forward[k - 1] + 1
                };
                let y = (x as isize - k) as usize;
                let (x0, y0) = (x, y);

                if x < n && y < m {
                    x += self.common_prefix(old.start + x..old.end, new.start + y..new.end);
                }
                self.forward[k] = x;

                if odd
                    && (k - delta).abs() < d
                    && self.forward[k] + self.backward[delta - k] >= n
                {
                    self.check_limit((2 * d - 1) as usize)?;
                    return Ok(Some((old.start + x0, new.start + y0)));
                }
            }

            for k in (-d..=d).rev().step_by(2) {
                let mut x =
                    if k == -d || (k != d && self.backward[k - 1] < self.backward[k + 1]) {
                        self.backward[k + 1]
                    } else {
                        self.backward[k - 1] + 1
                    };
                let mut y = (x as isize - k) as usize;

                if x < n && y < m {
                    let advance = self.common_suffix(
                        old.start..old.start + n - x,
                        new.start..new.start + m - y,
                    );
                    x += advance;
                    y += advance;
                }
                self.backward[k] = x;

                if !odd
                    && (k - delta).abs() <= d
                    && self.backward[k] + self.forward[delta - k] >= n
                {
                    self.check_limit((2 * d) as usize)?;
                    return Ok(Some((old.start + n - x, new.start + m - y)));
                }
            }

            // Both frontiers advanced d steps without meeting, so D >= 2d + 1.
            self.check_limit((2 * d + 1) as usize)?;
        }

        Ok(None)
    }

    fn check_limit(&self, distance: usize) -> Result<(), Error> {
        if distance > self.limit {
            return Err(Error::MaxEditDistanceExceeded { limit: self.limit });
        }
        Ok(())
    }

    fn common_prefix(&self, old: Range<usize>, new: Range<usize>) -> usize {
        self.source[old]
            .iter()
            .zip(&self.target[new])
            .take_while(|(a, b)| a == b)
            .count()
    }

    fn common_suffix(&self, old: Range<usize>, new: Range<usize>) -> usize {
        self.source[old]
            .iter()
            .rev()
            .zip(self.target[new].iter().rev())
            .take_while(|(a, b)| a == b)
            .count()
    }
}

/// Reorder every run of consecutive changes so its deletions come first.
fn deletions_first(ops: Vec<EditOp>) -> Vec<EditOp> {
    let mut ordered = Vec::with_capacity(ops.len());
    let mut pending_inserts = Vec::new();

    for op in ops {
        match op {
            EditOp::Delete { .. } => ordered.push(op),
            EditOp::Insert { .. } => pending_inserts.push(op),
            EditOp::Keep { .. } => {
                ordered.append(&mut pending_inserts);
                ordered.push(op);
            }
        }
    }
    ordered.append(&mut pending_inserts);

    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use crate::testutils::lines;
    use rstest::{fixture, rstest};

    /// Rebuild both sides from a script, checking index order on the way.
    fn rebuild<T: Clone + PartialEq + std::fmt::Debug>(
        script: &EditScript,
        source: &[T],
        target: &[T],
    ) -> (Vec<T>, Vec<T>) {
        let mut next_source = 0;
        let mut next_target = 0;
        let mut rebuilt_source = Vec::new();
        let mut rebuilt_target = Vec::new();

        for op in script {
            match *op {
                EditOp::Keep { source: i, target: j } => {
                    assert_eq!((i, j), (next_source, next_target));
                    assert_eq!(source[i], target[j]);
                    rebuilt_source.push(source[i].clone());
                    rebuilt_target.push(source[i].clone());
                    next_source += 1;
                    next_target += 1;
                }
                EditOp::Delete { source: i } => {
                    assert_eq!(i, next_source);
                    rebuilt_source.push(source[i].clone());
                    next_source += 1;
                }
                EditOp::Insert { target: j } => {
                    assert_eq!(j, next_target);
                    rebuilt_target.push(target[j].clone());
                    next_target += 1;
                }
            }
        }

        (rebuilt_source, rebuilt_target)
    }

    /// Edit distance by longest common subsequence, O(N·M).
    fn brute_force_distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
        let mut table = vec![vec![0usize; b.len() + 1]; a.len() + 1];
        for i in (0..a.len()).rev() {
            for j in (0..b.len()).rev() {
                table[i][j] = if a[i] == b[j] {
                    table[i + 1][j + 1] + 1
                } else {
                    table[i + 1][j].max(table[i][j + 1])
                };
            }
        }
        a.len() + b.len() - 2 * table[0][0]
    }

    #[fixture]
    fn file_inputs() -> (Vec<String>, Vec<String>) {
        (
            lines(&["line1", "line2", "line3", "line4"]),
            lines(&["line2", "line3_modified", "line4", "line5"]),
        )
    }

    #[test]
    fn test_single_line_replacement() {
        let source = lines(&["a", "b", "c"]);
        let target = lines(&["a", "x", "c"]);

        let script = DiffEngine::new().compute_edit_script(&source, &target);

        assert_eq!(
            script.ops(),
            &[
                EditOp::Keep { source: 0, target: 0 },
                EditOp::Delete { source: 1 },
                EditOp::Insert { target: 1 },
                EditOp::Keep { source: 2, target: 2 },
            ]
        );
        assert!(!script.is_replaced());
    }

    #[rstest]
    fn test_diff_files(file_inputs: (Vec<String>, Vec<String>)) {
        let (a, b) = file_inputs;
        let script = DiffEngine::new().compute_edit_script(&a, &b);

        assert_eq!(
            script.ops(),
            &[
                EditOp::Delete { source: 0 },
                EditOp::Keep { source: 1, target: 0 },
                EditOp::Delete { source: 2 },
                EditOp::Insert { target: 1 },
                EditOp::Keep { source: 3, target: 2 },
                EditOp::Insert { target: 3 },
            ]
        );
    }

    #[test]
    fn test_diff_chars() {
        let a: Vec<char> = "abcabba".chars().collect();
        let b: Vec<char> = "cbabac".chars().collect();

        let script = DiffEngine::new().compute_edit_script(&a, &b);
        let (rebuilt_a, rebuilt_b) = rebuild(&script, &a, &b);

        assert_eq!(script.distance(), 5);
        assert_eq!(rebuilt_a, a);
        assert_eq!(rebuilt_b, b);
    }

    #[rstest]
    #[case::identical(&["a", "b"], &["a", "b"], &[
        EditOp::Keep { source: 0, target: 0 },
        EditOp::Keep { source: 1, target: 1 },
    ])]
    #[case::empty_source(&[], &["a", "b"], &[
        EditOp::Insert { target: 0 },
        EditOp::Insert { target: 1 },
    ])]
    #[case::empty_target(&["a", "b"], &[], &[
        EditOp::Delete { source: 0 },
        EditOp::Delete { source: 1 },
    ])]
    #[case::disjoint(&["a", "b"], &["c", "d"], &[
        EditOp::Delete { source: 0 },
        EditOp::Delete { source: 1 },
        EditOp::Insert { target: 0 },
        EditOp::Insert { target: 1 },
    ])]
    #[case::both_empty(&[], &[], &[])]
    fn test_edge_cases(
        #[case] source: &[&str],
        #[case] target: &[&str],
        #[case] expected: &[EditOp],
    ) {
        let script = DiffEngine::new().compute_edit_script(source, target);
        assert_eq!(script.ops(), expected);
    }

    #[test]
    fn test_identity_has_no_changes() {
        let source = lines(&["fn main() {", "}", ""]);
        let script = DiffEngine::new().compute_edit_script(&source, &source);

        assert!(script.is_identity());
        assert_eq!(script.distance(), 0);
        assert_eq!(script.len(), 3);
    }

    #[test]
    fn test_bound_exceeded_falls_back_to_replacement() {
        let source = lines(&["a", "b", "c"]);
        let target = lines(&["a", "x", "c"]);

        let script = DiffEngine::new()
            .with_max_edit_distance(1)
            .compute_edit_script(&source, &target);

        assert!(script.is_replaced());
        assert_eq!(script.deletions(), 3);
        assert_eq!(script.insertions(), 3);
        assert_eq!(script.ops(), EditScript::replacement(3, 3).ops());
    }

    #[test]
    fn test_bound_not_exceeded_is_exact() {
        let source = lines(&["a", "b", "c"]);
        let target = lines(&["a", "x", "c"]);

        let script = DiffEngine::new()
            .with_max_edit_distance(2)
            .compute_edit_script(&source, &target);

        assert!(!script.is_replaced());
        assert_eq!(script.distance(), 2);
    }

    #[test]
    fn test_zero_bound_accepts_identical_input() {
        let source = lines(&["a", "b"]);
        let script = DiffEngine::new()
            .with_max_edit_distance(0)
            .compute_edit_script(&source, &source);

        assert!(!script.is_replaced());
        assert!(script.is_identity());
    }

    #[test]
    fn test_bound_applies_to_one_sided_edits() {
        let source = lines(&["a"]);
        let target = lines(&["a", "b", "c", "d"]);

        let script = DiffEngine::new()
            .with_max_edit_distance(2)
            .compute_edit_script(&source, &target);

        assert!(script.is_replaced());
        assert_eq!(script.deletions(), 1);
        assert_eq!(script.insertions(), 4);
    }

    #[test]
    fn test_large_rewrite_with_bound_gives_up() {
        let source: Vec<usize> = (0..2_000).collect();
        let target: Vec<usize> = (2_000..4_000).collect();

        let script = DiffEngine::new()
            .with_max_edit_distance(64)
            .compute_edit_script(&source, &target);

        assert!(script.is_replaced());
        assert_eq!(script.len(), 4_000);
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            source in prop::collection::vec(0u8..4, 0..16),
            target in prop::collection::vec(0u8..4, 0..16),
        ) {
            let script = DiffEngine::new().compute_edit_script(&source, &target);
            let (rebuilt_source, rebuilt_target) = rebuild(&script, &source, &target);
            prop_assert_eq!(rebuilt_source, source);
            prop_assert_eq!(rebuilt_target, target);
        }

        #[test]
        fn prop_minimal(
            source in prop::collection::vec(0u8..3, 0..10),
            target in prop::collection::vec(0u8..3, 0..10),
        ) {
            let script = DiffEngine::new().compute_edit_script(&source, &target);
            prop_assert_eq!(script.distance(), brute_force_distance(&source, &target));
        }

        #[test]
        fn prop_deletions_precede_insertions(
            source in prop::collection::vec(0u8..4, 0..16),
            target in prop::collection::vec(0u8..4, 0..16),
        ) {
            let script = DiffEngine::new().compute_edit_script(&source, &target);
            for pair in script.ops().windows(2) {
                let insert_then_delete = matches!(
                    pair,
                    [EditOp::Insert { .. }, EditOp::Delete { .. }]
                );
                prop_assert!(!insert_then_delete);
            }
        }

        #[test]
        fn prop_self_diff_is_identity(source in prop::collection::vec(0u8..4, 0..32)) {
            let script = DiffEngine::new().compute_edit_script(&source, &source);
            prop_assert!(script.is_identity());
            prop_assert_eq!(script.len(), source.len());
        }

        #[test]
        fn prop_bound_is_respected(
            source in prop::collection::vec(0u8..4, 0..12),
            target in prop::collection::vec(0u8..4, 0..12),
            limit in 0usize..8,
        ) {
            let exact = brute_force_distance(&source, &target);
            let script = DiffEngine::new()
                .with_max_edit_distance(limit)
                .compute_edit_script(&source, &target);
            prop_assert_eq!(script.is_replaced(), exact > limit);
            if !script.is_replaced() {
                prop_assert_eq!(script.distance(), exact);
            }
        }
    }
}
