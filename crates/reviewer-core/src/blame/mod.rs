//! Line attribution.
//!
//! - `index`: per-line blame for one file at one revision
//! - `tree`: blame indices keyed by path, as a directory tree
//! - `builder`: gateway-backed construction with a per-run cache

mod builder;
mod index;
mod tree;

pub use builder::{BlameBuilder, BlameCache};
pub use index::{BlameEntry, BlameIndex};
pub use tree::BlameTree;
