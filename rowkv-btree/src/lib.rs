//! rowkv-btree: a mutable, value-ordered B-tree over composite row keys.
//!
//! Keys are whole [`rowkv_types::Row`]s compared lexicographically, so one
//! tree serves as an ordered index over any column permutation. A single
//! readers-writer lock per tree covers every operation; range traversal is
//! driven by bound predicates and can run bounded, paginated, or streamed
//! through a bounded channel.
//!
//! Modules:
//! - bounds: range endpoints, emission limits, and scan predicates.
//! - tree:   node structure, insert/delete/rebalance, bounded traversal.
//! - stream: bounded-channel streaming scans on a detached producer task.

pub mod bounds;
pub mod stream;
pub mod tree;

pub use bounds::{Direction, Limit, QueryPredicate, RowBound, RowFilter};
pub use stream::STREAM_CHANNEL_CAPACITY;
pub use tree::{BTree, MAX_NODE_KEYS};
