//! rowkv: an in-memory relational table engine over value-ordered B-trees.
//!
//! This crate is the single entrypoint for the engine: it re-exports the
//! `rowkv-*` member crates so downstream code sees one surface.
//!
//! A [`Table`] owns a fixed [`Schema`], a primary index holding the full
//! row with the primary-key columns first, and any number of secondary
//! indices holding reordered projections. Writes fan out to every index;
//! reads run against one index, and secondary hits are joined back to the
//! primary index to recover full rows. Every index is a [`BTree`]: a
//! mutable, value-ordered B-tree guarded by a per-tree readers-writer
//! lock, traversed under [`QueryPredicate`]s with bounds, filters,
//! limits, pagination, and bounded-channel streaming.
//!
//! ```
//! use rowkv::{Column, ColumnType, Field, IndexId, Row, Schema, Table};
//!
//! let schema = Schema::new(vec![
//!     Column::new("email", ColumnType::Str),
//!     Column::new("id", ColumnType::Int),
//! ])?;
//! let table = Table::create(schema, &["id"], &[&["email"]])?;
//! table.insert(Row::new(vec![Field::Str("ada@acme.dev".into()), Field::Int(1)]))?;
//!
//! let hits = table.list_with_index(
//!     IndexId::Secondary(0),
//!     Row::new(vec![Field::Str("ada@acme.dev".into())]),
//! )?;
//! assert_eq!(hits.len(), 1);
//! # Ok::<(), rowkv::Error>(())
//! ```

pub use rowkv_btree::{
    BTree, Direction, Limit, MAX_NODE_KEYS, QueryPredicate, RowBound, RowFilter,
    STREAM_CHANNEL_CAPACITY,
};
pub use rowkv_result::{Error, Result};
pub use rowkv_table::{DEFAULT_BATCH_SIZE, Index, IndexId, Schema, Table, reorder_row_by_schema};
pub use rowkv_types::{Column, ColumnType, Field, Row};
