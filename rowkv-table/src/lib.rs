//! Table layer: schemas, indices, and multi-index orchestration.
//!
//! A [`Table`] owns a canonical [`Schema`], a primary index that stores the
//! full row with the primary-key columns first, and any number of secondary
//! indices storing reordered projections. Every write fans out to all
//! indices; reads run against one index, and secondary hits are joined back
//! to the primary index to recover full rows.
//!
//! Modules:
//! - constants: tuning knobs shared by the table operations.
//! - schema:    schema validation and the row-permutation primitive.
//! - index:     a projection schema paired with its own B-tree.
//! - table:     the table orchestrator.

pub mod constants;
pub mod index;
pub mod schema;
pub mod table;

pub use constants::DEFAULT_BATCH_SIZE;
pub use index::Index;
pub use schema::{Schema, reorder_row_by_schema};
pub use table::{IndexId, Table};
