//! An index: a projection schema paired with its own B-tree.

use core::fmt;
use std::sync::Arc;

use rowkv_btree::BTree;
use rowkv_types::Row;

use crate::schema::{Schema, reorder_row_by_schema};

/// A projection schema and the tree storing rows in that column order.
pub struct Index {
    schema: Schema,
    tree: Arc<BTree>,
}

impl Index {
    pub(crate) fn new(schema: Schema) -> Self {
        Index {
            schema,
            tree: Arc::new(BTree::new()),
        }
    }

    /// The column order rows take inside this index.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub(crate) fn tree(&self) -> &Arc<BTree> {
        &self.tree
    }

    /// Insert `row` (in `table_schema` order), reordered to this index.
    pub(crate) fn insert(&self, row: &Row, table_schema: &Schema) {
        self.tree.insert(self.full_projection(row, table_schema));
    }

    /// Delete `row` (in `table_schema` order) from this index.
    pub(crate) fn delete(&self, row: &Row, table_schema: &Schema) {
        self.tree.delete(&self.full_projection(row, table_schema));
    }

    /// Every stored row beginning with `prefix`, in index order.
    pub fn traverse_prefix<F>(&self, prefix: Row, emit: &mut F)
    where
        F: FnMut(Row) -> bool,
    {
        self.tree.traverse_prefix(prefix, emit);
    }

    // An index schema only ever references table columns, so a projection
    // that comes back short is a bug in index construction, not user input.
    fn full_projection(&self, row: &Row, table_schema: &Schema) -> Row {
        let projected = reorder_row_by_schema(row, table_schema, &self.schema);
        assert!(
            projected.len() == self.schema.len(),
            "row {row} does not cover index schema {}",
            self.schema
        );
        projected
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{schema: {}, data: {}}}", self.schema, self.tree)
    }
}
