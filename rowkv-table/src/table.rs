//! Table orchestration: schema validation, multi-index writes, and index
//! traversal with the secondary→primary join.
//!
//! Writes fan out to every index but are not atomic across them: a
//! concurrent reader on one index may observe a write not yet applied to
//! another. Each underlying tree has its own lock; the table adds no
//! locking of its own.

use core::fmt;
use std::sync::Arc;

use crossbeam_channel::{Receiver, bounded};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use rowkv_btree::{QueryPredicate, STREAM_CHANNEL_CAPACITY};
use rowkv_result::{Error, Result};
use rowkv_types::{Column, ColumnType, Field, Row};

use crate::constants::DEFAULT_BATCH_SIZE;
use crate::index::Index;
use crate::schema::{Schema, names_to_schema, reorder_row_by_schema};

/// Which index a read or mutation runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexId {
    Primary,
    /// Position in the secondary-index list, in declaration order.
    Secondary(usize),
}

/// A fixed-schema table: one primary index holding full rows, plus any
/// number of secondary indices holding projections that join back to the
/// primary index via the primary-key columns.
pub struct Table {
    schema: Schema,
    primary: Index,
    secondaries: Vec<Index>,
    /// Number of user-chosen primary-key columns; they lead the primary
    /// index schema, so this is also the length of a PK lookup prefix.
    pk_len: usize,
}

impl Table {
    /// Create a table.
    ///
    /// The primary index stores the whole row, primary-key columns first,
    /// followed by the remaining schema columns in schema order. Each
    /// secondary index stores its declared columns followed by any
    /// primary-key columns not already declared, in primary-key order.
    pub fn create(
        schema: Schema,
        primary_key: &[&str],
        secondary_indices: &[&[&str]],
    ) -> Result<Table> {
        // every other name list gets padded with primary-key columns, so an
        // empty primary key has to be rejected before the padding hides it
        if primary_key.is_empty() {
            return Err(Error::InvalidArgumentError(
                "primary key column list can not be empty".into(),
            ));
        }
        let by_name: FxHashMap<&str, ColumnType> = schema
            .columns()
            .iter()
            .map(|col| (col.name.as_str(), col.ty))
            .collect();

        let mut secondaries = Vec::with_capacity(secondary_indices.len());
        for declared in secondary_indices {
            let mut names: Vec<String> = declared.iter().map(|s| s.to_string()).collect();
            for pk in primary_key {
                append_unique(&mut names, pk);
            }
            secondaries.push(Index::new(names_to_schema(&names, &by_name)?));
        }

        let mut primary_names: Vec<String> =
            primary_key.iter().map(|s| s.to_string()).collect();
        for col in schema.columns() {
            append_unique(&mut primary_names, &col.name);
        }
        let primary = Index::new(names_to_schema(&primary_names, &by_name)?);

        debug!(
            schema = %schema,
            secondaries = secondaries.len(),
            "table created"
        );
        Ok(Table {
            schema,
            primary,
            secondaries,
            pk_len: primary_key.len(),
        })
    }

    /// The table's canonical column order.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of secondary indices.
    pub fn secondary_count(&self) -> usize {
        self.secondaries.len()
    }

    /// Column order of the chosen index; prefixes passed to traversal run
    /// against this order.
    pub fn index_schema(&self, index: IndexId) -> &Schema {
        self.index(index).schema()
    }

    fn index(&self, id: IndexId) -> &Index {
        match id {
            IndexId::Primary => &self.primary,
            IndexId::Secondary(i) => &self.secondaries[i],
        }
    }

    /// Insert `row` (table order) into every index.
    ///
    /// Primary-key uniqueness is enforced here: a row whose primary-key
    /// prefix is already mapped to a different row is rejected, while
    /// re-inserting the identical row is an idempotent no-op.
    pub fn insert(&self, row: Row) -> Result<()> {
        self.schema.check_row(&row)?;
        let stored = reorder_row_by_schema(&row, &self.schema, self.primary.schema());
        let pk_prefix = Row::new(stored.fields()[..self.pk_len].to_vec());
        if let Some(existing) = self.lookup_primary(&pk_prefix) {
            if existing == stored {
                return Ok(());
            }
            return Err(Error::ConstraintError(format!(
                "primary key {pk_prefix} already maps to a different row"
            )));
        }
        self.insert_unchecked(&row);
        Ok(())
    }

    /// Insert many rows. Every row is schema-validated before any index is
    /// touched; a constraint violation mid-batch still fails fast, and
    /// rows applied before it are not rolled back.
    pub fn batch_insert(&self, rows: Vec<Row>) -> Result<()> {
        for row in &rows {
            self.schema.check_row(row)?;
        }
        for row in rows {
            self.insert(row)?;
        }
        Ok(())
    }

    /// Delete every row whose `index`-order projection begins with
    /// `prefix`. Each batch is fully materialised before any tree is
    /// mutated, since mutation invalidates in-flight traversal state.
    pub fn delete(&self, index: IndexId, prefix: Row) -> Result<()> {
        self.traverse_with_index_paginated(
            index,
            QueryPredicate::prefix(prefix),
            DEFAULT_BATCH_SIZE,
            &mut |batch: Vec<Row>| {
                for row in &batch {
                    self.delete_unchecked(row);
                }
                true
            },
        )
    }

    /// Update every row matched by `pred` on `index`: the row is removed
    /// from all indices, assigned fields are substituted in table-schema
    /// order, and the new row is reinserted everywhere.
    ///
    /// Assignments naming columns outside the schema are silently ignored.
    /// An assignment whose field kind contradicts its own column tag is
    /// rejected up front.
    pub fn update(
        &self,
        index: IndexId,
        pred: QueryPredicate,
        assignments: &FxHashMap<Column, Field>,
    ) -> Result<()> {
        for (col, field) in assignments {
            if field.column_type() != col.ty {
                return Err(Error::InvalidArgumentError(format!(
                    "assignment for column {} carries a {} field",
                    col,
                    field.column_type()
                )));
            }
        }
        let apply = &mut |batch: Vec<Row>| {
            for row in batch {
                self.delete_unchecked(&row);
                let fields = row
                    .iter()
                    .zip(self.schema.columns())
                    .map(|(field, col)| match assignments.get(col) {
                        Some(assigned) => assigned.clone(),
                        None => field.clone(),
                    })
                    .collect();
                self.insert_unchecked(&Row::new(fields));
            }
            true
        };
        self.traverse_with_index_paginated(index, pred, DEFAULT_BATCH_SIZE, apply)
    }

    /// Paginate `index` under `pred`, emitting batches of full rows in
    /// table order. Primary rows only need reordering; secondary hits are
    /// reduced to a primary-key prefix and point-looked-up in the primary
    /// index. `emit` runs with no tree lock held and may mutate the table;
    /// returning `false` stops the traversal.
    pub fn traverse_with_index_paginated<F>(
        &self,
        index: IndexId,
        pred: QueryPredicate,
        batch_size: usize,
        emit: &mut F,
    ) -> Result<()>
    where
        F: FnMut(Vec<Row>) -> bool,
    {
        let idx = self.index(index);
        idx.tree().traverse_paginated(&pred, batch_size, &mut |batch| {
            let mut rows = Vec::with_capacity(batch.len());
            for stored in batch {
                if let Some(row) = self.row_from_stored(index, stored) {
                    rows.push(row);
                }
            }
            emit(rows)
        });
        Ok(())
    }

    /// Emit every row whose `index`-order projection begins with `prefix`,
    /// one at a time, in index order.
    pub fn traverse_with_index<F>(&self, index: IndexId, prefix: Row, emit: &mut F) -> Result<()>
    where
        F: FnMut(Row) -> bool,
    {
        self.traverse_with_index_paginated(
            index,
            QueryPredicate::prefix(prefix),
            DEFAULT_BATCH_SIZE,
            &mut |batch| {
                for row in batch {
                    if !emit(row) {
                        return false;
                    }
                }
                true
            },
        )
    }

    /// Materialise [`Table::traverse_with_index`] into a vector.
    pub fn list_with_index(&self, index: IndexId, prefix: Row) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        self.traverse_with_index(index, prefix, &mut |row| {
            rows.push(row);
            true
        })?;
        Ok(rows)
    }

    /// Channel-streaming variant of [`Table::traverse_with_index`]: the
    /// producer runs on a detached task and blocks when the bounded
    /// channel fills; dropping the receiver cancels it.
    pub fn stream_with_index(self: &Arc<Self>, index: IndexId, prefix: Row) -> Receiver<Row> {
        let (tx, rx) = bounded(STREAM_CHANNEL_CAPACITY);
        let table = Arc::clone(self);
        rayon::spawn(move || {
            let _ = table.traverse_with_index(index, prefix, &mut |row| tx.send(row).is_ok());
        });
        rx
    }

    /// Channel-streaming variant of
    /// [`Table::traverse_with_index_paginated`].
    pub fn stream_with_index_paginated(
        self: &Arc<Self>,
        index: IndexId,
        pred: QueryPredicate,
        batch_size: usize,
    ) -> Receiver<Vec<Row>> {
        let (tx, rx) = bounded(STREAM_CHANNEL_CAPACITY);
        let table = Arc::clone(self);
        rayon::spawn(move || {
            let _ = table.traverse_with_index_paginated(index, pred, batch_size, &mut |batch| {
                tx.send(batch).is_ok()
            });
        });
        rx
    }

    fn insert_unchecked(&self, row: &Row) {
        self.primary.insert(row, &self.schema);
        for sec in &self.secondaries {
            sec.insert(row, &self.schema);
        }
    }

    fn delete_unchecked(&self, row: &Row) {
        self.primary.delete(row, &self.schema);
        for sec in &self.secondaries {
            sec.delete(row, &self.schema);
        }
    }

    /// Point-lookup of the full stored row under `prefix` (primary order).
    /// The emit callback cancels after the first hit.
    fn lookup_primary(&self, prefix: &Row) -> Option<Row> {
        let mut found = None;
        self.primary.traverse_prefix(prefix.clone(), &mut |row| {
            found = Some(row);
            false
        });
        found
    }

    /// Turn a stored index row into a full row in table order, joining
    /// through the primary index for secondary hits.
    fn row_from_stored(&self, index: IndexId, stored: Row) -> Option<Row> {
        let full = match index {
            IndexId::Primary => stored,
            IndexId::Secondary(_) => {
                let pk_prefix =
                    reorder_row_by_schema(&stored, self.index(index).schema(), self.primary.schema());
                match self.lookup_primary(&pk_prefix) {
                    Some(row) => row,
                    None => {
                        // reachable transiently: multi-index writes are not atomic
                        warn!(prefix = %pk_prefix, "secondary hit without a primary row, skipping");
                        return None;
                    }
                }
            }
        };
        Some(reorder_row_by_schema(&full, self.primary.schema(), &self.schema))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Schema: {}", self.schema)?;
        writeln!(f, "Primary index: {}", self.primary)?;
        write!(f, "Indices:")?;
        for sec in &self.secondaries {
            write!(f, " {sec}")?;
        }
        Ok(())
    }
}

/// Append `name` to `names` only if it is not already present.
fn append_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}
