//! Schema validation and the row-permutation primitive.

use core::fmt;

use rustc_hash::{FxHashMap, FxHashSet};

use rowkv_result::{Error, Result};
use rowkv_types::{Column, ColumnType, Row};

/// An ordered, non-empty sequence of uniquely named columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema(Vec<Column>);

impl Schema {
    /// Build a schema, rejecting empty column lists and duplicate names.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::InvalidArgumentError(
                "schema can not be empty".into(),
            ));
        }
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(Error::InvalidArgumentError(format!(
                    "duplicate column name: {}",
                    col.name
                )));
            }
        }
        Ok(Schema(columns))
    }

    pub fn columns(&self) -> &[Column] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check that `row` conforms: same length, same kind at each position.
    pub fn check_row(&self, row: &Row) -> Result<()> {
        if row.len() != self.0.len() {
            return Err(Error::InvalidArgumentError(
                "row and table schema length mismatch".into(),
            ));
        }
        for (field, col) in row.iter().zip(&self.0) {
            if field.column_type() != col.ty {
                return Err(Error::InvalidArgumentError(format!(
                    "column {} expects {}, got {}",
                    col.name,
                    col.ty,
                    field.column_type()
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, col) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{col}")?;
        }
        write!(f, ")")
    }
}

/// Resolve column `names` against a name→type map, preserving order.
pub(crate) fn names_to_schema(
    names: &[String],
    by_name: &FxHashMap<&str, ColumnType>,
) -> Result<Schema> {
    if names.is_empty() {
        return Err(Error::InvalidArgumentError(
            "list of column names can not be empty".into(),
        ));
    }
    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let Some(ty) = by_name.get(name.as_str()) else {
            return Err(Error::InvalidArgumentError(format!(
                "index column {name} does not exist in the schema"
            )));
        };
        columns.push(Column::new(name.clone(), *ty));
    }
    Schema::new(columns)
}

/// Reorder `row` (laid out per `from`) into the column order of `to`,
/// stopping at the first `to` column absent from `from`.
///
/// The result is a full permutation when `to`'s columns are a subset of
/// `from`'s, and a prefix otherwise, which is exactly what the join from a
/// secondary index needs to turn an index row into a primary-key lookup
/// prefix. This is the only permutation primitive in the engine.
pub fn reorder_row_by_schema(row: &Row, from: &Schema, to: &Schema) -> Row {
    let mut positions: FxHashMap<&Column, usize> = FxHashMap::default();
    for (i, col) in from.columns().iter().enumerate() {
        positions.insert(col, i);
    }
    let mut fields = Vec::with_capacity(to.len());
    for col in to.columns() {
        match positions.get(col) {
            Some(&i) => fields.push(row[i].clone()),
            None => break,
        }
    }
    Row::new(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowkv_types::Field;

    fn schema(cols: &[(&str, ColumnType)]) -> Schema {
        Schema::new(
            cols.iter()
                .map(|(name, ty)| Column::new(*name, *ty))
                .collect(),
        )
        .expect("valid schema")
    }

    #[test]
    fn reorder_is_invertible_over_a_superset() {
        let table = schema(&[
            ("a", ColumnType::Int),
            ("b", ColumnType::Str),
            ("c", ColumnType::Bool),
        ]);
        let index = schema(&[
            ("c", ColumnType::Bool),
            ("a", ColumnType::Int),
            ("b", ColumnType::Str),
        ]);
        let row = Row::new(vec![
            Field::Int(7),
            Field::Str("x".into()),
            Field::Bool(true),
        ]);
        let reordered = reorder_row_by_schema(&row, &table, &index);
        assert_eq!(
            reordered,
            Row::new(vec![Field::Bool(true), Field::Int(7), Field::Str("x".into())])
        );
        assert_eq!(reorder_row_by_schema(&reordered, &index, &table), row);
    }

    #[test]
    fn reorder_stops_at_the_first_missing_column() {
        let from = schema(&[("a", ColumnType::Int), ("b", ColumnType::Str)]);
        let to = schema(&[
            ("b", ColumnType::Str),
            ("missing", ColumnType::Int),
            ("a", ColumnType::Int),
        ]);
        let row = Row::new(vec![Field::Int(1), Field::Str("y".into())]);
        assert_eq!(
            reorder_row_by_schema(&row, &from, &to),
            Row::new(vec![Field::Str("y".into())])
        );
    }

    #[test]
    fn mismatched_kind_at_a_position_is_rejected() {
        let s = schema(&[("a", ColumnType::Int)]);
        assert!(s.check_row(&Row::new(vec![Field::Bool(false)])).is_err());
        assert!(s.check_row(&Row::new(vec![Field::Int(0)])).is_ok());
    }
}
