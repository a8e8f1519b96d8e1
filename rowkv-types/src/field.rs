//! Scalar field values and their per-kind total order.

use core::cmp::Ordering;
use core::fmt;

/// Kind tag for a column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Signed 64-bit integer.
    Int,
    /// UTF-8 string, ordered bytewise.
    Str,
    /// Boolean; `false` orders before `true`.
    Bool,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Str => "string",
            ColumnType::Bool => "bool",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single typed cell.
///
/// Fields of the same kind admit a strict total order and equality.
/// Comparing fields of different kinds is a programming error and panics;
/// schema validation upstream keeps mixed-kind comparisons out of every
/// tree and table path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Int(i64),
    Str(String),
    Bool(bool),
}

impl Field {
    /// The kind this field reports for schema checks.
    pub fn column_type(&self) -> ColumnType {
        match self {
            Field::Int(_) => ColumnType::Int,
            Field::Str(_) => ColumnType::Str,
            Field::Bool(_) => ColumnType::Bool,
        }
    }

    /// Total order within a kind.
    ///
    /// Panics when `self` and `other` are of different kinds.
    pub fn cmp_same_kind(&self, other: &Field) -> Ordering {
        match (self, other) {
            (Field::Int(a), Field::Int(b)) => a.cmp(b),
            (Field::Str(a), Field::Str(b)) => a.cmp(b),
            (Field::Bool(a), Field::Bool(b)) => a.cmp(b),
            (a, b) => panic!(
                "cannot compare a {} field with a {} field",
                a.column_type(),
                b.column_type()
            ),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Int(v) => write!(f, "{v}"),
            Field::Str(v) => write!(f, "{v}"),
            Field::Bool(v) => write!(f, "{v}"),
        }
    }
}
