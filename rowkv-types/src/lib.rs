//! Core value types for the rowkv engine.
//!
//! This crate hosts the scalar and composite value types used throughout
//! the workspace, decoupled from the tree layer (`rowkv-btree`) and the
//! table layer (`rowkv-table`).
//!
//! Modules:
//! - field:  `ColumnType` kind tags and tagged `Field` values.
//! - row:    `Row`, an ordered field sequence with prefix comparison.
//! - column: `Column`, a named and typed schema entry.

pub mod column;
pub mod field;
pub mod row;

pub use column::Column;
pub use field::{ColumnType, Field};
pub use row::Row;
