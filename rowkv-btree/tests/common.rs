#![allow(dead_code)]

use rowkv_btree::{BTree, QueryPredicate};
use rowkv_types::{Field, Row};

pub fn int_row(v: i64) -> Row {
    Row::new(vec![Field::Int(v)])
}

pub fn pair_row(s: &str, v: i64) -> Row {
    Row::new(vec![Field::Str(s.into()), Field::Int(v)])
}

/// Drain the whole tree in ascending order.
pub fn collect_all(tree: &BTree) -> Vec<Row> {
    let mut rows = Vec::new();
    tree.traverse_bounded(&QueryPredicate::all(), &mut |row| {
        rows.push(row);
        true
    });
    rows
}

/// Single-int convenience view of [`collect_all`].
pub fn collect_ints(tree: &BTree) -> Vec<i64> {
    collect_all(tree)
        .into_iter()
        .map(|row| match row.fields() {
            [Field::Int(v)] => *v,
            other => panic!("expected a one-int row, got {other:?}"),
        })
        .collect()
}
