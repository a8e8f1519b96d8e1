//! Cursor-style pagination over a tree, forward and in reverse.
//!
//! Each batch re-seeds the cursor just past the last emitted key, so the
//! reader lock is released between batches and writers can interleave.

use rowkv_btree::{BTree, Direction, QueryPredicate};
use rowkv_types::{Field, Row};

fn int_row(v: i64) -> Row {
    Row::new(vec![Field::Int(v)])
}

fn main() {
    let tree = BTree::new();
    for k in 1..=20 {
        tree.insert(int_row(k));
    }

    println!("-- forward pages (size=7) --");
    tree.traverse_paginated(&QueryPredicate::all(), 7, &mut |batch| {
        for row in &batch {
            print!("{row} ");
        }
        println!();
        true
    });

    println!("-- reverse pages (size=6) --");
    let pred = QueryPredicate {
        dir: Direction::Reverse,
        ..QueryPredicate::all()
    };
    tree.traverse_paginated(&pred, 6, &mut |batch| {
        for row in &batch {
            print!("{row} ");
        }
        println!();
        true
    });
}
