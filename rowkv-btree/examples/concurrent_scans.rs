//! Two streaming scans draining concurrently from one tree.
//!
//! Each stream has its own bounded channel fed by a detached producer
//! task; the consumer interleaves events from both with `select!`.

use std::sync::Arc;

use rowkv_btree::{BTree, Direction, QueryPredicate};
use rowkv_types::{Field, Row};

fn main() {
    let tree = Arc::new(BTree::new());
    for k in 1..=10 {
        tree.insert(Row::new(vec![Field::Int(k)]));
    }

    let mut rx_fwd = tree.start_stream(QueryPredicate::all());
    let mut rx_rev = tree.start_stream(QueryPredicate {
        dir: Direction::Reverse,
        ..QueryPredicate::all()
    });

    // A receiver that never yields; used to disable a select arm once its
    // stream closes.
    let dead = crossbeam_channel::never::<Row>();

    let mut open = 2;
    while open > 0 {
        crossbeam_channel::select! {
            recv(rx_fwd) -> res => match res {
                Ok(row) => println!("fwd {row}"),
                Err(_) => { open -= 1; rx_fwd = dead.clone(); }
            },
            recv(rx_rev) -> res => match res {
                Ok(row) => println!("rev {row}"),
                Err(_) => { open -= 1; rx_rev = dead.clone(); }
            },
        }
    }

    println!("done");
}
