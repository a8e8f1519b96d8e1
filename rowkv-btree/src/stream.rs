//! Bounded-channel streaming scans.
//!
//! The producer runs on a detached rayon task holding the tree's reader
//! lock and blocks when the channel is full (back-pressure). A receiver
//! that goes away turns the next send into an error, which cancels the
//! walk and releases the lock. Dropping the sender is the end-of-stream
//! signal; no sentinel value is ever sent.

use std::sync::Arc;

use crossbeam_channel::{Receiver, bounded};

use rowkv_types::Row;

use crate::bounds::QueryPredicate;
use crate::tree::BTree;

/// Capacity of the producer→consumer handoff.
pub const STREAM_CHANNEL_CAPACITY: usize = 16;

impl BTree {
    /// Stream every key matching `pred` through a bounded channel.
    ///
    /// The reader lock is held for the whole scan; prefer
    /// [`BTree::start_stream_paginated`] when writers need to interleave.
    pub fn start_stream(self: &Arc<Self>, pred: QueryPredicate) -> Receiver<Row> {
        let (tx, rx) = bounded(STREAM_CHANNEL_CAPACITY);
        let tree = Arc::clone(self);
        rayon::spawn(move || {
            tree.traverse_bounded(&pred, &mut |row| tx.send(row).is_ok());
        });
        rx
    }

    /// Batched variant of [`BTree::start_stream`]; the reader lock is
    /// released between batches.
    pub fn start_stream_paginated(
        self: &Arc<Self>,
        pred: QueryPredicate,
        batch_size: usize,
    ) -> Receiver<Vec<Row>> {
        let (tx, rx) = bounded(STREAM_CHANNEL_CAPACITY);
        let tree = Arc::clone(self);
        rayon::spawn(move || {
            tree.traverse_paginated(&pred, batch_size, &mut |batch| tx.send(batch).is_ok());
        });
        rx
    }
}
