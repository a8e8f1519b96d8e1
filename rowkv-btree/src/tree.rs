//! The mutable, value-ordered B-tree.
//!
//! Nodes own their children outright, so the tree is a plain owned graph
//! with no sharing. One readers-writer lock at the tree handle coordinates
//! callers: mutations take the writer side, traversals and assertions the
//! reader side, and recursion below the handle never re-locks. Emitted rows
//! are owned copies; nothing a consumer receives aliases node storage.

use core::cmp::Ordering;
use core::fmt;
use std::sync::RwLock;

use rowkv_types::Row;

use crate::bounds::{Direction, Limit, QueryPredicate, RowBound};

/// Maximum keys a node may hold before it must split.
pub const MAX_NODE_KEYS: usize = 6;

/// Minimum keys a non-root node may hold.
const MIN_NODE_KEYS: usize = MAX_NODE_KEYS / 2;

#[derive(Default)]
struct Node {
    keys: Vec<Row>,
    children: Vec<Node>,
}

/// A value-ordered B-tree over composite row keys.
///
/// Keys are globally unique under [`Row::prefix_cmp`]; inserting an equal
/// key is a silent no-op and deleting an absent one does nothing.
pub struct BTree {
    root: RwLock<Node>,
}

impl Default for BTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        BTree {
            root: RwLock::new(Node::default()),
        }
    }

    /// Insert `key`, splitting on the way back up as nodes overflow.
    /// Inserting a key already present leaves the tree unchanged.
    pub fn insert(&self, key: Row) {
        let mut root = self.root.write().unwrap();
        if let Some((sep, right)) = root.insert_rec(key) {
            let left = std::mem::take(&mut *root);
            *root = Node {
                keys: vec![sep],
                children: vec![left, right],
            };
        }
    }

    /// Delete `key` if present. Deleting an absent key is a no-op.
    pub fn delete(&self, key: &Row) {
        let mut root = self.root.write().unwrap();
        root.delete_rec(key);
        if !root.is_leaf() && root.keys.is_empty() {
            let only = root.children.remove(0);
            *root = only;
        }
    }

    /// Largest key, or `None` for an empty tree.
    pub fn max(&self) -> Option<Row> {
        let root = self.root.read().unwrap();
        if root.keys.is_empty() {
            return None;
        }
        Some(root.max_key().clone())
    }

    /// Smallest key, or `None` for an empty tree.
    pub fn min(&self) -> Option<Row> {
        let root = self.root.read().unwrap();
        if root.keys.is_empty() {
            return None;
        }
        Some(root.min_key().clone())
    }

    /// In-order walk of every key satisfying `pred`, under the reader lock.
    ///
    /// Each emitted row is an owned copy. `emit` returning `false` cancels
    /// the rest of the walk; the producer side of an abandoned stream does
    /// exactly that when its send fails.
    pub fn traverse_bounded<F>(&self, pred: &QueryPredicate, emit: &mut F)
    where
        F: FnMut(Row) -> bool,
    {
        self.bounded_walk(
            &pred.lower,
            &pred.upper,
            pred.filter.as_deref(),
            pred.limit,
            pred.dir,
            emit,
        );
    }

    /// Every key beginning with `prefix`, ascending.
    pub fn traverse_prefix<F>(&self, prefix: Row, emit: &mut F)
    where
        F: FnMut(Row) -> bool,
    {
        self.traverse_bounded(&QueryPredicate::prefix(prefix), emit);
    }

    /// Repeated bounded traversals of at most `batch_size` rows each.
    ///
    /// After a batch the cursor is re-seeded just past the last emitted key
    /// (an `Exclusive` lower bound going forward, an `Inclusive` upper
    /// bound in reverse) and the reader lock is released, so writers can
    /// interleave between batches. `emit` runs with no lock held.
    /// Terminates on an empty batch, an exhausted outer limit, a chunk that
    /// came back unsaturated, or `emit` returning `false`.
    pub fn traverse_paginated<F>(&self, pred: &QueryPredicate, batch_size: usize, emit: &mut F)
    where
        F: FnMut(Vec<Row>) -> bool,
    {
        let mut lower = pred.lower.clone();
        let mut upper = pred.upper.clone();
        let mut remaining = pred.limit;
        loop {
            let chunk_limit = Limit::min(Limit::Rows(batch_size as u64), remaining);
            let mut batch: Vec<Row> = Vec::with_capacity(batch_size);
            self.bounded_walk(
                &lower,
                &upper,
                pred.filter.as_deref(),
                chunk_limit,
                pred.dir,
                &mut |row| {
                    batch.push(row);
                    true
                },
            );
            let Some(last) = batch.last().cloned() else {
                return;
            };
            match pred.dir {
                Direction::Forward => lower = RowBound::Exclusive(last),
                Direction::Reverse => upper = RowBound::Inclusive(last),
            }
            let got = batch.len() as u64;
            if !emit(batch) {
                return;
            }
            remaining.consume(got);
            if remaining.is_used_up() {
                return;
            }
            if let Limit::Rows(asked) = chunk_limit {
                if got < asked {
                    // the range ran dry before the chunk filled
                    return;
                }
            }
        }
    }

    fn bounded_walk<F>(
        &self,
        lower: &RowBound,
        upper: &RowBound,
        filter: Option<&(dyn Fn(&Row) -> bool + Send + Sync)>,
        limit: Limit,
        dir: Direction,
        emit: &mut F,
    ) where
        F: FnMut(Row) -> bool,
    {
        let root = self.root.read().unwrap();
        let mut walk = Walk {
            lower,
            upper,
            filter,
            remaining: limit,
            emit,
        };
        match dir {
            Direction::Forward => {
                walk.ascend(&root);
            }
            Direction::Reverse => {
                walk.descend(&root);
            }
        }
    }

    /// Panic if any structural invariant is violated. Development
    /// assertion; takes the reader lock like any other read.
    pub fn assert_well_formed(&self) {
        let root = self.root.read().unwrap();
        root.assert_rec(true);
    }
}

impl fmt::Display for BTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = self.root.read().unwrap();
        write!(f, "{}", *root)
    }
}

struct Walk<'a, F> {
    lower: &'a RowBound,
    upper: &'a RowBound,
    filter: Option<&'a (dyn Fn(&Row) -> bool + Send + Sync)>,
    remaining: Limit,
    emit: &'a mut F,
}

impl<'a, F> Walk<'a, F>
where
    F: FnMut(Row) -> bool,
{
    /// Ascending in-order walk. Returns `false` once the walk is over for
    /// good, either because a bound or the limit cut it short or because
    /// the consumer cancelled.
    fn ascend(&mut self, node: &Node) -> bool {
        for (i, key) in node.keys.iter().enumerate() {
            if self.remaining.is_used_up() {
                return false;
            }
            // keys left of `key` only matter if `key` clears the lower bound
            if !node.is_leaf() && self.lower.row_greater_than(key) && !self.ascend(&node.children[i])
            {
                return false;
            }
            if self.remaining.is_used_up() || self.upper.row_greater_than(key) {
                return false;
            }
            if self.lower.row_greater_than(key) && !self.try_emit(key) {
                return false;
            }
        }
        match node.children.last() {
            Some(last) => self.ascend(last),
            None => true,
        }
    }

    /// Mirror image of [`Walk::ascend`]: right-to-left, emitting in strict
    /// descending key order.
    fn descend(&mut self, node: &Node) -> bool {
        for (i, key) in node.keys.iter().enumerate().rev() {
            if self.remaining.is_used_up() {
                return false;
            }
            // keys right of `key` only matter if `key` clears the upper bound
            if !node.is_leaf()
                && !self.upper.row_greater_than(key)
                && !self.descend(&node.children[i + 1])
            {
                return false;
            }
            if self.remaining.is_used_up() || !self.lower.row_greater_than(key) {
                return false;
            }
            if !self.upper.row_greater_than(key) && !self.try_emit(key) {
                return false;
            }
        }
        match node.children.first() {
            Some(first) => self.descend(first),
            None => true,
        }
    }

    fn try_emit(&mut self, key: &Row) -> bool {
        if let Some(filter) = self.filter {
            if !filter(key) {
                return true;
            }
        }
        self.remaining.decrement();
        (self.emit)(key.clone())
    }
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Insert `key`, splitting on overflow. Returns the promoted separator
    /// and the new right sibling when this node split.
    fn insert_rec(&mut self, key: Row) -> Option<(Row, Node)> {
        let mut target = self.keys.len();
        for (i, existing) in self.keys.iter().enumerate() {
            match key.prefix_cmp(existing) {
                Ordering::Less => {
                    target = i;
                    break;
                }
                // equal keys are silently dropped
                Ordering::Equal => return None,
                Ordering::Greater => {}
            }
        }
        if self.is_leaf() {
            self.keys.insert(target, key);
        } else {
            let child = target.min(self.children.len() - 1);
            if let Some((sep, right)) = self.children[child].insert_rec(key) {
                self.keys.insert(child, sep);
                self.children.insert(child + 1, right);
            }
        }
        if self.keys.len() > MAX_NODE_KEYS {
            return Some(self.split());
        }
        None
    }

    /// Split a full node into `(separator, right sibling)`, keeping the
    /// left half in place.
    fn split(&mut self) -> (Row, Node) {
        let right_keys = self.keys.split_off(MIN_NODE_KEYS + 1);
        let sep = self.keys.pop().expect("split of an overflowing node");
        let right_children = if self.is_leaf() {
            Vec::new()
        } else {
            self.children.split_off(MIN_NODE_KEYS + 1)
        };
        (
            sep,
            Node {
                keys: right_keys,
                children: right_children,
            },
        )
    }

    fn delete_rec(&mut self, key: &Row) {
        let is_leaf = self.is_leaf();
        let mut descended: Option<usize> = None;
        let mut handled = false;
        for i in 0..self.keys.len() {
            match key.prefix_cmp(&self.keys[i]) {
                Ordering::Less => {
                    // a leaf without the key: nothing to do
                    if !is_leaf {
                        self.children[i].delete_rec(key);
                        descended = Some(i);
                    }
                    handled = true;
                    break;
                }
                Ordering::Equal => {
                    if is_leaf {
                        self.keys.remove(i);
                    } else {
                        // swap in the predecessor, then delete it from the
                        // left subtree
                        let pred = self.children[i].max_key().clone();
                        self.keys[i] = pred.clone();
                        self.children[i].delete_rec(&pred);
                        descended = Some(i);
                    }
                    handled = true;
                    break;
                }
                Ordering::Greater => {}
            }
        }
        if !handled && !is_leaf {
            // the key can only live in the rightmost subtree
            let last = self.children.len() - 1;
            self.children[last].delete_rec(key);
            descended = Some(last);
        }
        if let Some(child) = descended {
            if self.children[child].keys.len() < MIN_NODE_KEYS {
                self.rebalance(child);
            }
        }
    }

    /// Restore minimum occupancy for `children[child]`, rotating a key
    /// through the parent when a sibling can donate, merging otherwise.
    /// Prefers the sibling with more keys so rotation happens whenever
    /// either neighbour can afford it.
    fn rebalance(&mut self, child: usize) {
        let right = (child + 1 < self.children.len()).then_some(child + 1);
        let left = child.checked_sub(1);
        let sibling = match (left, right) {
            (Some(l), Some(r)) => {
                if self.children[l].keys.len() > self.children[r].keys.len() {
                    l
                } else {
                    r
                }
            }
            (None, Some(r)) => r,
            (Some(l), None) => l,
            // a root holding a single child; the caller collapses it
            (None, None) => return,
        };
        if self.children[sibling].keys.len() > MIN_NODE_KEYS {
            self.rotate(child, sibling);
        } else {
            self.merge(child.min(sibling));
        }
    }

    /// Move one key from `sibling` through the parent into `child`.
    fn rotate(&mut self, child: usize, sibling: usize) {
        if sibling > child {
            let donated = self.children[sibling].keys.remove(0);
            let sep = std::mem::replace(&mut self.keys[child], donated);
            self.children[child].keys.push(sep);
            if !self.children[sibling].is_leaf() {
                let carried = self.children[sibling].children.remove(0);
                self.children[child].children.push(carried);
            }
        } else {
            let donated = self.children[sibling].keys.pop().expect("donor key");
            let sep = std::mem::replace(&mut self.keys[sibling], donated);
            self.children[child].keys.insert(0, sep);
            if !self.children[sibling].is_leaf() {
                let carried = self.children[sibling].children.pop().expect("donor child");
                self.children[child].children.insert(0, carried);
            }
        }
    }

    /// Fold `children[left + 1]` and the separating key into
    /// `children[left]`.
    fn merge(&mut self, left: usize) {
        let right = self.children.remove(left + 1);
        let sep = self.keys.remove(left);
        let target = &mut self.children[left];
        target.keys.push(sep);
        target.keys.extend(right.keys);
        target.children.extend(right.children);
    }

    /// Largest key in this subtree (last key of the rightmost leaf).
    fn max_key(&self) -> &Row {
        match self.children.last() {
            Some(child) => child.max_key(),
            None => self.keys.last().expect("max of an empty node"),
        }
    }

    /// Smallest key in this subtree (first key of the leftmost leaf).
    fn min_key(&self) -> &Row {
        match self.children.first() {
            Some(child) => child.min_key(),
            None => self.keys.first().expect("min of an empty node"),
        }
    }

    fn height(&self) -> usize {
        match self.children.first() {
            Some(child) => child.height() + 1,
            None => 1,
        }
    }

    fn assert_rec(&self, is_root: bool) {
        assert!(
            self.keys.len() <= MAX_NODE_KEYS,
            "too many keys in node {self}"
        );
        if !is_root {
            assert!(
                self.keys.len() >= MIN_NODE_KEYS,
                "too few keys in node {self}"
            );
        }
        if self.is_leaf() {
            for pair in self.keys.windows(2) {
                assert!(
                    pair[0].prefix_cmp(&pair[1]) == Ordering::Less,
                    "leaf out of order: {self}"
                );
            }
            return;
        }
        assert!(
            self.children.len() == self.keys.len() + 1,
            "wrong number of children in node {self}"
        );
        let height = self.height();
        for (i, key) in self.keys.iter().enumerate() {
            self.children[i].assert_rec(false);
            assert!(
                self.children[i].height() + 1 == height,
                "uneven height under index {i} in node {self}"
            );
            assert!(
                self.children[i].max_key().prefix_cmp(key) == Ordering::Less,
                "subtree out of order at index {i} in node {self}"
            );
            assert!(
                key.prefix_cmp(self.children[i + 1].min_key()) == Ordering::Less,
                "subtree out of order past index {i} in node {self}"
            );
        }
        let last = self.children.last().expect("internal node children");
        last.assert_rec(false);
        assert!(
            last.height() + 1 == height,
            "uneven height under the last child of node {self}"
        );
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        if self.is_leaf() {
            for (i, key) in self.keys.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{key}")?;
            }
        } else {
            for (i, key) in self.keys.iter().enumerate() {
                write!(f, "{} {} ", self.children[i], key)?;
            }
            write!(f, "{}", self.children.last().expect("internal node children"))?;
        }
        write!(f, "}}")
    }
}
