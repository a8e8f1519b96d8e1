//! Range endpoints, emission limits, and scan predicates.
//!
//! A [`RowBound`] answers a single question: is a given row strictly to the
//! right of the bound? Bounds sit *between* rows, never on one, which is
//! what lets a k-field prefix act as the infimum (`Inclusive`) or supremum
//! (`Exclusive`) of every row beginning with that prefix.

use core::cmp::Ordering;

use rowkv_types::Row;

/// Direction of a key-ordered scan.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Direction {
    /// Ascending key order.
    #[default]
    Forward,
    /// Descending key order (mirrored descent).
    Reverse,
}

/// Optional per-row filter applied to candidate keys during traversal.
/// Rows rejected by the filter do not count against the limit.
pub type RowFilter = Box<dyn Fn(&Row) -> bool + Send + Sync>;

/// A position in row space to the left or right of which traversal filters.
#[derive(Clone, Debug)]
pub enum RowBound {
    /// Every row is to the right of this bound.
    NegativeInfinity,
    /// No row is to the right of this bound.
    Infinity,
    /// Sits just before the first row beginning with the prefix.
    Inclusive(Row),
    /// Sits just past the last row beginning with the prefix.
    Exclusive(Row),
}

impl RowBound {
    /// True when `row` sits strictly to the right of this bound.
    ///
    /// For the prefix variants the row is compared field-by-field against
    /// the prefix; the first divergence decides, and a row that begins with
    /// the prefix is to the right of `Inclusive` but not of `Exclusive`.
    pub fn row_greater_than(&self, row: &Row) -> bool {
        match self {
            RowBound::NegativeInfinity => true,
            RowBound::Infinity => false,
            RowBound::Inclusive(prefix) => Self::clears_prefix(prefix, row, true),
            RowBound::Exclusive(prefix) => Self::clears_prefix(prefix, row, false),
        }
    }

    fn clears_prefix(prefix: &Row, row: &Row, when_prefixed: bool) -> bool {
        for (i, field) in prefix.iter().enumerate() {
            match row[i].cmp_same_kind(field) {
                Ordering::Less => return false,
                Ordering::Greater => return true,
                Ordering::Equal => {}
            }
        }
        when_prefixed
    }
}

/// Emission budget for a traversal. `NoLimit` never exhausts; `Rows(n)`
/// decrements once per emitted row and stops the walk at zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Limit {
    NoLimit,
    Rows(u64),
}

impl Limit {
    pub fn is_used_up(&self) -> bool {
        matches!(self, Limit::Rows(0))
    }

    pub fn decrement(&mut self) {
        if let Limit::Rows(n) = self {
            *n = n.saturating_sub(1);
        }
    }

    /// Consume `n` rows of budget at once.
    pub fn consume(&mut self, n: u64) {
        if let Limit::Rows(remaining) = self {
            *remaining = remaining.saturating_sub(n);
        }
    }

    pub fn min(a: Limit, b: Limit) -> Limit {
        match (a, b) {
            (Limit::NoLimit, b) => b,
            (a, Limit::NoLimit) => a,
            (Limit::Rows(x), Limit::Rows(y)) => Limit::Rows(x.min(y)),
        }
    }
}

/// Everything a bounded scan needs: endpoints, an optional row filter, an
/// emission budget, and a direction.
pub struct QueryPredicate {
    pub lower: RowBound,
    pub upper: RowBound,
    pub filter: Option<RowFilter>,
    pub limit: Limit,
    pub dir: Direction,
}

impl Default for QueryPredicate {
    fn default() -> Self {
        Self::all()
    }
}

impl QueryPredicate {
    /// Matches every row, ascending, unbounded.
    pub fn all() -> Self {
        QueryPredicate {
            lower: RowBound::NegativeInfinity,
            upper: RowBound::Infinity,
            filter: None,
            limit: Limit::NoLimit,
            dir: Direction::Forward,
        }
    }

    /// Every row beginning with `prefix`, ascending.
    pub fn prefix(prefix: Row) -> Self {
        QueryPredicate {
            lower: RowBound::Inclusive(prefix.clone()),
            upper: RowBound::Exclusive(prefix),
            ..Self::all()
        }
    }
}
