//! Totally ordered `f64` wrapper for priority queues.

use std::cmp::Ordering;

/// An `f64` cost with a total order (`f64::total_cmp`), usable as a
/// `BinaryHeap` key.  Costs in this workspace are never NaN; the total order
/// only makes that explicit to the type system.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Cost(pub f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}
