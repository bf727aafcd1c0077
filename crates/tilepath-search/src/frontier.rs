//! Best-first selection over the open table.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Reference into the open table, ordered so that `BinaryHeap` (a max-heap)
/// pops the best candidate first: lowest score, then lowest move cost, then
/// lowest cell index. That is the node a row-major scan of the table keeping
/// the first strict improvement would pick.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NodeRef {
    pub(crate) idx: usize,
    pub(crate) score: f32,
    pub(crate) move_cost: f32,
}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.move_cost.total_cmp(&self.move_cost))
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NodeRef {}

/// Heap of open-table references with lazy invalidation: an entry is live
/// only while the open node it points at is active and still carries the
/// move cost recorded in the entry.
#[derive(Debug, Default)]
pub(crate) struct Frontier {
    heap: BinaryHeap<NodeRef>,
}

impl Frontier {
    pub(crate) fn push(&mut self, idx: usize, score: f32, move_cost: f32) {
        self.heap.push(NodeRef {
            idx,
            score,
            move_cost,
        });
    }

    /// Pop the best live entry. `current_cost` returns the move cost of the
    /// open node at an index, or `None` if that node is inactive.
    pub(crate) fn pop_live(&mut self, current_cost: impl Fn(usize) -> Option<f32>) -> Option<usize> {
        while let Some(entry) = self.heap.pop() {
            match current_cost(entry.idx) {
                Some(cost) if cost.to_bits() == entry.move_cost.to_bits() => return Some(entry.idx),
                _ => continue,
            }
        }
        None
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowest_score_first() {
        let mut f = Frontier::default();
        f.push(0, 5.0, 1.0);
        f.push(1, 3.0, 2.0);
        f.push(2, 4.0, 0.0);
        let all = |_: usize| Some(0.0f32);
        let costs = [1.0, 2.0, 0.0];
        let live = |i: usize| Some(costs[i]);
        assert_eq!(f.pop_live(live), Some(1));
        assert_eq!(f.pop_live(live), Some(2));
        assert_eq!(f.pop_live(live), Some(0));
        assert_eq!(f.pop_live(all), None);
    }

    #[test]
    fn ties_prefer_lower_move_cost_then_index() {
        let mut f = Frontier::default();
        f.push(7, 6.0, 4.0);
        f.push(3, 6.0, 2.0);
        f.push(9, 6.0, 2.0);
        let costs = |i: usize| Some(if i == 7 { 4.0 } else { 2.0 });
        assert_eq!(f.pop_live(costs), Some(3));
        assert_eq!(f.pop_live(costs), Some(9));
        assert_eq!(f.pop_live(costs), Some(7));
    }

    #[test]
    fn stale_entries_are_skipped() {
        let mut f = Frontier::default();
        // Node 4 was pushed at cost 3, then improved to cost 2.
        f.push(4, 5.0, 3.0);
        f.push(4, 4.0, 2.0);
        // Node 5 has left the open table.
        f.push(5, 1.0, 1.0);
        assert_eq!(f.len(), 3);

        let live = |i: usize| if i == 4 { Some(2.0) } else { None };
        assert_eq!(f.pop_live(live), Some(4));
        assert_eq!(f.pop_live(live), None);
    }
}
