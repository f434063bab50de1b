//! Search bookkeeping: a node arena and an insertion-ordered min-heap.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A node recorded during one search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node<S> {
    /// Search state, e.g. a cell or a `(cell, time)` pair.
    pub state: S,
    /// Arena index of the node this one was expanded from.
    pub parent: Option<usize>,
    /// Cost from the start.
    pub g: f64,
}

/// Growable node pool; parents are indices into the same pool.
///
/// One arena lives for exactly one search call.
#[derive(Clone, Debug)]
pub struct NodeArena<S> {
    nodes: Vec<Node<S>>,
}

impl<S: Copy> NodeArena<S> {
    /// An empty arena.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Append a node and return its index.
    pub fn push(&mut self, state: S, parent: Option<usize>, g: f64) -> usize {
        self.nodes.push(Node { state, parent, g });
        self.nodes.len() - 1
    }

    /// The node at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` was not returned by [`push`](Self::push).
    pub fn get(&self, index: usize) -> &Node<S> {
        &self.nodes[index]
    }

    /// Number of recorded nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// States from the root to `index`, root first.
    pub fn trace(&self, index: usize) -> Vec<S> {
        let mut out = Vec::new();
        let mut cursor = Some(index);
        while let Some(i) = cursor {
            let node = &self.nodes[i];
            out.push(node.state);
            cursor = node.parent;
        }
        out.reverse();
        out
    }
}

impl<S: Copy> Default for NodeArena<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Heap entry: reversed ordering so the max-heap yields the smallest `f`,
/// then the earliest insertion.
#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    f: f64,
    seq: u64,
    node: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

/// Open list for best-first search.
///
/// Pops the lowest `f`; among equal `f`, the entry pushed first.
#[derive(Clone, Debug, Default)]
pub struct Frontier {
    heap: BinaryHeap<OpenEntry>,
    seq: u64,
}

impl Frontier {
    /// An empty frontier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue arena node `node` with priority `f`.
    pub fn push(&mut self, f: f64, node: usize) {
        self.heap.push(OpenEntry {
            f,
            seq: self.seq,
            node,
        });
        self.seq += 1;
    }

    /// Remove and return the best node index.
    pub fn pop(&mut self) -> Option<usize> {
        self.heap.pop().map(|e| e.node)
    }

    /// Entries still queued.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_f_pops_in_insertion_order() {
        let mut f = Frontier::new();
        f.push(3.0, 10);
        f.push(1.0, 11);
        f.push(3.0, 12);
        f.push(1.0, 13);
        let order: Vec<usize> = std::iter::from_fn(|| f.pop()).collect();
        assert_eq!(order, vec![11, 13, 10, 12]);
    }

    #[test]
    fn arena_traces_root_first() {
        let mut a = NodeArena::new();
        let r = a.push('a', None, 0.0);
        let b = a.push('b', Some(r), 1.0);
        let _ = a.push('x', Some(r), 1.0);
        let c = a.push('c', Some(b), 2.0);
        assert_eq!(a.trace(c), vec!['a', 'b', 'c']);
        assert_eq!(a.len(), 4);
        assert_eq!(a.get(c).g, 2.0);
    }
}
