//! Canonical range decomposition over a perfect binary tree stored in heap order.
//!
//! Node `1` is the root, node `k` has children `2k` and `2k + 1`, and the leaves of a
//! tree with `size` leaves occupy `size..2 * size`. Everything here is pure index
//! arithmetic and never touches node values.

use std::ops::Range;

use smallvec::SmallVec;

use crate::util::floor_log2_nonzero;

const INLINE_NODES: usize = 32;

/// Storage indices in the order the climb emits them.
pub type NodeIndices = SmallVec<[usize; INLINE_NODES]>;

/// Canonical nodes in left-to-right order of the positions they cover.
pub type CanonicalNodes = SmallVec<[CanonicalNode; INLINE_NODES]>;

/// A maximal subtree lying entirely inside a query range.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CanonicalNode {
    /// Storage index of the node.
    pub index: usize,
    /// Positions of the original sequence covered by the node, half-open.
    pub span: Range<usize>,
}

/// Moves both endpoints of a leaf-level interval one level toward the root.
///
/// An odd `i` is a right child that has already been emitted, so it steps past its
/// parent; an even `j` is a left child that has already been emitted, so it steps
/// before its parent. Requires `i + 2 <= j`.
#[inline(always)]
pub fn climb_step(i: usize, j: usize) -> (usize, usize) {
    debug_assert!(i + 2 <= j);
    let i_next = (i >> 1) + (i & 1);
    let j_next = (j >> 1) - ((j & 1) ^ 1);
    (i_next, j_next)
}

/// Storage indices whose subtrees exactly partition the leaves `start + size..=end + size`.
///
/// Indices come out in climb order, which interleaves the left and right flanks of the
/// range; use [`canonical_nodes`] when the fold order matters. Requires `size` to be a
/// power of two and `start <= end < size`.
pub fn decompose(size: usize, start: usize, end: usize) -> NodeIndices {
    debug_assert!(size.is_power_of_two());
    debug_assert!(start <= end && end < size);

    let mut nodes = NodeIndices::new();
    let mut i = start + size;
    let mut j = end + size;

    while i <= j {
        if i == j {
            nodes.push(i);
            break;
        }
        if j - i == 1 {
            nodes.push(i);
            nodes.push(j);
            break;
        }
        if (i & 1) == 1 {
            nodes.push(i);
        }
        if (j & 1) == 0 {
            nodes.push(j);
        }
        (i, j) = climb_step(i, j);
    }

    nodes
}

/// Leaf-index span covered by `node`, half-open.
///
/// Requires `1 <= node < 2 * size` and `size` to be a power of two.
#[inline(always)]
pub fn leaf_span(size: usize, node: usize) -> Range<usize> {
    debug_assert!(size.is_power_of_two());
    debug_assert!(node >= 1 && node < 2 * size);
    let height = floor_log2_nonzero(size) - floor_log2_nonzero(node);
    (node << height)..((node + 1) << height)
}

/// Same nodes as [`decompose`], tagged with their covered positions and sorted left to right.
pub fn canonical_nodes(size: usize, start: usize, end: usize) -> CanonicalNodes {
    let mut nodes: CanonicalNodes = decompose(size, start, end)
        .into_iter()
        .map(|index| {
            let leaves = leaf_span(size, index);
            CanonicalNode {
                index,
                span: (leaves.start - size)..(leaves.end - size),
            }
        })
        .collect();
    nodes.sort_unstable_by_key(|node| node.span.start);
    nodes
}

#[cfg(test)]
mod tests {
    use super::{canonical_nodes, climb_step, decompose, leaf_span};

    fn recursive_nodes(
        node: usize,
        lo: usize,
        hi: usize,
        start: usize,
        end: usize,
        out: &mut Vec<usize>,
    ) {
        if end < lo || hi < start {
            return;
        }
        if start <= lo && hi <= end {
            out.push(node);
            return;
        }
        let mid = lo + (hi - lo) / 2;
        recursive_nodes(2 * node, lo, mid, start, end, out);
        recursive_nodes(2 * node + 1, mid + 1, hi, start, end, out);
    }

    fn covered_leaves(size: usize, nodes: &[usize]) -> Vec<usize> {
        let mut leaves: Vec<usize> = nodes
            .iter()
            .flat_map(|&node| leaf_span(size, node))
            .collect();
        leaves.sort_unstable();
        leaves
    }

    #[test]
    fn climb_step_covers_remaining_interval() {
        for i in 1..256_usize {
            for j in (i + 2)..256 {
                let (i_next, j_next) = climb_step(i, j);
                let left = if i % 2 == 1 { i + 1 } else { i };
                let right = if j % 2 == 0 { j - 1 } else { j };
                assert_eq!(2 * i_next, left, "i={i} j={j}");
                assert_eq!(2 * j_next + 1, right, "i={i} j={j}");
                assert!(i_next <= j_next, "i={i} j={j}");
            }
        }
    }

    #[test]
    fn leaf_span_of_root_and_leaves() {
        assert_eq!(leaf_span(8, 1), 8..16);
        assert_eq!(leaf_span(8, 2), 8..12);
        assert_eq!(leaf_span(8, 7), 14..16);
        assert_eq!(leaf_span(8, 13), 13..14);
        assert_eq!(leaf_span(1, 1), 1..2);
    }

    #[test]
    fn single_leaf_tree() {
        assert_eq!(decompose(1, 0, 0).as_slice(), &[1]);
    }

    #[test]
    fn climb_order_differs_from_position_order() {
        assert_eq!(decompose(8, 1, 6).as_slice(), &[9, 14, 5, 6]);

        let sorted = canonical_nodes(8, 1, 6);
        let indices: Vec<usize> = sorted.iter().map(|node| node.index).collect();
        let spans: Vec<_> = sorted.iter().map(|node| node.span.clone()).collect();
        assert_eq!(indices, vec![9, 5, 6, 14]);
        assert_eq!(spans, vec![1..2, 2..4, 4..6, 6..7]);
    }

    #[test]
    fn decomposition_partitions_every_range() {
        for log in 0..=6 {
            let size = 1_usize << log;
            for start in 0..size {
                for end in start..size {
                    let nodes = decompose(size, start, end);
                    let expected: Vec<usize> = (start + size..=end + size).collect();
                    assert_eq!(
                        covered_leaves(size, &nodes),
                        expected,
                        "size={size} start={start} end={end}"
                    );
                    assert!(
                        nodes.len() <= 2 * log + 2,
                        "size={size} start={start} end={end} nodes={}",
                        nodes.len()
                    );
                }
            }
        }
    }

    #[test]
    fn decomposition_refines_recursive_query() {
        for log in 0..=6 {
            let size = 1_usize << log;
            for start in 0..size {
                for end in start..size {
                    let mut reference = Vec::new();
                    recursive_nodes(1, 0, size - 1, start, end, &mut reference);
                    let nodes = decompose(size, start, end);

                    assert_eq!(
                        covered_leaves(size, &nodes),
                        covered_leaves(size, &reference),
                        "size={size} start={start} end={end}"
                    );
                    // Either the same maximal node, or both children of one: the
                    // adjacent-pair shortcut stops before merging siblings.
                    for &node in &nodes {
                        let sibling_pair = node > 1
                            && reference.contains(&(node / 2))
                            && nodes.contains(&(node ^ 1));
                        assert!(
                            reference.contains(&node) || sibling_pair,
                            "size={size} start={start} end={end} node={node}"
                        );
                    }
                    assert!(nodes.len() <= reference.len() + 1);
                }
            }
        }
    }

    #[test]
    fn canonical_nodes_are_contiguous_left_to_right() {
        for log in 0..=5 {
            let size = 1_usize << log;
            for start in 0..size {
                for end in start..size {
                    let nodes = canonical_nodes(size, start, end);
                    let mut cursor = start;
                    for node in &nodes {
                        assert_eq!(node.span.start, cursor, "size={size} start={start} end={end}");
                        cursor = node.span.end;
                    }
                    assert_eq!(cursor, end + 1, "size={size} start={start} end={end}");
                }
            }
        }
    }
}
