use std::ops::{Bound, RangeBounds};

use tracing::{debug, trace};

use crate::combiner::Combiner;
use crate::decompose::{CanonicalNodes, canonical_nodes};
use crate::error::{RangeAggError, Result};

/// Static range aggregation over a perfect binary tree of combined values.
///
/// The input is padded with the combiner's identity up to the next power of two
/// `size`; leaves live at `size..2 * size` and every internal node `k` holds
/// `combine(tree[2k], tree[2k + 1])`. The tree is never modified after construction.
#[derive(Clone, Debug)]
pub struct RangeAggregator<T, C> {
    len: usize,
    size: usize,
    tree: Vec<T>,
    combiner: C,
}

impl<T, C> RangeAggregator<T, C>
where
    C: Combiner<T>,
{
    /// Builds the tree from a copy of `values`.
    pub fn new(values: &[T], combiner: C) -> Result<Self>
    where
        T: Clone,
    {
        Self::from_vec(values.to_vec(), combiner)
    }

    /// Builds the tree, taking ownership of `values`.
    pub fn from_vec(values: Vec<T>, combiner: C) -> Result<Self> {
        let len = values.len();
        if len == 0 {
            debug!("rejecting range aggregator build over empty input");
            return Err(RangeAggError::EmptyInput);
        }

        let size = len.next_power_of_two();
        let mut tree = Vec::with_capacity(2 * size);
        // Slot 0 and the internal nodes are placeholders until the bottom-up pass.
        tree.extend((0..size).map(|_| combiner.identity()));
        tree.extend(values);
        tree.extend((len..size).map(|_| combiner.identity()));
        debug_assert_eq!(tree.len(), 2 * size);

        for i in (1..size).rev() {
            tree[i] = combiner.combine(&tree[2 * i], &tree[2 * i + 1]);
        }

        debug!(len, size, nodes = tree.len(), "built range aggregator");

        Ok(Self {
            len,
            size,
            tree,
            combiner,
        })
    }

    /// Number of values in the original, unpadded sequence.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false` for a built aggregator, since empty input is rejected.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of leaves after padding: the smallest power of two `>= len()`.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn combiner(&self) -> &C {
        &self.combiner
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len {
            Some(&self.tree[self.size + index])
        } else {
            None
        }
    }

    /// The original sequence, without padding.
    pub fn values(&self) -> &[T] {
        &self.tree[self.size..self.size + self.len]
    }

    /// Raw storage access by heap index; `None` for slot 0 and indices past the leaves.
    pub fn node(&self, index: usize) -> Option<&T> {
        if index == 0 {
            return None;
        }
        self.tree.get(index)
    }

    /// Aggregate of the whole sequence.
    pub fn total(&self) -> &T {
        &self.tree[1]
    }

    /// Canonical nodes covering `start..=end`, ordered by the positions they cover.
    pub fn canonical_nodes(&self, start: usize, end: usize) -> Result<CanonicalNodes> {
        self.check_range(start, end)?;
        Ok(canonical_nodes(self.size, start, end))
    }

    /// Aggregate of the inclusive range `start..=end`.
    pub fn range_aggregate(&self, start: usize, end: usize) -> Result<T>
    where
        T: Clone,
    {
        let nodes = self.canonical_nodes(start, end)?;
        let mut values = nodes.iter().map(|node| &self.tree[node.index]);
        let Some(first) = values.next() else {
            return Ok(self.combiner.identity());
        };
        Ok(values.fold(first.clone(), |acc, value| {
            self.combiner.combine(&acc, value)
        }))
    }

    /// Aggregate over any `usize` range expression.
    ///
    /// Empty, reversed or out-of-bounds ranges are rejected like in
    /// [`range_aggregate`](Self::range_aggregate).
    pub fn fold<R: RangeBounds<usize>>(&self, range: R) -> Result<T>
    where
        T: Clone,
    {
        let (start, end) = self.normalize_range(range)?;
        self.range_aggregate(start, end)
    }

    fn check_range(&self, start: usize, end: usize) -> Result<()> {
        if start > end || end >= self.len {
            trace!(start, end, len = self.len, "rejecting range query");
            return Err(RangeAggError::InvalidRange {
                start,
                end,
                len: self.len,
            });
        }
        Ok(())
    }

    /// Converts range bounds to an inclusive, non-empty `(start, end)` pair.
    fn normalize_range<R: RangeBounds<usize>>(&self, range: R) -> Result<(usize, usize)> {
        let start = match range.start_bound() {
            Bound::Included(&start) => Some(start),
            Bound::Excluded(&start) => start.checked_add(1),
            Bound::Unbounded => Some(0),
        };
        let end = match range.end_bound() {
            Bound::Included(&end) => Some(end),
            Bound::Excluded(&end) => end.checked_sub(1),
            Bound::Unbounded => Some(self.len - 1),
        };

        match (start, end) {
            (Some(start), Some(end)) => {
                self.check_range(start, end)?;
                Ok((start, end))
            }
            _ => {
                let start = start.unwrap_or(usize::MAX);
                let end = end.unwrap_or(usize::MAX);
                trace!(start, end, len = self.len, "rejecting range query");
                Err(RangeAggError::InvalidRange {
                    start,
                    end,
                    len: self.len,
                })
            }
        }
    }
}
