//! Static range aggregation over an immutable sequence.
//!
//! [`RangeAggregator`] answers inclusive range queries for any associative
//! [`Combiner`] in `O(log n)` after an `O(n)` build.

mod aggregator;
mod combiner;
mod decompose;
mod error;
mod util;

pub use aggregator::RangeAggregator;
pub use combiner::{BitOr, Combiner, FnCombiner, Gcd, Max, Min, Sum, from_fn, verify_identity};
pub use decompose::{
    CanonicalNode, CanonicalNodes, NodeIndices, canonical_nodes, climb_step, decompose, leaf_span,
};
pub use error::{RangeAggError, Result};
