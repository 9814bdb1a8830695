use thiserror::Error;

/// Error type returned by construction, queries and identity checks.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RangeAggError {
    /// The input sequence was empty.
    #[error("input sequence must be non-empty")]
    EmptyInput,

    /// Query bounds were reversed or reached past the end of the sequence.
    #[error("invalid range [{start}, {end}] for sequence of length {len}")]
    InvalidRange {
        /// Inclusive start of the rejected range.
        start: usize,
        /// Inclusive end of the rejected range.
        end: usize,
        /// Length of the unpadded sequence.
        len: usize,
    },

    /// The identity element was not neutral for the sample at `position`.
    #[error("identity element is not neutral for the sample at position {position}")]
    IdentityMismatch {
        /// Index of the first offending sample.
        position: usize,
    },
}

pub type Result<T> = std::result::Result<T, RangeAggError>;
