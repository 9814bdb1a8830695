//! Associative combiners paired with their identity elements.

use std::fmt;

use crate::error::{RangeAggError, Result};
use crate::util::BinaryGcd;

/// An associative binary operation over `T` together with its identity element.
///
/// Implementations must satisfy:
/// - `combine(combine(a, b), c) == combine(a, combine(b, c))`
/// - `combine(identity(), x) == x == combine(x, identity())`
///
/// Commutativity is not required: queries fold canonical nodes in left-to-right
/// order. An identity that is not neutral cannot be detected by the aggregator and
/// corrupts every query touching the padded leaves; see [`verify_identity`].
pub trait Combiner<T> {
    fn identity(&self) -> T;
    fn combine(&self, lhs: &T, rhs: &T) -> T;
}

impl<T, C> Combiner<T> for &C
where
    C: Combiner<T> + ?Sized,
{
    #[inline(always)]
    fn identity(&self) -> T {
        (**self).identity()
    }

    #[inline(always)]
    fn combine(&self, lhs: &T, rhs: &T) -> T {
        (**self).combine(lhs, rhs)
    }
}

/// Addition. Identity `0`. Integers wrap on overflow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sum;

/// Minimum. Identity `MAX` (`+∞` for floats).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Min;

/// Maximum. Identity `MIN` (`-∞` for floats).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Max;

/// Greatest common divisor over unsigned integers. Identity `0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Gcd;

/// Bitwise or. Identity `0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BitOr;

macro_rules! impl_integer_combiners {
    ($($t:ty),* $(,)?) => {$(
        impl Combiner<$t> for Sum {
            #[inline(always)]
            fn identity(&self) -> $t {
                0
            }

            #[inline(always)]
            fn combine(&self, lhs: &$t, rhs: &$t) -> $t {
                lhs.wrapping_add(*rhs)
            }
        }

        impl Combiner<$t> for Min {
            #[inline(always)]
            fn identity(&self) -> $t {
                <$t>::MAX
            }

            #[inline(always)]
            fn combine(&self, lhs: &$t, rhs: &$t) -> $t {
                (*lhs).min(*rhs)
            }
        }

        impl Combiner<$t> for Max {
            #[inline(always)]
            fn identity(&self) -> $t {
                <$t>::MIN
            }

            #[inline(always)]
            fn combine(&self, lhs: &$t, rhs: &$t) -> $t {
                (*lhs).max(*rhs)
            }
        }

        impl Combiner<$t> for BitOr {
            #[inline(always)]
            fn identity(&self) -> $t {
                0
            }

            #[inline(always)]
            fn combine(&self, lhs: &$t, rhs: &$t) -> $t {
                lhs | rhs
            }
        }
    )*};
}

macro_rules! impl_gcd_combiner {
    ($($t:ty),* $(,)?) => {$(
        impl Combiner<$t> for Gcd {
            #[inline(always)]
            fn identity(&self) -> $t {
                0
            }

            #[inline(always)]
            fn combine(&self, lhs: &$t, rhs: &$t) -> $t {
                lhs.gcd_binary(*rhs)
            }
        }
    )*};
}

macro_rules! impl_float_combiners {
    ($($t:ty),* $(,)?) => {$(
        impl Combiner<$t> for Sum {
            #[inline(always)]
            fn identity(&self) -> $t {
                0.0
            }

            #[inline(always)]
            fn combine(&self, lhs: &$t, rhs: &$t) -> $t {
                lhs + rhs
            }
        }

        impl Combiner<$t> for Min {
            #[inline(always)]
            fn identity(&self) -> $t {
                <$t>::INFINITY
            }

            #[inline(always)]
            fn combine(&self, lhs: &$t, rhs: &$t) -> $t {
                lhs.min(*rhs)
            }
        }

        impl Combiner<$t> for Max {
            #[inline(always)]
            fn identity(&self) -> $t {
                <$t>::NEG_INFINITY
            }

            #[inline(always)]
            fn combine(&self, lhs: &$t, rhs: &$t) -> $t {
                lhs.max(*rhs)
            }
        }
    )*};
}

impl_integer_combiners!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_gcd_combiner!(u8, u16, u32, u64, u128, usize);
impl_float_combiners!(f32, f64);

/// A combiner built from a closure and an explicit identity element.
#[derive(Clone)]
pub struct FnCombiner<T, F> {
    identity: T,
    op: F,
}

impl<T, F> FnCombiner<T, F>
where
    F: Fn(&T, &T) -> T,
{
    pub fn new(identity: T, op: F) -> Self {
        Self { identity, op }
    }
}

impl<T, F> Combiner<T> for FnCombiner<T, F>
where
    T: Clone,
    F: Fn(&T, &T) -> T,
{
    #[inline(always)]
    fn identity(&self) -> T {
        self.identity.clone()
    }

    #[inline(always)]
    fn combine(&self, lhs: &T, rhs: &T) -> T {
        (self.op)(lhs, rhs)
    }
}

impl<T: fmt::Debug, F> fmt::Debug for FnCombiner<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCombiner")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// Shorthand for [`FnCombiner::new`].
pub fn from_fn<T, F>(identity: T, op: F) -> FnCombiner<T, F>
where
    F: Fn(&T, &T) -> T,
{
    FnCombiner::new(identity, op)
}

/// Spot-checks that the combiner's identity is neutral on both sides of every sample.
///
/// This only tests the given samples; passing does not prove the identity law.
/// Samples that are not equal to themselves (such as `NaN`) are reported as mismatches.
pub fn verify_identity<T, C>(combiner: &C, samples: &[T]) -> Result<()>
where
    T: PartialEq,
    C: Combiner<T> + ?Sized,
{
    let identity = combiner.identity();
    for (position, sample) in samples.iter().enumerate() {
        let left = combiner.combine(&identity, sample);
        let right = combiner.combine(sample, &identity);
        if left != *sample || right != *sample {
            return Err(RangeAggError::IdentityMismatch { position });
        }
    }
    Ok(())
}
