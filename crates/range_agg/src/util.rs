#[inline(always)]
pub(crate) fn floor_log2_nonzero(x: usize) -> u32 {
    debug_assert!(x > 0);
    usize::BITS - 1 - x.leading_zeros()
}

pub(crate) trait BinaryGcd: Copy {
    fn gcd_binary(self, other: Self) -> Self;
}

macro_rules! impl_binary_gcd {
    ($($t:ty),* $(,)?) => {$(
        impl BinaryGcd for $t {
            #[inline]
            fn gcd_binary(self, other: Self) -> Self {
                let mut a = self;
                let mut b = other;
                if a == 0 {
                    return b;
                }
                if b == 0 {
                    return a;
                }

                let shift = (a | b).trailing_zeros();
                a >>= a.trailing_zeros();

                loop {
                    b >>= b.trailing_zeros();
                    if a > b {
                        std::mem::swap(&mut a, &mut b);
                    }
                    b -= a;
                    if b == 0 {
                        return a << shift;
                    }
                }
            }
        }
    )*};
}

impl_binary_gcd!(u8, u16, u32, u64, u128, usize);
