//! Comparison primitives shared by the filter and sort engines.
//!
//! Every function returns a [`std::cmp::Ordering`] describing `lhs` relative to
//! `rhs`. Filter comparisons keep the behaviour of the native `<`/`>`
//! operators: a NaN on either side compares as `Equal`. Sort comparisons go
//! through [`NumericCompare::cmp_total`], which places NaN after every number
//! so that the sort sees a total order.

use std::cmp::Ordering;

/// Lower bound of the `i64` range expressed exactly as a double (`-2^63`).
const I64_MIN_AS_F64: f64 = -9_223_372_036_854_775_808.0;
/// Upper bound (exclusive) of the `i64` range expressed exactly as a double (`2^63`).
const I64_END_AS_F64: f64 = 9_223_372_036_854_775_808.0;

/// Compares two values of the same numeric type.
#[inline]
pub fn numeric<T: PartialOrd>(lhs: T, rhs: T) -> Ordering {
    if lhs < rhs {
        Ordering::Less
    } else if lhs > rhs {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// Compares a 64-bit integer against a double without losing precision.
///
/// Casting `lhs` to `f64` first would round integers above 2^53 and report
/// unequal values as equal. Instead the double is truncated into integer space
/// when it fits, and only integers that tie with the truncated value are
/// compared as doubles (the tie implies both sides are exactly representable).
pub fn long_to_double(lhs: i64, rhs: f64) -> Ordering {
    if rhs.is_nan() {
        return numeric(lhs as f64, rhs);
    }
    if rhs < I64_MIN_AS_F64 {
        return Ordering::Greater;
    }
    if rhs >= I64_END_AS_F64 {
        return Ordering::Less;
    }

    let truncated = rhs as i64;
    match lhs.cmp(&truncated) {
        Ordering::Equal => numeric(lhs as f64, rhs),
        other => other,
    }
}

/// Compares a double against a 64-bit integer; the mirror of [`long_to_double`].
#[inline]
pub fn double_to_long(lhs: f64, rhs: i64) -> Ordering {
    long_to_double(rhs, lhs).reverse()
}

/// Byte-wise lexicographic comparison of two strings.
#[inline]
pub fn string(lhs: &str, rhs: &str) -> Ordering {
    lhs.as_bytes().cmp(rhs.as_bytes())
}

/// Null-aware numeric comparison: `None` sorts before every present value.
#[inline]
pub fn nullable_numeric<T: NumericCompare>(lhs: Option<T>, rhs: Option<T>) -> Ordering {
    match (lhs, rhs) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(lhs), Some(rhs)) => lhs.cmp_total(rhs),
    }
}

/// Null-aware string comparison: an absent string sorts before every present
/// one, including the empty string.
#[inline]
pub fn nullable_string(lhs: Option<&str>, rhs: Option<&str>) -> Ordering {
    match (lhs, rhs) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(lhs), Some(rhs)) => string(lhs, rhs),
    }
}

/// Cross-kind comparison of a stored numeric value against a filter scalar.
///
/// Integer storage compares against an integer scalar in `i64` space and
/// against a double scalar through [`long_to_double`]. Double storage compares
/// against a double scalar natively and against an integer scalar through
/// [`double_to_long`].
pub trait NumericCompare: Copy + PartialOrd {
    /// Orders `self` relative to an integer scalar.
    fn cmp_long(self, rhs: i64) -> Ordering;

    /// Orders `self` relative to a double scalar.
    fn cmp_double(self, rhs: f64) -> Ordering;

    /// Orders two stored values for sorting.
    #[inline]
    fn cmp_total(self, rhs: Self) -> Ordering {
        numeric(self, rhs)
    }
}

macro_rules! impl_integer_compare {
    ($($ty:ty),*) => {
        $(
            impl NumericCompare for $ty {
                #[inline]
                fn cmp_long(self, rhs: i64) -> Ordering {
                    numeric(i64::from(self), rhs)
                }

                #[inline]
                fn cmp_double(self, rhs: f64) -> Ordering {
                    long_to_double(i64::from(self), rhs)
                }
            }
        )*
    };
}

impl_integer_compare!(i32, u32, i64);

impl NumericCompare for f64 {
    #[inline]
    fn cmp_long(self, rhs: i64) -> Ordering {
        double_to_long(self, rhs)
    }

    #[inline]
    fn cmp_double(self, rhs: f64) -> Ordering {
        numeric(self, rhs)
    }

    // NaN sorts after every number; -0.0 and 0.0 stay equal.
    #[inline]
    fn cmp_total(self, rhs: f64) -> Ordering {
        match (self.is_nan(), rhs.is_nan()) {
            (false, false) => numeric(self, rhs),
            (lhs_nan, rhs_nan) => lhs_nan.cmp(&rhs_nan),
        }
    }
}
