//! Numeric sequence helpers
//!
//! Small generic utilities for building parameter sweeps, such as a ramp of
//! drive velocities or a run of LED intensities.

use std::iter::Sum;

/// A primitive numeric type that can be stepped through
pub trait Step: Copy + PartialOrd {
    /// Additive identity
    const ZERO: Self;

    /// `self + step`, or `None` if the result is not representable
    fn checked_step(self, step: Self) -> Option<Self>;
}

macro_rules! impl_step_int {
    ($($t:ty),*) => {
        $(
            impl Step for $t {
                const ZERO: Self = 0;

                fn checked_step(self, step: Self) -> Option<Self> {
                    self.checked_add(step)
                }
            }
        )*
    };
}

macro_rules! impl_step_float {
    ($($t:ty),*) => {
        $(
            impl Step for $t {
                const ZERO: Self = 0.0;

                fn checked_step(self, step: Self) -> Option<Self> {
                    let next = self + step;
                    next.is_finite().then_some(next)
                }
            }
        )*
    };
}

impl_step_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_step_float!(f32, f64);

/// Values from `start` towards `stop` (exclusive) in increments of `step`
///
/// A negative step counts down. A zero step, or a step pointing away from
/// `stop`, yields an empty vector.
///
/// ```
/// use createoi_core::sequence::sequence;
///
/// assert_eq!(sequence(0, 10, 2), vec![0, 2, 4, 6, 8]);
/// assert_eq!(sequence(0i16, -10, -2), vec![0, -2, -4, -6, -8]);
/// ```
pub fn sequence<T: Step>(start: T, stop: T, step: T) -> Vec<T> {
    let mut values = Vec::new();
    if step == T::ZERO {
        return values;
    }

    let descending = step < T::ZERO;
    let mut current = start;
    loop {
        let in_range = if descending {
            current > stop
        } else {
            current < stop
        };
        if !in_range {
            break;
        }
        values.push(current);

        match current.checked_step(step) {
            Some(next) => current = next,
            None => break,
        }
    }
    values
}

/// Sum of all values
pub fn sum<T: Copy + Sum<T>>(values: &[T]) -> T {
    values.iter().copied().sum()
}
