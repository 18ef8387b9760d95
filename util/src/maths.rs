//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp `value` into the range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// Return the euclidian norm (distance between) of two 2D points.
pub fn norm2<T>(point_0: (T, T), point_1: (T, T)) -> T
where
    T: Float,
{
    ((point_0.0 - point_1.0).powi(2) + (point_0.1 - point_1.1).powi(2)).sqrt()
}

/// Arithmetic mean of the values yielded by an iterator, or `None` if it is empty.
pub fn mean<T, I>(values: I) -> Option<T>
where
    T: Float,
    I: IntoIterator<Item = T>,
{
    let mut sum = T::zero();
    let mut count = 0usize;

    for v in values {
        sum = sum + v;
        count += 1;
    }

    if count == 0 {
        None
    } else {
        T::from(count).map(|n| sum / n)
    }
}

/// Get the signed angular distance from `a` to `b`, both in degrees.
///
/// The result is the shortest rotation which takes `a` onto `b`, in the range (-180, 180]. A
/// positive value is an anticlockwise (left) rotation.
pub fn get_ang_dist_deg<T>(a: T, b: T) -> T
where
    T: Float,
{
    let full: T = T::from(360.0).unwrap_or_else(T::max_value);
    let half: T = T::from(180.0).unwrap_or_else(T::max_value);

    let d = rem_euclid(b - a, full);

    if d > half {
        d - full
    } else {
        d
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}
