//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where 
    T: Float 
{
    target_range.0 
        + ((value - source_range.0) 
        * (target_range.1 - target_range.0) 
        / (source_range.1 - source_range.0))
}

/// Linearly interpolate between `a` and `b` by the fraction `t`.
///
/// `t` is not clamped, callers wanting saturation should clamp first.
pub fn lerp<T>(a: T, b: T, t: T) -> T
where
    T: Float
{
    a * (T::one() - t) + b * t
}

pub fn clamp<T>(value: &T, min: &T, max: &T) -> T 
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Wrap an angle into the range [-pi, pi).
///
/// Used for continuous-input controllers where an error of `2pi - e` is the
/// same as an error of `-e`.
pub fn wrap_to_pi<T>(angle: T) -> T
where
    T: Float
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    rem_euclid(angle + pi_t, tau_t) - pi_t
}

/// Get the shortest signed angular distance to go from `from` to `to`.
///
/// Positive results mean `to` lies anticlockwise of `from`.
pub fn ang_dist<T>(from: T, to: T) -> T
where
    T: Float
{
    wrap_to_pi(to - from)
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;

    #[test]
    fn test_wrap_to_pi() {
        assert!((wrap_to_pi(0.5f64) - 0.5).abs() < 1e-12);
        assert!((wrap_to_pi(PI + 0.5) - (-PI + 0.5)).abs() < 1e-12);
        assert!((wrap_to_pi(-PI - 0.5) - (PI - 0.5)).abs() < 1e-12);
        assert!((wrap_to_pi(4.0 * PI + 0.1) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_ang_dist_across_boundary() {
        // From 3.0 rad to -3.0 rad is a short anticlockwise hop over pi
        let d = ang_dist(3.0f64, -3.0f64);
        assert!((d - (2.0 * PI - 6.0)).abs() < 1e-12);
        assert!(d > 0.0 && d < 0.3);

        assert!((ang_dist(-3.0f64, 3.0f64) + (2.0 * PI - 6.0)).abs() < 1e-12);
    }

    #[test]
    fn test_lerp_and_map() {
        assert_eq!(lerp(1.0f64, 3.0, 0.0), 1.0);
        assert_eq!(lerp(1.0f64, 3.0, 1.0), 3.0);
        assert_eq!(lerp(1.0f64, 3.0, 0.5), 2.0);
        assert_eq!(lin_map((0.0f64, 12.0), (0.0, 1.0), 6.0), 0.5);
        assert_eq!(clamp(&5.0f64, &0.0, &1.0), 1.0);
        assert_eq!(clamp(&-5.0f64, &0.0, &1.0), 0.0);
    }
}
