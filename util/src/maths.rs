//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float + std::ops::Mul + std::ops::Add + std::ops::Sub + std::ops::Rem
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() { r + rhs.abs() } else { r }
}

/// Get the shortest signed angular difference `a - b` in degrees.
///
/// The result lies in [-180, 180), so a controller tracking a heading never
/// fights the 359/1 degree boundary.
pub fn wrap_signed_deg<T>(a: T, b: T) -> T
where
    T: Float
{
    let half_turn = T::from(180.0).unwrap();
    let full_turn = T::from(360.0).unwrap();

    rem_euclid(a - b + half_turn, full_turn) - half_turn
}

/// Get the shortest signed angular difference `a - b` in radians.
///
/// The result lies in [-pi, pi).
pub fn wrap_signed_rad<T>(a: T, b: T) -> T
where
    T: Float
{
    let pi_t = T::from(std::f64::consts::PI).unwrap();
    let tau_t = T::from(std::f64::consts::TAU).unwrap();

    rem_euclid(a - b + pi_t, tau_t) - pi_t
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wrap_signed_deg() {
        // Shortest distance across the 0/360 boundary
        assert!((wrap_signed_deg(0f64, 359f64) - 1f64).abs() < 1e-9);
        assert!((wrap_signed_deg(180f64, 179f64) - 1f64).abs() < 1e-9);
        assert!((wrap_signed_deg(359f64, 0f64) + 1f64).abs() < 1e-9);
        assert!((wrap_signed_deg(90f64, 0f64) - 90f64).abs() < 1e-9);
        // Continuous (unbounded) inputs wrap too
        assert!((wrap_signed_deg(720f64, 1f64) + 1f64).abs() < 1e-9);
    }

    #[test]
    fn test_wrap_signed_rad() {
        use std::f64::consts::PI;

        assert!((wrap_signed_rad(0f64, 2.0 * PI - 0.1) - 0.1).abs() < 1e-9);
        assert!((wrap_signed_rad(0.1f64, -0.1f64) - 0.2).abs() < 1e-9);
        assert!((wrap_signed_rad(3.0 * PI, 0f64) + PI).abs() < 1e-9);
    }
}
