//! Time helpers for the master timeline.
//!
//! Positions and durations are plain `f64` seconds. Open-ended windows use
//! `f64::INFINITY` as their stop instant, so the helpers here must stay total
//! over non-finite inputs instead of assuming a closed range.

use crate::error::TimelineError;

/// Stop instant for a window that runs to the end of the scene.
pub const OPEN_END: f64 = f64::INFINITY;

/// Validate a timeline position supplied by the host.
///
/// Non-finite input is rejected; negative input is clamped to zero so that
/// backward scrubs past the origin land on the initial state.
#[inline]
pub fn validate_position(seconds: f64) -> Result<f64, TimelineError> {
    if !seconds.is_finite() {
        return Err(TimelineError::InvalidTime { time: seconds });
    }
    Ok(seconds.max(0.0))
}

/// Euclidean-style wrap of `t` into `[0, period)`.
///
/// A non-positive period yields 0, so zero-duration repeat clips read as
/// constantly at their first frame rather than propagating NaN.
#[inline]
pub fn wrap(t: f64, period: f64) -> f64 {
    if period <= 0.0 {
        return 0.0;
    }
    let m = t % period;
    if m < 0.0 {
        m + period
    } else {
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_validate_position() {
        assert_eq!(validate_position(1.5).unwrap(), 1.5);
        assert_eq!(validate_position(-0.25).unwrap(), 0.0);
        assert!(validate_position(f64::NAN).is_err());
        assert!(validate_position(f64::INFINITY).is_err());
    }

    #[test]
    fn test_wrap() {
        assert_abs_diff_eq!(wrap(7.0, 5.0), 2.0);
        assert_abs_diff_eq!(wrap(10.0, 5.0), 0.0);
        assert_abs_diff_eq!(wrap(5.5, 5.0), 0.5);
        assert_abs_diff_eq!(wrap(-1.0, 5.0), 4.0);
    }

    #[test]
    fn test_wrap_degenerate_period() {
        assert_eq!(wrap(3.0, 0.0), 0.0);
        assert_eq!(wrap(3.0, -2.0), 0.0);
    }
}
