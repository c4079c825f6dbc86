//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0) * (target_range.1 - target_range.0)
            / (source_range.1 - source_range.0))
}

/// Clamp a value into the range `[min, max]`.
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

/// Number of scan cells needed to cover a stroke of `max` with steps of
/// `step`, i.e. `ceil(max / step)`.
pub fn num_steps(max: f64, step: f64) -> i64 {
    (max / step).ceil() as i64
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0.0, 1.0), (0.0, 10.0), 0.5), 5.0);
        assert_eq!(lin_map((-1.0, 1.0), (0.0, 1.0), 0.0), 0.5);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(1.5, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-0.5, 0.0, 1.0), 0.0);
        assert_eq!(clamp(0.25, 0.0, 1.0), 0.25);
    }

    #[test]
    fn test_num_steps() {
        // 20 m stroke in 2 m steps -> 10 cells beyond the origin
        assert_eq!(num_steps(20.0, 2.0), 10);
        assert_eq!(num_steps(5.0, 1.0), 5);
        // Partial final cell still counts
        assert_eq!(num_steps(9.5, 2.0), 5);
        assert_eq!(num_steps(2.5, 2.0), 2);
        // Sub-metre steps
        assert_eq!(num_steps(5.0, 0.5), 10);
        assert_eq!(num_steps(1.0, 0.3), 4);
    }
}
