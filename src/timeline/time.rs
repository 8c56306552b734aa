//! Time quantization
//!
//! All stored and compared times are rounded to 1e-4 s so repeated
//! split/move edits cannot accumulate floating-point gaps or overlaps.

/// Quantization step in seconds.
pub const TIME_RESOLUTION: f64 = 1e-4;

/// Ruler floor for an empty or short project.
pub const MIN_TIMELINE_EXTENT: f64 = 60.0;

/// Trailing pad after the last clip.
pub const TIMELINE_PAD: f64 = 2.0;

/// Round a time value to the nearest 1e-4 s.
#[inline]
pub fn quantize(seconds: f64) -> f64 {
    (seconds / TIME_RESOLUTION).round() * TIME_RESOLUTION
}

/// Equality at quantization resolution.
#[inline]
pub fn time_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < TIME_RESOLUTION / 2.0
}

/// Timeline extent for the given clip end times.
pub fn timeline_extent<I>(clip_ends: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let last_end = clip_ends
        .into_iter()
        .fold(MIN_TIMELINE_EXTENT, f64::max);
    last_end + TIMELINE_PAD
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_quantize_rounds_to_nearest() {
        assert_abs_diff_eq!(quantize(1.23456), 1.2346, epsilon = 1e-12);
        assert_abs_diff_eq!(quantize(1.23454), 1.2345, epsilon = 1e-12);
        assert_eq!(quantize(0.0), 0.0);
    }

    #[test]
    fn test_quantize_absorbs_drift() {
        let mut t = 0.0;
        for _ in 0..10 {
            t += 0.1;
        }
        assert!(time_eq(quantize(t), 1.0));
        assert!(time_eq(quantize(0.1 + 0.2), 0.3));
    }

    #[test]
    fn test_extent_floor() {
        assert_eq!(timeline_extent(Vec::new()), 62.0);
        assert_eq!(timeline_extent(vec![12.0, 30.0]), 62.0);
    }

    #[test]
    fn test_extent_follows_last_clip() {
        assert_eq!(timeline_extent(vec![75.5, 12.0]), 77.5);
    }
}
