//! Gain and stereo panning stages

use std::f32::consts::FRAC_PI_2;

/// Convert decibels to linear amplitude
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Map a 0-100 volume to a linear gain of 0-1.
#[inline]
pub fn volume_to_gain(volume: f32) -> f32 {
    (volume / 100.0).clamp(0.0, 1.0)
}

/// Equal-power stereo panner (`-1` hard left, `1` hard right).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoPanner {
    pan: f32,
}

impl Default for StereoPanner {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl StereoPanner {
    pub fn new(pan: f32) -> Self {
        Self {
            pan: pan.clamp(-1.0, 1.0),
        }
    }

    pub fn pan(&self) -> f32 {
        self.pan
    }

    pub fn set_pan(&mut self, pan: f32) {
        self.pan = pan.clamp(-1.0, 1.0);
    }

    /// Place a mono sample in the stereo field.
    pub fn process_mono(&self, input: f32) -> (f32, f32) {
        let x = (self.pan + 1.0) / 2.0 * FRAC_PI_2;
        (input * x.cos(), input * x.sin())
    }

    /// Re-balance a stereo pair. Centre leaves the pair untouched.
    pub fn process_stereo(&self, left: f32, right: f32) -> (f32, f32) {
        if self.pan <= 0.0 {
            let x = (self.pan + 1.0) * FRAC_PI_2;
            (left + right * x.cos(), right * x.sin())
        } else {
            let x = self.pan * FRAC_PI_2;
            (left * x.cos(), right + left * x.sin())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_1_SQRT_2;
    use test_case::test_case;

    #[test]
    fn test_db_to_linear() {
        assert_abs_diff_eq!(db_to_linear(0.0), 1.0);
        assert_abs_diff_eq!(db_to_linear(-6.0), 0.501, epsilon = 1e-3);
        assert_abs_diff_eq!(db_to_linear(20.0), 10.0, epsilon = 1e-4);
    }

    #[test_case(0.0, 0.0)]
    #[test_case(50.0, 0.5)]
    #[test_case(100.0, 1.0)]
    #[test_case(150.0, 1.0)]
    #[test_case(-5.0, 0.0)]
    fn test_volume_to_gain(volume: f32, gain: f32) {
        assert_abs_diff_eq!(volume_to_gain(volume), gain);
    }

    #[test]
    fn test_mono_pan_is_equal_power() {
        let centre = StereoPanner::new(0.0).process_mono(1.0);
        assert_abs_diff_eq!(centre.0, FRAC_1_SQRT_2, epsilon = 1e-6);
        assert_abs_diff_eq!(centre.1, FRAC_1_SQRT_2, epsilon = 1e-6);

        for pan in [-1.0, -0.3, 0.4, 1.0] {
            let (l, r) = StereoPanner::new(pan).process_mono(1.0);
            assert_abs_diff_eq!(l * l + r * r, 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_hard_pans() {
        let (l, r) = StereoPanner::new(-1.0).process_mono(1.0);
        assert_abs_diff_eq!(l, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(r, 0.0, epsilon = 1e-6);

        let (l, r) = StereoPanner::new(1.0).process_stereo(0.5, 0.25);
        assert_abs_diff_eq!(l, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(r, 0.75, epsilon = 1e-6);
    }

    #[test]
    fn test_stereo_centre_is_transparent() {
        let (l, r) = StereoPanner::default().process_stereo(0.5, -0.25);
        assert_abs_diff_eq!(l, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(r, -0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_pan_is_clamped() {
        assert_eq!(StereoPanner::new(4.0).pan(), 1.0);
    }
}
