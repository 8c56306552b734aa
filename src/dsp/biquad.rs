//! Three-band EQ
//!
//! Biquad shelving and peaking filters (Audio EQ Cookbook) arranged as the
//! fixed studio chain: low shelf, mid peak, high shelf.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// Low shelf corner frequency.
pub const LOW_SHELF_HZ: f64 = 320.0;
/// Mid peak center frequency.
pub const MID_PEAK_HZ: f64 = 1000.0;
/// Mid peak bandwidth.
pub const MID_PEAK_Q: f64 = 0.5;
/// High shelf corner frequency.
pub const HIGH_SHELF_HZ: f64 = 3200.0;
/// Band gain range, +/- dB.
pub const EQ_RANGE_DB: f32 = 12.0;

/// Filter shapes used by the studio EQ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowShelf,
    Peak,
    HighShelf,
}

/// Normalized biquad coefficients (divided by a0).
#[derive(Debug, Clone, Copy, PartialEq)]
struct BiquadCoeffs {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl BiquadCoeffs {
    const BYPASS: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    fn calculate(filter_type: FilterType, sample_rate: f64, frequency: f64, gain_db: f64, q: f64) -> Self {
        let freq = frequency.clamp(20.0, sample_rate / 2.0 - 1.0);
        let w0 = 2.0 * PI * freq / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);
        let a = 10.0_f64.powf(gain_db / 40.0);

        let (b0, b1, b2, a0, a1, a2) = match filter_type {
            FilterType::Peak => (
                1.0 + alpha * a,
                -2.0 * cos_w0,
                1.0 - alpha * a,
                1.0 + alpha / a,
                -2.0 * cos_w0,
                1.0 - alpha / a,
            ),
            FilterType::LowShelf => {
                let k = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) - (a - 1.0) * cos_w0 + k),
                    2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w0),
                    a * ((a + 1.0) - (a - 1.0) * cos_w0 - k),
                    (a + 1.0) + (a - 1.0) * cos_w0 + k,
                    -2.0 * ((a - 1.0) + (a + 1.0) * cos_w0),
                    (a + 1.0) + (a - 1.0) * cos_w0 - k,
                )
            }
            FilterType::HighShelf => {
                let k = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) + (a - 1.0) * cos_w0 + k),
                    -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w0),
                    a * ((a + 1.0) + (a - 1.0) * cos_w0 - k),
                    (a + 1.0) - (a - 1.0) * cos_w0 + k,
                    2.0 * ((a - 1.0) - (a + 1.0) * cos_w0),
                    (a + 1.0) - (a - 1.0) * cos_w0 - k,
                )
            }
        };

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }
}

/// Delay line for one channel.
#[derive(Debug, Clone, Copy, Default)]
struct BiquadState {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl BiquadState {
    fn process(&mut self, input: f64, c: &BiquadCoeffs) -> f64 {
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;
        output
    }
}

/// One stereo biquad stage.
#[derive(Debug, Clone)]
pub struct Biquad {
    filter_type: FilterType,
    frequency: f64,
    q: f64,
    gain_db: f32,
    sample_rate: f64,
    coeffs: BiquadCoeffs,
    states: [BiquadState; 2],
}

impl Biquad {
    pub fn new(filter_type: FilterType, frequency: f64, q: f64, sample_rate: u32) -> Self {
        Self {
            filter_type,
            frequency,
            q,
            gain_db: 0.0,
            sample_rate: f64::from(sample_rate),
            coeffs: BiquadCoeffs::BYPASS,
            states: [BiquadState::default(); 2],
        }
    }

    /// Set band gain, clamped to the EQ range.
    pub fn set_gain_db(&mut self, gain_db: f32) {
        self.gain_db = gain_db.clamp(-EQ_RANGE_DB, EQ_RANGE_DB);
        self.coeffs = if self.gain_db.abs() < 0.01 {
            BiquadCoeffs::BYPASS
        } else {
            BiquadCoeffs::calculate(
                self.filter_type,
                self.sample_rate,
                self.frequency,
                f64::from(self.gain_db),
                self.q,
            )
        };
    }

    pub fn gain_db(&self) -> f32 {
        self.gain_db
    }

    pub fn is_bypass(&self) -> bool {
        self.coeffs == BiquadCoeffs::BYPASS
    }

    pub fn process(&mut self, sample: f32, channel: usize) -> f32 {
        let state = &mut self.states[channel.min(1)];
        state.process(f64::from(sample), &self.coeffs) as f32
    }

    pub fn reset(&mut self) {
        self.states = [BiquadState::default(); 2];
    }
}

/// Low shelf, mid peak, high shelf in series.
#[derive(Debug, Clone)]
pub struct ThreeBandEq {
    pub low: Biquad,
    pub mid: Biquad,
    pub high: Biquad,
}

impl ThreeBandEq {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            low: Biquad::new(FilterType::LowShelf, LOW_SHELF_HZ, FRAC_1_SQRT_2, sample_rate),
            mid: Biquad::new(FilterType::Peak, MID_PEAK_HZ, MID_PEAK_Q, sample_rate),
            high: Biquad::new(FilterType::HighShelf, HIGH_SHELF_HZ, FRAC_1_SQRT_2, sample_rate),
        }
    }

    pub fn set_gains(&mut self, low_db: f32, mid_db: f32, high_db: f32) {
        self.low.set_gain_db(low_db);
        self.mid.set_gain_db(mid_db);
        self.high.set_gain_db(high_db);
    }

    pub fn process(&mut self, sample: f32, channel: usize) -> f32 {
        let s = self.low.process(sample, channel);
        let s = self.mid.process(s, channel);
        self.high.process(s, channel)
    }

    pub fn reset(&mut self) {
        self.low.reset();
        self.mid.reset();
        self.high.reset();
    }
}
