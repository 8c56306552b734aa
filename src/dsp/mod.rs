//! Audio Studio DSP
//!
//! Sample processing for the standalone mixing workspace: three-band EQ,
//! equal-power panning, gain staging, the per-track mixing graph and WAV I/O.

mod biquad;
mod buffer;
mod gain;
mod graph;
mod io;
mod studio;

pub use biquad::{
    Biquad, FilterType, ThreeBandEq, EQ_RANGE_DB, HIGH_SHELF_HZ, LOW_SHELF_HZ, MID_PEAK_HZ,
    MID_PEAK_Q,
};
pub use buffer::{sine_tone, AudioBuffer};
pub use gain::{db_to_linear, volume_to_gain, StereoPanner};
pub use graph::MixingGraph;
pub use io::{export_wav, import_wav};
pub use studio::{AudioStudio, EqBand, StudioTrack};
