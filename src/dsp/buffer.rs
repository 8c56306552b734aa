//! Planar audio buffer used by the audio studio.

use crate::error::{CutlineError, Result};

/// Planar (one `Vec` per channel) 32-bit float audio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Silent buffer.
    pub fn new(num_channels: usize, num_frames: usize, sample_rate: u32) -> Self {
        Self {
            channels: vec![vec![0.0; num_frames]; num_channels.max(1)],
            sample_rate,
        }
    }

    /// Wrap existing channel data; every channel must have the same length.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        let Some(frames) = channels.first().map(Vec::len) else {
            return Err(CutlineError::InvalidAudio {
                reason: "buffer has no channels".to_string(),
                source: None,
            });
        };
        if channels.iter().any(|c| c.len() != frames) {
            return Err(CutlineError::InvalidAudio {
                reason: "channels differ in length".to_string(),
                source: None,
            });
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn num_frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration(&self) -> f64 {
        self.num_frames() as f64 / f64::from(self.sample_rate)
    }

    pub fn is_empty(&self) -> bool {
        self.num_frames() == 0
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.channels[index]
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Sample at `frame`, or silence past the end.
    pub fn sample(&self, channel: usize, frame: usize) -> f32 {
        self.channels
            .get(channel)
            .and_then(|c| c.get(frame))
            .copied()
            .unwrap_or(0.0)
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flat_map(|c| c.iter())
            .fold(0.0_f32, |acc, s| acc.max(s.abs()))
    }

    /// RMS of one channel.
    pub fn rms(&self, channel: usize) -> f32 {
        let data = &self.channels[channel];
        if data.is_empty() {
            return 0.0;
        }
        let sum: f64 = data.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
        (sum / data.len() as f64).sqrt() as f32
    }
}

/// Sine test tone, mono.
pub fn sine_tone(frequency: f32, duration_secs: f32, sample_rate: u32) -> AudioBuffer {
    let frames = (duration_secs * sample_rate as f32) as usize;
    let step = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;
    let data = (0..frames).map(|i| (step * i as f32).sin()).collect();
    AudioBuffer {
        channels: vec![data],
        sample_rate,
    }
}
