//! Audio Mixing Graph
//!
//! Each studio track owns one fixed chain:
//! source -> low shelf -> mid peak -> high shelf -> pan -> gain -> master.
//! Chains are keyed by track id; wiring is idempotent and disconnecting
//! drops every node of the track.

use std::collections::HashMap;

use crate::dsp::biquad::ThreeBandEq;
use crate::dsp::buffer::AudioBuffer;
use crate::dsp::gain::{volume_to_gain, StereoPanner};
use crate::dsp::studio::StudioTrack;

#[derive(Debug, Clone)]
struct ChannelStrip {
    eq: ThreeBandEq,
    panner: StereoPanner,
    gain: f32,
}

impl ChannelStrip {
    fn new(sample_rate: u32) -> Self {
        Self {
            eq: ThreeBandEq::new(sample_rate),
            panner: StereoPanner::default(),
            gain: 1.0,
        }
    }

    fn apply(&mut self, track: &StudioTrack) {
        self.eq.set_gains(track.eq_low, track.eq_mid, track.eq_high);
        self.panner.set_pan(track.pan);
        // Solo is not enforced here.
        self.gain = if track.muted {
            0.0
        } else {
            volume_to_gain(track.volume)
        };
    }
}

#[derive(Debug, Clone)]
pub struct MixingGraph {
    sample_rate: u32,
    strips: HashMap<String, ChannelStrip>,
    master_gain: f32,
}

impl MixingGraph {
    pub fn new(sample_rate: u32, master_volume: f32) -> Self {
        Self {
            sample_rate,
            strips: HashMap::new(),
            master_gain: volume_to_gain(master_volume),
        }
    }

    /// Wire a chain for `track`. Returns `false` if it is already wired.
    pub fn connect(&mut self, track: &StudioTrack) -> bool {
        if self.strips.contains_key(&track.id) {
            return false;
        }
        let mut strip = ChannelStrip::new(self.sample_rate);
        strip.apply(track);
        self.strips.insert(track.id.clone(), strip);
        log::debug!("Mixing graph: connected {}", track.id);
        true
    }

    /// Push changed parameters into an existing chain.
    pub fn update(&mut self, track: &StudioTrack) -> bool {
        match self.strips.get_mut(&track.id) {
            Some(strip) => {
                strip.apply(track);
                true
            }
            None => false,
        }
    }

    pub fn disconnect(&mut self, track_id: &str) -> bool {
        let removed = self.strips.remove(track_id).is_some();
        if removed {
            log::debug!("Mixing graph: disconnected {}", track_id);
        }
        removed
    }

    pub fn disconnect_all(&mut self) {
        self.strips.clear();
    }

    pub fn is_connected(&self, track_id: &str) -> bool {
        self.strips.contains_key(track_id)
    }

    pub fn len(&self) -> usize {
        self.strips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strips.is_empty()
    }

    /// Effective per-track gain (0 when muted).
    pub fn track_gain(&self, track_id: &str) -> Option<f32> {
        self.strips.get(track_id).map(|s| s.gain)
    }

    pub fn master_gain(&self) -> f32 {
        self.master_gain
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_gain = volume_to_gain(volume);
    }

    /// Clear filter memory before a fresh render pass.
    pub fn reset(&mut self) {
        for strip in self.strips.values_mut() {
            strip.eq.reset();
        }
    }

    /// Run `source` through the track's chain and add it into the stereo
    /// `out`. Unwired tracks contribute nothing.
    pub fn render_into(&mut self, track_id: &str, source: &AudioBuffer, out: &mut AudioBuffer) {
        let Some(strip) = self.strips.get_mut(track_id) else {
            return;
        };
        let gain = strip.gain * self.master_gain;
        if gain == 0.0 {
            return;
        }

        let frames = out.num_frames().min(source.num_frames());
        let stereo = source.num_channels() > 1;
        for frame in 0..frames {
            let (left, right) = if stereo {
                let l = strip.eq.process(source.sample(0, frame), 0);
                let r = strip.eq.process(source.sample(1, frame), 1);
                strip.panner.process_stereo(l, r)
            } else {
                let m = strip.eq.process(source.sample(0, frame), 0);
                strip.panner.process_mono(m)
            };
            out.channel_mut(0)[frame] += left * gain;
            out.channel_mut(1)[frame] += right * gain;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn track(id: &str) -> StudioTrack {
        let mut track = StudioTrack::new(id);
        track.id = id.to_string();
        track
    }

    #[test]
    fn test_connect_is_idempotent() {
        let mut graph = MixingGraph::new(48000, 100.0);
        assert!(graph.connect(&track("a")));
        assert!(!graph.connect(&track("a")));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_disconnect_drops_chain() {
        let mut graph = MixingGraph::new(48000, 100.0);
        graph.connect(&track("a"));
        assert!(graph.disconnect("a"));
        assert!(!graph.disconnect("a"));
        assert!(!graph.is_connected("a"));
        assert!(graph.track_gain("a").is_none());
    }

    #[test]
    fn test_mute_forces_zero_gain() {
        let mut graph = MixingGraph::new(48000, 100.0);
        let mut t = track("a");
        t.volume = 80.0;
        graph.connect(&t);
        assert_abs_diff_eq!(graph.track_gain("a").unwrap(), 0.8);

        t.muted = true;
        graph.update(&t);
        assert_eq!(graph.track_gain("a"), Some(0.0));
    }

    #[test]
    fn test_solo_does_not_change_gain() {
        let mut graph = MixingGraph::new(48000, 100.0);
        let mut t = track("a");
        t.solo = true;
        graph.connect(&t);
        graph.connect(&track("b"));
        assert_eq!(graph.track_gain("b"), Some(1.0));
    }

    #[test]
    fn test_render_mono_centre() {
        let mut graph = MixingGraph::new(48000, 50.0);
        graph.connect(&track("a"));
        let source = AudioBuffer::from_channels(vec![vec![1.0; 8]], 48000).unwrap();
        let mut out = AudioBuffer::new(2, 8, 48000);

        graph.render_into("a", &source, &mut out);
        let expected = 0.5 * std::f32::consts::FRAC_1_SQRT_2;
        assert_abs_diff_eq!(out.sample(0, 3), expected, epsilon = 1e-6);
        assert_abs_diff_eq!(out.sample(1, 3), expected, epsilon = 1e-6);

        graph.render_into("missing", &source, &mut out);
        assert_abs_diff_eq!(out.sample(0, 3), expected, epsilon = 1e-6);
    }
}
