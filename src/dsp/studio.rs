//! Audio Studio
//!
//! The standalone multitrack mixer, independent from timeline audio. Track
//! settings are persisted with the project; decoded sources are not.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dsp::buffer::AudioBuffer;
use crate::dsp::graph::MixingGraph;
use crate::dsp::io::{export_wav, import_wav};
use crate::error::Result;
use crate::timeline::fresh_id;

/// Bit depth of exported mixdowns.
const MIXDOWN_BIT_DEPTH: u16 = 24;

/// EQ band selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqBand {
    Low,
    Mid,
    High,
}

/// Persisted state of one studio track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub source: Option<String>,
    /// 0-100
    pub volume: f32,
    /// -1 (left) to 1 (right)
    #[serde(default)]
    pub pan: f32,
    #[serde(default)]
    pub eq_low: f32,
    #[serde(default)]
    pub eq_mid: f32,
    #[serde(default)]
    pub eq_high: f32,
    #[serde(default)]
    pub muted: bool,
    /// Stored for the UI; the mix ignores it.
    #[serde(default)]
    pub solo: bool,
}

impl StudioTrack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: fresh_id(),
            name: name.into(),
            source: None,
            volume: 100.0,
            pan: 0.0,
            eq_low: 0.0,
            eq_mid: 0.0,
            eq_high: 0.0,
            muted: false,
            solo: false,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct AudioStudio {
    sample_rate: u32,
    tracks: Vec<StudioTrack>,
    graph: MixingGraph,
    sources: HashMap<String, AudioBuffer>,
}

impl AudioStudio {
    pub fn new(sample_rate: u32, master_volume: f32) -> Self {
        Self {
            sample_rate,
            tracks: Vec::new(),
            graph: MixingGraph::new(sample_rate, master_volume),
            sources: HashMap::new(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn tracks(&self) -> &[StudioTrack] {
        &self.tracks
    }

    pub fn track(&self, id: &str) -> Option<&StudioTrack> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn graph(&self) -> &MixingGraph {
        &self.graph
    }

    /// Add a track and wire its chain. Duplicate ids are ignored.
    pub fn add_track(&mut self, track: StudioTrack) -> bool {
        if self.track(&track.id).is_some() {
            return false;
        }
        self.graph.connect(&track);
        self.tracks.push(track);
        true
    }

    /// Decode a WAV file into a new track; returns the track id.
    pub fn import_track(&mut self, path: &Path) -> Result<String> {
        let buffer = import_wav(path, self.sample_rate)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Track".to_string());
        let track = StudioTrack::new(name).with_source(path.display().to_string());
        let id = track.id.clone();
        self.sources.insert(id.clone(), buffer);
        self.add_track(track);
        Ok(id)
    }

    /// Attach already-decoded audio to a track.
    pub fn attach_source(&mut self, track_id: &str, buffer: AudioBuffer) -> bool {
        if self.track(track_id).is_none() {
            return false;
        }
        self.sources.insert(track_id.to_string(), buffer);
        true
    }

    pub fn has_source(&self, track_id: &str) -> bool {
        self.sources.contains_key(track_id)
    }

    pub fn remove_track(&mut self, track_id: &str) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|t| t.id != track_id);
        self.graph.disconnect(track_id);
        self.sources.remove(track_id);
        self.tracks.len() != before
    }

    /// Replace every track (project restore). Decoded sources are dropped.
    pub fn replace_tracks(&mut self, tracks: Vec<StudioTrack>) {
        self.graph.disconnect_all();
        self.sources.clear();
        self.tracks.clear();
        for track in tracks {
            self.add_track(track);
        }
    }

    /// Decode every track source that is not loaded yet. Failures are
    /// logged and skipped; returns how many sources were loaded.
    pub fn load_sources(&mut self, base: &Path) -> usize {
        let pending: Vec<(String, String)> = self
            .tracks
            .iter()
            .filter(|t| !self.sources.contains_key(&t.id))
            .filter_map(|t| Some((t.id.clone(), t.source.clone()?)))
            .collect();

        let mut loaded = 0;
        for (id, source) in pending {
            let path = base.join(&source);
            match import_wav(&path, self.sample_rate) {
                Ok(buffer) => {
                    self.sources.insert(id, buffer);
                    loaded += 1;
                }
                Err(e) => log::warn!("Studio source {} unavailable: {}", path.display(), e),
            }
        }
        loaded
    }

    fn modify(&mut self, track_id: &str, f: impl FnOnce(&mut StudioTrack)) -> bool {
        let Some(track) = self.tracks.iter_mut().find(|t| t.id == track_id) else {
            return false;
        };
        f(track);
        self.graph.update(track)
    }

    pub fn set_volume(&mut self, track_id: &str, volume: f32) -> bool {
        self.modify(track_id, |t| t.volume = volume.clamp(0.0, 100.0))
    }

    pub fn set_pan(&mut self, track_id: &str, pan: f32) -> bool {
        self.modify(track_id, |t| t.pan = pan.clamp(-1.0, 1.0))
    }

    pub fn set_eq(&mut self, track_id: &str, band: EqBand, gain_db: f32) -> bool {
        let gain_db = gain_db.clamp(-crate::dsp::EQ_RANGE_DB, crate::dsp::EQ_RANGE_DB);
        self.modify(track_id, |t| match band {
            EqBand::Low => t.eq_low = gain_db,
            EqBand::Mid => t.eq_mid = gain_db,
            EqBand::High => t.eq_high = gain_db,
        })
    }

    pub fn toggle_mute(&mut self, track_id: &str) -> bool {
        self.modify(track_id, |t| t.muted = !t.muted)
    }

    pub fn toggle_solo(&mut self, track_id: &str) -> bool {
        self.modify(track_id, |t| t.solo = !t.solo)
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.graph.set_master_volume(volume);
    }

    /// Longest loaded source, in seconds.
    pub fn duration(&self) -> f64 {
        self.sources
            .values()
            .map(AudioBuffer::duration)
            .fold(0.0, f64::max)
    }

    /// Render every track through its chain into a stereo buffer. Without
    /// `seconds` the mix spans the longest source.
    pub fn mixdown(&mut self, seconds: Option<f64>) -> AudioBuffer {
        let seconds = seconds.unwrap_or_else(|| self.duration()).max(0.0);
        let frames = (seconds * f64::from(self.sample_rate)).round() as usize;
        let mut out = AudioBuffer::new(2, frames, self.sample_rate);

        self.graph.reset();
        for track in &self.tracks {
            if let Some(source) = self.sources.get(&track.id) {
                self.graph.render_into(&track.id, source, &mut out);
            }
        }
        log::debug!(
            "Mixdown of {} tracks, {:.2}s, peak {:.3}",
            self.tracks.len(),
            seconds,
            out.peak()
        );
        out
    }

    pub fn export_mixdown(&mut self, path: &Path, seconds: Option<f64>) -> Result<()> {
        let mix = self.mixdown(seconds);
        export_wav(&mix, path, MIXDOWN_BIT_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::buffer::sine_tone;
    use approx::assert_abs_diff_eq;
    use tempfile::tempdir;

    fn studio_with_tone() -> (AudioStudio, String) {
        let mut studio = AudioStudio::new(48000, 100.0);
        let track = StudioTrack::new("Tone");
        let id = track.id.clone();
        studio.add_track(track);
        studio.attach_source(&id, sine_tone(440.0, 0.5, 48000));
        (studio, id)
    }

    #[test]
    fn test_add_is_idempotent() {
        let (mut studio, id) = studio_with_tone();
        let mut dup = StudioTrack::new("dup");
        dup.id = id;
        assert!(!studio.add_track(dup));
        assert_eq!(studio.tracks().len(), 1);
        assert_eq!(studio.graph().len(), 1);
    }

    #[test]
    fn test_remove_releases_everything() {
        let (mut studio, id) = studio_with_tone();
        assert!(studio.remove_track(&id));
        assert!(!studio.graph().is_connected(&id));
        assert!(!studio.has_source(&id));
        assert!(!studio.remove_track(&id));
    }

    #[test]
    fn test_mixdown_length_and_level() {
        let (mut studio, id) = studio_with_tone();
        let mix = studio.mixdown(None);
        assert_eq!(mix.num_channels(), 2);
        assert_eq!(mix.num_frames(), 24000);
        assert_abs_diff_eq!(mix.peak(), std::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-3);

        studio.toggle_mute(&id);
        assert_eq!(studio.mixdown(None).peak(), 0.0);
    }

    #[test]
    fn test_pan_hard_left() {
        let (mut studio, id) = studio_with_tone();
        studio.set_pan(&id, -1.0);
        let mix = studio.mixdown(Some(0.1));
        assert_eq!(mix.num_frames(), 4800);
        assert!(mix.rms(0) > 0.5);
        assert!(mix.rms(1) < 1e-3);
    }

    #[test]
    fn test_parameters_are_clamped() {
        let (mut studio, id) = studio_with_tone();
        studio.set_volume(&id, 250.0);
        studio.set_eq(&id, EqBand::High, -40.0);
        let track = studio.track(&id).unwrap();
        assert_eq!(track.volume, 100.0);
        assert_eq!(track.eq_high, -12.0);
        assert!(!studio.set_volume("missing", 10.0));
    }

    #[test]
    fn test_import_and_export() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("vocals.wav");
        export_wav(&sine_tone(220.0, 0.25, 48000), &input, 16).unwrap();

        let mut studio = AudioStudio::new(48000, 100.0);
        let id = studio.import_track(&input).unwrap();
        assert_eq!(studio.track(&id).unwrap().name, "vocals");

        let output = dir.path().join("mix.wav");
        studio.export_mixdown(&output, None).unwrap();
        let mix = import_wav(&output, 48000).unwrap();
        assert_eq!(mix.num_channels(), 2);
        assert_eq!(mix.num_frames(), 12000);
    }

    #[test]
    fn test_replace_tracks_and_reload_sources() {
        let dir = tempdir().unwrap();
        export_wav(&sine_tone(220.0, 0.1, 48000), &dir.path().join("a.wav"), 16).unwrap();

        let mut studio = AudioStudio::new(48000, 100.0);
        studio.replace_tracks(vec![
            StudioTrack::new("A").with_source("a.wav"),
            StudioTrack::new("B").with_source("missing.wav"),
            StudioTrack::new("C"),
        ]);
        assert_eq!(studio.graph().len(), 3);
        assert_eq!(studio.load_sources(dir.path()), 1);
        assert_abs_diff_eq!(studio.duration(), 0.1, epsilon = 1e-4);
    }
}
