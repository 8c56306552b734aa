//! Media Synchronizer
//!
//! Keeps the underlying media elements (decoders, players) aligned with the
//! logical clock: position, rate, volume, mute and play/pause. Element
//! faults are recoverable; they are logged and retried next tick.

use std::collections::HashSet;

use crate::config::EngineConfig;
use crate::engine::resolver::ResolvedFrame;
use crate::error::Result;
use crate::timeline::Clip;

/// One playable media element.
pub trait MediaElement {
    /// Media-local position in seconds.
    fn current_time(&self) -> f64;
    fn seek(&mut self, time: f64) -> Result<()>;

    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&mut self, rate: f64);

    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);

    fn muted(&self) -> bool;
    fn set_muted(&mut self, muted: bool);

    fn is_paused(&self) -> bool;
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self);

    /// Currently loaded media reference.
    fn source(&self) -> Option<&str>;
    fn load(&mut self, source: &str) -> Result<()>;
}

/// Owner of the media elements.
pub trait MediaHost {
    /// Element bound to a placed video clip, if one exists.
    fn element(&mut self, clip_id: &str) -> Option<&mut dyn MediaElement>;

    /// The single element shared by timeline audio.
    fn audio_element(&mut self) -> &mut dyn MediaElement;
}

#[derive(Debug, Clone)]
pub struct MediaSynchronizer {
    tolerance_playing: f64,
    tolerance_paused: f64,

    /// Video clips whose elements were driven on the previous tick.
    engaged: HashSet<String>,
}

impl Default for MediaSynchronizer {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl MediaSynchronizer {
    pub fn new(tolerance_playing: f64, tolerance_paused: f64) -> Self {
        Self {
            tolerance_playing,
            tolerance_paused,
            engaged: HashSet::new(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.seek_tolerance_playing, config.seek_tolerance_paused)
    }

    /// Reconcile every element with `frame`.
    pub fn sync(&mut self, frame: &ResolvedFrame, host: &mut dyn MediaHost) {
        let mut engaged = HashSet::new();

        for visual in &frame.visuals {
            if !visual.clip.kind.is_playable() {
                continue;
            }
            if let Some(element) = host.element(&visual.clip.id) {
                self.reconcile(element, &visual.clip, visual.fade, visual.muted, frame);
                engaged.insert(visual.clip.id.clone());
            }
        }

        // Elements that dropped out of the active set must not keep playing.
        for id in self.engaged.difference(&engaged) {
            if let Some(element) = host.element(id) {
                if !element.is_paused() {
                    element.pause();
                }
            }
        }
        self.engaged = engaged;

        let element = host.audio_element();
        let audible = frame
            .audio
            .as_ref()
            .and_then(|audio| Some((audio, audio.clip.source.as_deref()?)));
        match audible {
            Some((audio, source)) => {
                if element.source() != Some(source) {
                    match element.load(source) {
                        Ok(()) => log::debug!("Audio element loaded {}", source),
                        Err(e) => {
                            log::warn!("Audio load of {} failed: {}", source, e);
                            return;
                        }
                    }
                }
                self.reconcile(element, &audio.clip, audio.fade, audio.muted, frame);
            }
            None => {
                if !element.is_paused() {
                    element.pause();
                }
            }
        }
    }

    fn reconcile(
        &self,
        element: &mut dyn MediaElement,
        clip: &Clip,
        fade: f64,
        muted: bool,
        frame: &ResolvedFrame,
    ) {
        let target = ((frame.time - clip.start_time) + clip.trim_start).max(clip.trim_start);
        let tolerance = if frame.playing {
            self.tolerance_playing
        } else {
            self.tolerance_paused
        };
        if (element.current_time() - target).abs() > tolerance {
            if let Err(e) = element.seek(target) {
                log::warn!("Seek of {} to {:.3}s failed: {}", clip.id, target, e);
            }
        }

        let rate = f64::from(clip.speed) / 100.0;
        if element.playback_rate() != rate {
            element.set_playback_rate(rate);
        }

        let volume = (f64::from(clip.volume) / 100.0 * fade).clamp(0.0, 1.0);
        if element.volume() != volume {
            element.set_volume(volume);
        }

        if element.muted() != muted {
            element.set_muted(muted);
        }

        if frame.playing && element.is_paused() {
            if let Err(e) = element.play() {
                log::warn!("Play of {} refused, retrying next tick: {}", clip.id, e);
            }
        } else if !frame.playing && !element.is_paused() {
            element.pause();
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeHost;
    use super::*;
    use crate::engine::resolver::resolve;
    use crate::timeline::{ClipKind, Timeline, Track, TrackKind};
    use approx::assert_abs_diff_eq;

    fn timeline() -> Timeline {
        let mut video = Track::new(TrackKind::Video, "V1").with_id("v1");
        let mut clip = Clip::new(ClipKind::Video, "a.mp4", 10.0)
            .with_source("a.mp4")
            .with_start(2.0);
        clip.id = "a".to_string();
        clip.trim_start = 1.0;
        clip.original_duration = 12.0;
        clip.trim_end = 11.0;
        clip.speed = 150.0;
        clip.volume = 80.0;
        video.clips.push(clip);

        let mut audio = Track::new(TrackKind::Audio, "A1").with_id("a1");
        let mut music = Clip::new(ClipKind::Audio, "m.wav", 4.0).with_source("m.wav");
        music.id = "m".to_string();
        music.fade_in = 2.0;
        audio.clips.push(music);
        let mut voice = Clip::new(ClipKind::Audio, "v.wav", 4.0)
            .with_source("v.wav")
            .with_start(4.0);
        voice.id = "v".to_string();
        audio.clips.push(voice);

        Timeline {
            video_tracks: vec![video],
            audio_tracks: vec![audio],
        }
    }

    #[test]
    fn test_element_follows_clock() {
        let mut host = FakeHost::new().with_element("a");
        let mut sync = MediaSynchronizer::default();
        let frame = resolve(&timeline(), 5.0, 0.05, true);
        sync.sync(&frame, &mut host);

        let element = &host.elements["a"];
        assert_abs_diff_eq!(element.time, 4.0);
        assert_eq!(element.rate, 1.5);
        assert_abs_diff_eq!(element.volume, 0.8, epsilon = 1e-6);
        assert!(!element.paused);
    }

    #[test]
    fn test_seek_tolerance_depends_on_playing() {
        let mut host = FakeHost::new().with_element("a");
        let mut sync = MediaSynchronizer::default();
        host.elements.get_mut("a").unwrap().time = 3.8;

        sync.sync(&resolve(&timeline(), 5.0, 0.05, true), &mut host);
        assert_eq!(host.elements["a"].seeks, 0);

        sync.sync(&resolve(&timeline(), 5.0, 0.05, false), &mut host);
        assert_eq!(host.elements["a"].seeks, 1);
        assert!(host.elements["a"].paused);
    }

    #[test]
    fn test_rate_written_only_on_change() {
        let mut host = FakeHost::new().with_element("a");
        let mut sync = MediaSynchronizer::default();
        for t in [3.0, 3.1, 3.2] {
            sync.sync(&resolve(&timeline(), t, 0.05, true), &mut host);
        }
        assert_eq!(host.elements["a"].rate_writes, 1);
    }

    #[test]
    fn test_inactive_element_is_paused() {
        let mut host = FakeHost::new().with_element("a");
        let mut sync = MediaSynchronizer::default();
        sync.sync(&resolve(&timeline(), 3.0, 0.05, true), &mut host);
        assert!(!host.elements["a"].paused);

        sync.sync(&resolve(&timeline(), 20.0, 0.05, true), &mut host);
        assert!(host.elements["a"].paused);
    }

    #[test]
    fn test_play_refusal_is_swallowed() {
        let mut host = FakeHost::new().with_element("a");
        host.elements.get_mut("a").unwrap().refuse_play = true;
        let mut sync = MediaSynchronizer::default();
        sync.sync(&resolve(&timeline(), 3.0, 0.05, true), &mut host);
        assert!(host.elements["a"].paused);
    }

    #[test]
    fn test_shared_audio_swaps_source_on_change_only() {
        let mut host = FakeHost::new();
        let mut sync = MediaSynchronizer::default();

        sync.sync(&resolve(&timeline(), 1.0, 0.05, true), &mut host);
        sync.sync(&resolve(&timeline(), 1.5, 0.05, true), &mut host);
        assert_eq!(host.audio.loads, 1);
        assert_eq!(host.audio.source.as_deref(), Some("m.wav"));
        assert_abs_diff_eq!(host.audio.volume, 0.75, epsilon = 1e-9);

        sync.sync(&resolve(&timeline(), 4.5, 0.05, true), &mut host);
        assert_eq!(host.audio.loads, 2);
        assert_eq!(host.audio.source.as_deref(), Some("v.wav"));
        assert_abs_diff_eq!(host.audio.time, 0.5);

        sync.sync(&resolve(&timeline(), 9.0, 0.05, true), &mut host);
        assert!(host.audio.paused);
    }

    #[test]
    fn test_mute_mirrors_track() {
        let mut host = FakeHost::new();
        host.audio.muted = true;
        let mut sync = MediaSynchronizer::default();
        sync.sync(&resolve(&timeline(), 1.0, 0.05, false), &mut host);
        assert!(!host.audio.muted);
    }
}
