//! Active-Clip Resolver
//!
//! Computes, for one instant, the visible clip of every video track and the
//! single audible timeline-audio clip. The result is computed once per tick
//! and handed to both the media synchronizer and the compositor.

use crate::timeline::{Clip, Timeline};

/// A clip visible on one video track.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveVisual {
    /// Index into the video track collection; also the z-order.
    pub track_index: usize,
    pub track_id: String,
    pub muted: bool,
    pub clip: Clip,
    pub fade: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveAudio {
    pub track_id: String,
    pub muted: bool,
    pub clip: Clip,
    pub fade: f64,
}

/// Everything consumers need for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFrame {
    pub time: f64,
    pub playing: bool,
    /// Ascending track order: later entries draw on top.
    pub visuals: Vec<ActiveVisual>,
    pub audio: Option<ActiveAudio>,
}

impl ResolvedFrame {
    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty() && self.audio.is_none()
    }

    /// Ids of every clip in this frame.
    pub fn clip_ids(&self) -> impl Iterator<Item = &str> {
        self.visuals
            .iter()
            .map(|v| v.clip.id.as_str())
            .chain(self.audio.iter().map(|a| a.clip.id.as_str()))
    }
}

/// Resolve the timeline at `time`.
///
/// Video tracks use `lookahead` on the lower bound of each interval so
/// clips start a frame early; the audio lane uses none. Muted tracks are
/// skipped. A track contributes at most one clip, the first in insertion
/// order, even when placements overlap.
pub fn resolve(timeline: &Timeline, time: f64, lookahead: f64, playing: bool) -> ResolvedFrame {
    let visuals = timeline
        .video_tracks
        .iter()
        .enumerate()
        .filter(|(_, track)| !track.muted)
        .filter_map(|(track_index, track)| {
            let clip = track.clips.iter().find(|c| c.contains(time, lookahead))?;
            Some(ActiveVisual {
                track_index,
                track_id: track.id.clone(),
                muted: track.muted,
                clip: clip.clone(),
                fade: fade_factor(clip, time),
            })
        })
        .collect();

    // First match wins across all audio tracks.
    let audio = timeline
        .audio_tracks
        .iter()
        .filter(|track| !track.muted)
        .find_map(|track| {
            let clip = track.clips.iter().find(|c| c.contains(time, 0.0))?;
            Some(ActiveAudio {
                track_id: track.id.clone(),
                muted: track.muted,
                clip: clip.clone(),
                fade: fade_factor(clip, time),
            })
        });

    ResolvedFrame {
        time,
        playing,
        visuals,
        audio,
    }
}

/// Fade multiplier for `clip` at absolute `time`, shared by opacity and
/// volume. Zero-length fades are inactive.
pub fn fade_factor(clip: &Clip, time: f64) -> f64 {
    let time_in_clip = time - clip.start_time;
    let time_from_end = clip.start_time + clip.duration - time;

    if clip.fade_in > 0.0 && time_in_clip < clip.fade_in {
        clip.fade_curve.apply(time_in_clip / clip.fade_in)
    } else if clip.fade_out > 0.0 && time_from_end < clip.fade_out {
        clip.fade_curve.apply(time_from_end / clip.fade_out)
    } else {
        1.0
    }
}
