//! Tracks and timeline snapshots

use serde::{Deserialize, Serialize};

use super::clip::{fresh_id, Clip, ClipKind};
use super::time::{quantize, timeline_extent};

/// Which collection a track belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Video,
    Audio,
}

impl TrackKind {
    /// Whether a clip of `kind` may live on this lane.
    pub fn accepts(self, kind: ClipKind) -> bool {
        match self {
            TrackKind::Video => kind.is_visual(),
            TrackKind::Audio => kind == ClipKind::Audio,
        }
    }
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackKind::Video => write!(f, "video"),
            TrackKind::Audio => write!(f, "audio"),
        }
    }
}

/// A lane of clips, ordered by insertion rather than by time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub name: String,
    pub kind: TrackKind,
    #[serde(default)]
    pub muted: bool,
    /// Advisory; the editor refuses to mutate a locked track.
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub clips: Vec<Clip>,
}

impl Track {
    pub fn new(kind: TrackKind, name: impl Into<String>) -> Self {
        Self {
            id: fresh_id(),
            name: name.into(),
            kind,
            muted: false,
            locked: false,
            clips: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn clip(&self, clip_id: &str) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == clip_id)
    }

    pub fn clip_mut(&mut self, clip_id: &str) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == clip_id)
    }

    pub fn position_of(&self, clip_id: &str) -> Option<usize> {
        self.clips.iter().position(|c| c.id == clip_id)
    }
}

/// Where a clip lives inside a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipLocation {
    pub kind: TrackKind,
    pub track_index: usize,
    pub clip_index: usize,
}

/// The unit of undo/redo: both track collections at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub video_tracks: Vec<Track>,
    pub audio_tracks: Vec<Track>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// One video track and one audio track, the layout of a fresh project.
    pub fn with_default_tracks() -> Self {
        Self {
            video_tracks: vec![Track::new(TrackKind::Video, "Video 1")],
            audio_tracks: vec![Track::new(TrackKind::Audio, "Audio 1")],
        }
    }

    pub fn tracks(&self, kind: TrackKind) -> &[Track] {
        match kind {
            TrackKind::Video => &self.video_tracks,
            TrackKind::Audio => &self.audio_tracks,
        }
    }

    pub fn tracks_mut(&mut self, kind: TrackKind) -> &mut Vec<Track> {
        match kind {
            TrackKind::Video => &mut self.video_tracks,
            TrackKind::Audio => &mut self.audio_tracks,
        }
    }

    /// Every track, video lanes first.
    pub fn all_tracks(&self) -> impl Iterator<Item = &Track> {
        self.video_tracks.iter().chain(self.audio_tracks.iter())
    }

    pub fn all_clips(&self) -> impl Iterator<Item = &Clip> {
        self.all_tracks().flat_map(|t| t.clips.iter())
    }

    pub fn track(&self, track_id: &str) -> Option<&Track> {
        self.all_tracks().find(|t| t.id == track_id)
    }

    pub fn track_mut(&mut self, track_id: &str) -> Option<&mut Track> {
        self.video_tracks
            .iter_mut()
            .chain(self.audio_tracks.iter_mut())
            .find(|t| t.id == track_id)
    }

    pub fn locate(&self, clip_id: &str) -> Option<ClipLocation> {
        for kind in [TrackKind::Video, TrackKind::Audio] {
            for (track_index, track) in self.tracks(kind).iter().enumerate() {
                if let Some(clip_index) = track.position_of(clip_id) {
                    return Some(ClipLocation {
                        kind,
                        track_index,
                        clip_index,
                    });
                }
            }
        }
        None
    }

    pub fn find_clip(&self, clip_id: &str) -> Option<&Clip> {
        self.all_clips().find(|c| c.id == clip_id)
    }

    pub fn find_clip_mut(&mut self, clip_id: &str) -> Option<&mut Clip> {
        let loc = self.locate(clip_id)?;
        self.tracks_mut(loc.kind)[loc.track_index]
            .clips
            .get_mut(loc.clip_index)
    }

    /// The track holding `clip_id`.
    pub fn track_of(&self, clip_id: &str) -> Option<&Track> {
        let loc = self.locate(clip_id)?;
        self.tracks(loc.kind).get(loc.track_index)
    }

    /// Start and end times of every clip except `excluding`.
    pub fn clip_boundaries(&self, excluding: Option<&str>) -> Vec<f64> {
        self.all_clips()
            .filter(|c| Some(c.id.as_str()) != excluding)
            .flat_map(|c| [c.start_time, c.end_time()])
            .collect()
    }

    /// Derived extent: `max(60, last clip end) + 2`.
    pub fn max_time(&self) -> f64 {
        quantize(timeline_extent(self.all_clips().map(|c| c.end_time())))
    }

    pub fn clip_count(&self) -> usize {
        self.all_tracks().map(|t| t.clips.len()).sum()
    }
}
