//! Editor session
//!
//! All mutable engine state (timeline, playback position, selection, history)
//! is held in an explicit `Session` rather than in globals, so several
//! timelines can run side by side and every component call is testable.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::dsp::AudioStudio;
use crate::editor::MediaPool;
use crate::error::Result;
use crate::state::history::{EditHistory, Snapshot};
use crate::state::project::ProjectState;
use crate::timeline::{Clip, Timeline};

/// Active pointer tool on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditTool {
    #[default]
    Move,
    /// Pointer-down splits instead of starting a drag.
    Razor,
}

/// Transport and UI-facing edit state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub current_time: f64,
    pub playing: bool,
    pub selected_clip_id: Option<String>,
    pub tool: EditTool,
    pub magnet_enabled: bool,
    pub pixels_per_second: f64,
}

impl PlaybackState {
    pub fn new(pixels_per_second: f64) -> Self {
        Self {
            current_time: 0.0,
            playing: false,
            selected_clip_id: None,
            tool: EditTool::Move,
            magnet_enabled: true,
            pixels_per_second,
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(EngineConfig::default().pixels_per_second)
    }
}

/// A live property edit in progress: the state before its first update.
#[derive(Debug, Clone)]
pub(crate) struct LiveEdit {
    pub(crate) clip_id: String,
    pub(crate) before: Snapshot,
}

/// One open project: the context object threaded through every engine call.
#[derive(Debug)]
pub struct Session {
    pub config: EngineConfig,
    pub(crate) timeline: Timeline,
    pub playback: PlaybackState,
    pub history: EditHistory,
    pub pool: MediaPool,
    pub studio: AudioStudio,
    pub(crate) live_edit: Option<LiveEdit>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Session {
    /// Fresh session with one video and one audio track.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_timeline(config, Timeline::with_default_tracks())
    }

    pub fn with_timeline(config: EngineConfig, timeline: Timeline) -> Self {
        let history = EditHistory::new(config.history_cap);
        let playback = PlaybackState::new(config.pixels_per_second);
        let studio = AudioStudio::new(config.mix_sample_rate, config.master_volume);
        Self {
            config,
            timeline,
            playback,
            history,
            pool: MediaPool::new(),
            studio,
            live_edit: None,
        }
    }

    /// Read-only view; mutation goes through the clip editor.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn max_time(&self) -> f64 {
        self.timeline.max_time()
    }

    pub fn selected_clip(&self) -> Option<&Clip> {
        let id = self.playback.selected_clip_id.as_deref()?;
        self.timeline.find_clip(id)
    }

    /// Select a placed clip; unknown ids clear the selection.
    pub fn select(&mut self, clip_id: Option<&str>) {
        self.playback.selected_clip_id = clip_id
            .filter(|id| self.timeline.find_clip(id).is_some())
            .map(str::to_string);
        if self
            .live_edit
            .as_ref()
            .is_some_and(|e| clip_id != Some(e.clip_id.as_str()))
        {
            self.live_edit = None;
        }
    }

    /// Undo the last structural edit. `Ok(false)` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        match self.history.undo(&self.timeline)? {
            Some(restored) => {
                self.install(restored);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn redo(&mut self) -> Result<bool> {
        match self.history.redo(&self.timeline)? {
            Some(restored) => {
                self.install(restored);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn install(&mut self, timeline: Timeline) {
        self.timeline = timeline;
        self.live_edit = None;
        if self.selected_clip().is_none() {
            self.playback.selected_clip_id = None;
        }
    }

    /// Plain structured data for serialization.
    pub fn export_project(&self) -> ProjectState {
        ProjectState::new(self.timeline.clone(), self.studio.tracks().to_vec())
    }

    /// Replace the whole project. The state must already be validated, which
    /// `ProjectState::from_json` and `ProjectState::load` guarantee.
    pub fn restore_project(&mut self, project: ProjectState) {
        let (timeline, studio_tracks) = project.into_parts();
        self.timeline = timeline;
        self.studio.replace_tracks(studio_tracks);
        self.history.clear();
        self.live_edit = None;
        self.playback = PlaybackState::new(self.playback.pixels_per_second);
        log::info!(
            "Project restored: {} clips, {} studio tracks",
            self.timeline.clip_count(),
            self.studio.tracks().len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_layout() {
        let session = Session::default();
        assert_eq!(session.timeline().video_tracks.len(), 1);
        assert_eq!(session.timeline().audio_tracks.len(), 1);
        assert_eq!(session.history.cap(), 20);
        assert!(session.playback.magnet_enabled);
        assert_eq!(session.playback.tool, EditTool::Move);
    }

    #[test]
    fn test_select_unknown_clears() {
        let mut session = Session::default();
        session.playback.selected_clip_id = Some("stale".to_string());
        session.select(Some("missing"));
        assert!(session.playback.selected_clip_id.is_none());
    }

    #[test]
    fn test_undo_without_history() {
        let mut session = Session::default();
        assert!(!session.undo().unwrap());
        assert!(!session.redo().unwrap());
    }
}
