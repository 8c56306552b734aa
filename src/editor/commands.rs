//! Clip editor entry points
//!
//! Every structural mutation records a history snapshot *before* touching the
//! timeline. Invalid requests (unknown ids, locked tracks, wrong lane, too
//! short fragments) are silent no-ops reported as `false`/`None`.

use crate::editor::ops::{self, TrimEdge};
use crate::state::session::LiveEdit;
use crate::state::{EditTool, HistoryEntry, Session, Snapshot};
use crate::timeline::{fresh_id, quantize, Clip, ClipPatch, Track, TrackKind};

/// Minimum and maximum timeline zoom.
const ZOOM_RANGE: (f64, f64) = (5.0, 500.0);

/// What a pointer-down on a clip did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerAction {
    /// Move tool: the clip was selected and may be dragged.
    Selected,
    /// Razor tool: the clip was split (`true`) or the split was rejected.
    Split(bool),
    /// No such clip.
    Ignored,
}

/// An in-flight drag. Holds the pre-drag snapshot so the whole gesture is a
/// single undo step.
#[derive(Debug, Clone)]
pub struct DragGesture {
    pub clip_id: String,
    pub origin_start: f64,
    pub origin_track: String,
    before: Snapshot,
}

impl Session {
    /// Record a history entry; a failed capture declines the edit.
    fn checkpoint(&mut self, label: &str) -> bool {
        self.live_edit = None;
        match self.history.push(label, &self.timeline) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Cannot record history for '{}': {}", label, e);
                false
            }
        }
    }

    fn track_locked(&self, track_id: &str) -> bool {
        self.timeline.track(track_id).map_or(true, |t| t.locked)
    }

    fn clip_editable(&self, clip_id: &str) -> bool {
        match self.timeline.track_of(clip_id) {
            Some(track) if !track.locked => true,
            Some(track) => {
                log::debug!("Track {} is locked; edit of {} declined", track.id, clip_id);
                false
            }
            None => false,
        }
    }

    fn snap_threshold_seconds(&self) -> f64 {
        ops::snap_threshold(
            self.config.snap_threshold_px,
            self.playback.pixels_per_second,
        )
    }

    /// Apply magnet snapping to a candidate start when enabled.
    fn snapped(&self, candidate: f64, dragged: Option<&str>) -> f64 {
        if !self.playback.magnet_enabled {
            return candidate;
        }
        let bounds = self.timeline.clip_boundaries(dragged);
        ops::snap_time(candidate, &bounds, self.snap_threshold_seconds())
    }

    /// Drop rule: an empty destination forces 0, otherwise snap the request.
    fn drop_time(&self, track_id: &str, dragged: Option<&str>, requested: f64) -> f64 {
        let occupied = self
            .timeline
            .track(track_id)
            .map_or(false, |t| t.clips.iter().any(|c| Some(c.id.as_str()) != dragged));
        if !occupied {
            return 0.0;
        }
        self.snapped(quantize(requested.max(0.0)), dragged)
    }

    // ------------------------------------------------------------------
    // Tracks
    // ------------------------------------------------------------------

    /// Append a track; returns its id.
    pub fn add_track(&mut self, kind: TrackKind, name: Option<&str>) -> Option<String> {
        if !self.checkpoint("Add track") {
            return None;
        }
        let tracks = self.timeline.tracks_mut(kind);
        let name = name.map(str::to_string).unwrap_or_else(|| {
            let prefix = match kind {
                TrackKind::Video => "Video",
                TrackKind::Audio => "Audio",
            };
            format!("{} {}", prefix, tracks.len() + 1)
        });
        let track = Track::new(kind, name);
        let id = track.id.clone();
        tracks.push(track);
        Some(id)
    }

    pub fn remove_track(&mut self, track_id: &str) -> bool {
        if self.timeline.track(track_id).is_none() || self.track_locked(track_id) {
            return false;
        }
        if !self.checkpoint("Remove track") {
            return false;
        }
        for kind in [TrackKind::Video, TrackKind::Audio] {
            self.timeline.tracks_mut(kind).retain(|t| t.id != track_id);
        }
        if self.selected_clip().is_none() {
            self.playback.selected_clip_id = None;
        }
        true
    }

    pub fn toggle_track_mute(&mut self, track_id: &str) -> bool {
        if self.track_locked(track_id) || !self.checkpoint("Toggle mute") {
            return false;
        }
        match self.timeline.track_mut(track_id) {
            Some(track) => {
                track.muted = !track.muted;
                true
            }
            None => false,
        }
    }

    /// Lock toggling is the one track edit allowed while locked.
    pub fn toggle_track_lock(&mut self, track_id: &str) -> bool {
        if self.timeline.track(track_id).is_none() || !self.checkpoint("Toggle lock") {
            return false;
        }
        match self.timeline.track_mut(track_id) {
            Some(track) => {
                track.locked = !track.locked;
                true
            }
            None => false,
        }
    }

    pub fn rename_track(&mut self, track_id: &str, name: &str) -> bool {
        if self.track_locked(track_id) || !self.checkpoint("Rename track") {
            return false;
        }
        match self.timeline.track_mut(track_id) {
            Some(track) => {
                track.name = name.to_string();
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------

    /// Place a fully-formed clip at its own start time.
    pub fn insert_clip(&mut self, track_id: &str, mut clip: Clip) -> bool {
        let Some(track) = self.timeline.track(track_id) else {
            return false;
        };
        if track.locked || !track.kind.accepts(clip.kind) {
            return false;
        }
        if self.timeline.find_clip(&clip.id).is_some() {
            clip.id = fresh_id();
        }
        if !self.checkpoint("Add clip") {
            return false;
        }
        clip.start_time = quantize(clip.start_time.max(0.0));
        match self.timeline.track_mut(track_id) {
            Some(track) => {
                track.clips.push(clip);
                true
            }
            None => false,
        }
    }

    /// Drag a pool item onto a track; returns the placed clip's id.
    pub fn place_from_pool(
        &mut self,
        pool_id: &str,
        track_id: &str,
        drop_time: f64,
    ) -> Option<String> {
        let mut clip = self.pool.get(pool_id)?.clone();
        let track = self.timeline.track(track_id)?;
        if track.locked || !track.kind.accepts(clip.kind) {
            return None;
        }

        clip.id = fresh_id();
        clip.start_time = self.drop_time(track_id, None, drop_time);
        if !self.checkpoint("Add clip") {
            return None;
        }

        let id = clip.id.clone();
        self.timeline.track_mut(track_id)?.clips.push(clip);
        log::debug!("Placed {} on track {}", id, track_id);
        Some(id)
    }

    // ------------------------------------------------------------------
    // Move
    // ------------------------------------------------------------------

    /// One-shot move by a pixel delta at the current zoom.
    pub fn move_clip(&mut self, clip_id: &str, delta_px: f64) -> bool {
        let Some(origin) = self.timeline.find_clip(clip_id).map(|c| c.start_time) else {
            return false;
        };
        if !self.clip_editable(clip_id) {
            return false;
        }
        let candidate = ops::drag_target(origin, delta_px, self.playback.pixels_per_second);
        let target = self.snapped(candidate, Some(clip_id));
        if target == origin || !self.checkpoint("Move clip") {
            return false;
        }
        match self.timeline.find_clip_mut(clip_id) {
            Some(clip) => {
                clip.start_time = target;
                true
            }
            None => false,
        }
    }

    /// Start dragging; `None` if the clip is unknown or locked.
    pub fn begin_drag(&mut self, clip_id: &str) -> Option<DragGesture> {
        if !self.clip_editable(clip_id) {
            return None;
        }
        let origin_start = self.timeline.find_clip(clip_id)?.start_time;
        let origin_track = self.timeline.track_of(clip_id)?.id.clone();
        let before = match Snapshot::capture(&self.timeline) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::error!("Cannot capture pre-drag state: {}", e);
                return None;
            }
        };
        self.playback.selected_clip_id = Some(clip_id.to_string());
        Some(DragGesture {
            clip_id: clip_id.to_string(),
            origin_start,
            origin_track,
            before,
        })
    }

    /// Live update while the pointer moves. Never records history.
    pub fn drag_preview(&mut self, gesture: &DragGesture, delta_px: f64) -> bool {
        let candidate = ops::drag_target(
            gesture.origin_start,
            delta_px,
            self.playback.pixels_per_second,
        );
        let target = self.snapped(candidate, Some(&gesture.clip_id));
        match self.timeline.find_clip_mut(&gesture.clip_id) {
            Some(clip) => {
                clip.start_time = target;
                true
            }
            None => false,
        }
    }

    /// Finish a drag, optionally onto another track. Records one history
    /// entry holding the pre-drag state.
    pub fn end_drag(
        &mut self,
        gesture: DragGesture,
        delta_px: f64,
        target_track: Option<&str>,
    ) -> bool {
        let requested = gesture.origin_start + delta_px / self.playback.pixels_per_second;
        let destination = target_track.unwrap_or(gesture.origin_track.as_str());

        let moved = if destination == gesture.origin_track {
            let candidate = ops::drag_target(
                gesture.origin_start,
                delta_px,
                self.playback.pixels_per_second,
            );
            let target = self.snapped(candidate, Some(&gesture.clip_id));
            self.set_start(&gesture.clip_id, target);
            target != gesture.origin_start
        } else {
            self.relocate(&gesture, destination, requested)
        };

        if !moved {
            self.set_start(&gesture.clip_id, gesture.origin_start);
            return false;
        }
        self.history
            .push_entry(HistoryEntry::new("Move clip", gesture.before));
        true
    }

    fn set_start(&mut self, clip_id: &str, start: f64) {
        if let Some(clip) = self.timeline.find_clip_mut(clip_id) {
            clip.start_time = start;
        }
    }

    /// Cross-track drop without recording history.
    fn relocate(&mut self, gesture: &DragGesture, destination: &str, requested: f64) -> bool {
        let Some(dest) = self.timeline.track(destination) else {
            return false;
        };
        let Some(kind) = self.timeline.find_clip(&gesture.clip_id).map(|c| c.kind) else {
            return false;
        };
        if dest.locked || !dest.kind.accepts(kind) {
            return false;
        }

        let start = self.drop_time(destination, Some(&gesture.clip_id), requested);
        let Some(loc) = self.timeline.locate(&gesture.clip_id) else {
            return false;
        };
        let mut clip = self.timeline.tracks_mut(loc.kind)[loc.track_index]
            .clips
            .remove(loc.clip_index);
        clip.start_time = start;
        match self.timeline.track_mut(destination) {
            Some(track) => {
                track.clips.push(clip);
                true
            }
            None => false,
        }
    }

    /// Move an already-placed clip onto another track at a requested time.
    pub fn drop_to_track(&mut self, clip_id: &str, track_id: &str, time: f64) -> bool {
        let Some(gesture) = self.begin_drag(clip_id) else {
            return false;
        };
        let delta_px = (time - gesture.origin_start) * self.playback.pixels_per_second;
        self.end_drag(gesture, delta_px, Some(track_id))
    }

    // ------------------------------------------------------------------
    // Split / trim / delete / duplicate
    // ------------------------------------------------------------------

    pub fn split_clip(&mut self, clip_id: &str, time: f64) -> bool {
        if !self.clip_editable(clip_id) {
            return false;
        }
        let Some(loc) = self.timeline.locate(clip_id) else {
            return false;
        };
        let original = &self.timeline.tracks(loc.kind)[loc.track_index].clips[loc.clip_index];
        let Some((first, second)) = ops::split_clip(original, time, self.config.min_clip_length)
        else {
            log::debug!("Split of {} at {:.4} rejected", clip_id, time);
            return false;
        };
        if !self.checkpoint("Split clip") {
            return false;
        }

        let clips = &mut self.timeline.tracks_mut(loc.kind)[loc.track_index].clips;
        clips[loc.clip_index] = first;
        clips.insert(loc.clip_index + 1, second);
        true
    }

    /// Split the selected clip at the playhead.
    pub fn split_at_playhead(&mut self) -> bool {
        match self.playback.selected_clip_id.clone() {
            Some(id) => self.split_clip(&id, self.playback.current_time),
            None => false,
        }
    }

    /// Pointer-down dispatch on the active tool.
    pub fn pointer_down(&mut self, clip_id: &str, time: f64) -> PointerAction {
        if self.timeline.find_clip(clip_id).is_none() {
            return PointerAction::Ignored;
        }
        match self.playback.tool {
            EditTool::Razor => PointerAction::Split(self.split_clip(clip_id, time)),
            EditTool::Move => {
                self.playback.selected_clip_id = Some(clip_id.to_string());
                PointerAction::Selected
            }
        }
    }

    pub fn trim_clip(&mut self, clip_id: &str, edge: TrimEdge, time: f64) -> bool {
        if !self.clip_editable(clip_id) {
            return false;
        }
        let Some(trimmed) = self
            .timeline
            .find_clip(clip_id)
            .and_then(|c| ops::trim_clip(c, edge, time, self.config.min_clip_length))
        else {
            return false;
        };
        if !self.checkpoint("Trim clip") {
            return false;
        }
        match self.timeline.find_clip_mut(clip_id) {
            Some(clip) => {
                *clip = trimmed;
                true
            }
            None => false,
        }
    }

    /// Remove a clip from whichever collection holds it.
    pub fn delete_clip(&mut self, clip_id: &str) -> bool {
        if !self.clip_editable(clip_id) {
            return false;
        }
        let Some(loc) = self.timeline.locate(clip_id) else {
            return false;
        };
        if !self.checkpoint("Delete clip") {
            return false;
        }
        self.timeline.tracks_mut(loc.kind)[loc.track_index]
            .clips
            .remove(loc.clip_index);
        if self.playback.selected_clip_id.as_deref() == Some(clip_id) {
            self.playback.selected_clip_id = None;
        }
        true
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.playback.selected_clip_id.clone() {
            Some(id) => self.delete_clip(&id),
            None => false,
        }
    }

    /// Copy a clip to just after itself on the same track.
    pub fn duplicate_clip(&mut self, clip_id: &str) -> Option<String> {
        if !self.clip_editable(clip_id) {
            return None;
        }
        let loc = self.timeline.locate(clip_id)?;
        let mut copy = self.timeline.find_clip(clip_id)?.clone();
        copy.id = fresh_id();
        copy.start_time = copy.end_time();
        if !self.checkpoint("Duplicate clip") {
            return None;
        }
        let id = copy.id.clone();
        self.timeline.tracks_mut(loc.kind)[loc.track_index]
            .clips
            .insert(loc.clip_index + 1, copy);
        Some(id)
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    /// Live property change on the selection (slider drag). No history; the
    /// first update of a gesture keeps the prior state for `commit_selected`.
    pub fn update_selected(&mut self, patch: &ClipPatch) -> bool {
        let Some(id) = self.playback.selected_clip_id.clone() else {
            return false;
        };
        if patch.is_empty() || !self.clip_editable(&id) {
            return false;
        }
        if self.live_edit.as_ref().map_or(true, |e| e.clip_id != id) {
            match Snapshot::capture(&self.timeline) {
                Ok(before) => {
                    self.live_edit = Some(LiveEdit {
                        clip_id: id.clone(),
                        before,
                    })
                }
                Err(e) => {
                    log::error!("Cannot capture pre-edit state: {}", e);
                    return false;
                }
            }
        }
        match self.timeline.find_clip_mut(&id) {
            Some(clip) => {
                clip.apply_patch(patch);
                true
            }
            None => false,
        }
    }

    /// Committed property change on the selection; one undo step. After live
    /// updates the step restores the state before the first of them.
    pub fn commit_selected(&mut self, patch: &ClipPatch) -> bool {
        let Some(id) = self.playback.selected_clip_id.clone() else {
            return false;
        };
        let live = self.live_edit.take().filter(|e| e.clip_id == id);
        let Some(live) = live else {
            return self.commit_patch(&id, patch, "Update clip");
        };
        if !self.clip_editable(&id) {
            return false;
        }
        let Some(clip) = self.timeline.find_clip_mut(&id) else {
            return false;
        };
        clip.apply_patch(patch);
        self.history
            .push_entry(HistoryEntry::new("Update clip", live.before));
        true
    }

    pub(crate) fn commit_patch(&mut self, clip_id: &str, patch: &ClipPatch, label: &str) -> bool {
        if patch.is_empty() || !self.clip_editable(clip_id) {
            return false;
        }
        if !self.checkpoint(label) {
            return false;
        }
        match self.timeline.find_clip_mut(clip_id) {
            Some(clip) => {
                clip.apply_patch(patch);
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Edit mode
    // ------------------------------------------------------------------

    pub fn set_tool(&mut self, tool: EditTool) {
        self.playback.tool = tool;
    }

    pub fn set_magnet(&mut self, enabled: bool) {
        self.playback.magnet_enabled = enabled;
    }

    pub fn set_zoom(&mut self, pixels_per_second: f64) {
        self.playback.pixels_per_second = pixels_per_second.clamp(ZOOM_RANGE.0, ZOOM_RANGE.1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{time_eq, ClipKind};
    use pretty_assertions::assert_eq;

    fn session_with_clip() -> (Session, String, String) {
        let mut session = Session::default();
        let track_id = session.timeline().video_tracks[0].id.clone();
        let clip = Clip::new(ClipKind::Video, "a.mp4", 5.0);
        let clip_id = clip.id.clone();
        assert!(session.insert_clip(&track_id, clip));
        (session, track_id, clip_id)
    }

    #[test]
    fn test_insert_respects_lanes() {
        let mut session = Session::default();
        let video = session.timeline().video_tracks[0].id.clone();
        let audio = session.timeline().audio_tracks[0].id.clone();

        assert!(!session.insert_clip(&audio, Clip::new(ClipKind::Video, "v", 2.0)));
        assert!(!session.insert_clip(&video, Clip::new(ClipKind::Audio, "a", 2.0)));
        assert!(session.insert_clip(&audio, Clip::new(ClipKind::Audio, "a", 2.0)));
        assert_eq!(session.history.undo_count(), 1);
    }

    #[test]
    fn test_split_pushes_history_and_keeps_order() {
        let (mut session, _, id) = session_with_clip();
        assert!(session.split_clip(&id, 2.0));

        let clips = &session.timeline().video_tracks[0].clips;
        assert_eq!(clips.len(), 2);
        assert_eq!(clips[0].id, id);
        assert!(time_eq(clips[1].start_time, 2.0));
        assert_eq!(session.history.undo_labels()[0], "Split clip");
    }

    #[test]
    fn test_rejected_split_records_nothing() {
        let (mut session, _, id) = session_with_clip();
        let depth = session.history.undo_count();
        assert!(!session.split_clip(&id, 4.95));
        assert_eq!(session.history.undo_count(), depth);
    }

    #[test]
    fn test_locked_track_refuses_edits() {
        let (mut session, track_id, id) = session_with_clip();
        assert!(session.toggle_track_lock(&track_id));

        assert!(!session.split_clip(&id, 2.0));
        assert!(!session.move_clip(&id, 100.0));
        assert!(!session.delete_clip(&id));
        assert!(session.begin_drag(&id).is_none());
        assert!(!session.trim_clip(&id, TrimEdge::End, 3.0));
        assert!(!session.insert_clip(&track_id, Clip::new(ClipKind::Image, "i", 1.0)));
        assert_eq!(session.timeline().video_tracks[0].clips.len(), 1);

        assert!(!session.toggle_track_mute(&track_id));
        assert!(!session.timeline().video_tracks[0].muted);
        assert!(session.toggle_track_lock(&track_id));
        assert!(session.toggle_track_mute(&track_id));
        assert!(session.timeline().video_tracks[0].muted);
    }

    #[test]
    fn test_move_without_magnet() {
        let (mut session, _, id) = session_with_clip();
        session.set_magnet(false);
        assert!(session.move_clip(&id, 125.0));
        let clip = session.timeline().find_clip(&id).unwrap();
        assert!(time_eq(clip.start_time, 2.5));

        assert!(session.move_clip(&id, -10_000.0));
        assert_eq!(session.timeline().find_clip(&id).unwrap().start_time, 0.0);
    }

    #[test]
    fn test_drag_gesture_is_one_undo_step() {
        let (mut session, _, id) = session_with_clip();
        session.set_magnet(false);
        let depth = session.history.undo_count();

        let gesture = session.begin_drag(&id).unwrap();
        for px in [10.0, 40.0, 90.0, 150.0] {
            session.drag_preview(&gesture, px);
        }
        assert_eq!(session.history.undo_count(), depth);
        assert!(session.end_drag(gesture, 150.0, None));
        assert_eq!(session.history.undo_count(), depth + 1);
        assert!(time_eq(session.timeline().find_clip(&id).unwrap().start_time, 3.0));

        session.undo().unwrap();
        assert_eq!(session.timeline().find_clip(&id).unwrap().start_time, 0.0);
    }

    #[test]
    fn test_cross_track_drop_respects_lane() {
        let (mut session, _, id) = session_with_clip();
        let audio = session.timeline().audio_tracks[0].id.clone();
        assert!(!session.drop_to_track(&id, &audio, 3.0));
        assert!(session.timeline().video_tracks[0].clip(&id).is_some());

        let second = session.add_track(TrackKind::Video, None).unwrap();
        assert!(session.drop_to_track(&id, &second, 7.0));
        let track = session.timeline().track(&second).unwrap();
        assert_eq!(track.name, "Video 2");
        // First clip on an empty track lands at zero.
        assert_eq!(track.clips[0].start_time, 0.0);
    }

    #[test]
    fn test_razor_pointer_down_splits() {
        let (mut session, _, id) = session_with_clip();
        assert_eq!(session.pointer_down(&id, 1.0), PointerAction::Selected);
        assert_eq!(session.playback.selected_clip_id.as_deref(), Some(id.as_str()));

        session.set_tool(EditTool::Razor);
        assert_eq!(session.pointer_down(&id, 1.0), PointerAction::Split(true));
        assert_eq!(session.pointer_down(&id, 0.05), PointerAction::Split(false));
        assert_eq!(session.pointer_down("nope", 1.0), PointerAction::Ignored);
    }

    #[test]
    fn test_duplicate_places_after_original() {
        let (mut session, _, id) = session_with_clip();
        let copy = session.duplicate_clip(&id).unwrap();
        assert_ne!(copy, id);
        assert!(time_eq(session.timeline().find_clip(&copy).unwrap().start_time, 5.0));
    }

    #[test]
    fn test_update_vs_commit_selected() {
        let (mut session, _, id) = session_with_clip();
        session.select(Some(&id));
        let depth = session.history.undo_count();

        let live = ClipPatch {
            opacity: Some(50.0),
            ..ClipPatch::default()
        };
        assert!(session.update_selected(&live));
        assert_eq!(session.history.undo_count(), depth);

        let committed = ClipPatch {
            brightness: Some(150.0),
            ..ClipPatch::default()
        };
        assert!(session.commit_selected(&committed));
        assert_eq!(session.history.undo_count(), depth + 1);
        let clip = session.timeline().find_clip(&id).unwrap();
        assert_eq!(clip.opacity, 50.0);
        assert_eq!(clip.brightness, 150.0);

        assert!(!session.commit_selected(&ClipPatch::default()));
    }

    #[test]
    fn test_slider_gesture_undoes_to_start_value() {
        let (mut session, _, id) = session_with_clip();
        session.select(Some(&id));
        let depth = session.history.undo_count();

        for value in [90.0, 70.0, 50.0] {
            assert!(session.update_selected(&ClipPatch {
                opacity: Some(value),
                ..ClipPatch::default()
            }));
        }
        assert!(session.commit_selected(&ClipPatch {
            opacity: Some(50.0),
            ..ClipPatch::default()
        }));
        assert_eq!(session.history.undo_count(), depth + 1);

        assert!(session.undo().unwrap());
        assert_eq!(session.timeline().find_clip(&id).unwrap().opacity, 100.0);
        assert!(session.redo().unwrap());
        assert_eq!(session.timeline().find_clip(&id).unwrap().opacity, 50.0);
    }

    #[test]
    fn test_reselect_drops_pending_slider_state() {
        let (mut session, _, id) = session_with_clip();
        session.select(Some(&id));
        session.update_selected(&ClipPatch {
            opacity: Some(40.0),
            ..ClipPatch::default()
        });
        session.select(None);
        session.select(Some(&id));

        assert!(session.commit_selected(&ClipPatch {
            opacity: Some(30.0),
            ..ClipPatch::default()
        }));
        session.undo().unwrap();
        assert_eq!(session.timeline().find_clip(&id).unwrap().opacity, 40.0);
    }

    #[test]
    fn test_trim_via_session() {
        let (mut session, _, id) = session_with_clip();
        assert!(session.trim_clip(&id, TrimEdge::End, 3.0));
        assert!(time_eq(session.timeline().find_clip(&id).unwrap().duration, 3.0));
        session.undo().unwrap();
        assert!(time_eq(session.timeline().find_clip(&id).unwrap().duration, 5.0));
    }

    #[test]
    fn test_remove_track_clears_selection() {
        let (mut session, track_id, id) = session_with_clip();
        session.select(Some(&id));
        assert!(session.remove_track(&track_id));
        assert!(session.playback.selected_clip_id.is_none());
        assert!(session.timeline().video_tracks.is_empty());
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut session = Session::default();
        session.set_zoom(0.1);
        assert_eq!(session.playback.pixels_per_second, 5.0);
        session.set_zoom(1e6);
        assert_eq!(session.playback.pixels_per_second, 500.0);
    }
}
