//! Undo/Redo History
//!
//! Snapshot-based history over the timeline. Each entry stores the complete
//! (video tracks, audio tracks) state serialized to JSON, taken *before* the
//! mutation it guards. Undo swaps the live state with the newest entry and
//! parks the live state on the redo stack, so N undos followed by N redos
//! land on exactly the state that was live before the first undo.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{CutlineError, Result};
use crate::timeline::Timeline;

/// Default maximum number of retained snapshots.
pub const DEFAULT_HISTORY_CAP: usize = 20;

/// A serialized timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn capture(timeline: &Timeline) -> Result<Self> {
        Ok(Self(serde_json::to_string(timeline)?))
    }

    /// Wrap already-serialized state (e.g. read back from disk).
    pub fn from_json(json: impl Into<String>) -> Self {
        Self(json.into())
    }

    /// Parse the snapshot; corrupt data is fatal to the restoring operation.
    pub fn restore(&self) -> Result<Timeline> {
        serde_json::from_str(&self.0).map_err(CutlineError::corrupt_snapshot)
    }

    pub fn as_json(&self) -> &str {
        &self.0
    }
}

/// A single undoable step.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: String,

    /// Human-readable description ("Split clip", "Move clip", ...).
    pub label: String,

    pub timestamp: DateTime<Utc>,

    pub snapshot: Snapshot,
}

impl HistoryEntry {
    pub fn new(label: impl Into<String>, snapshot: Snapshot) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            label: label.into(),
            timestamp: Utc::now(),
            snapshot,
        }
    }
}

/// Linear undo/redo log with a bounded number of retained snapshots.
#[derive(Debug, Clone)]
pub struct EditHistory {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    cap: usize,
    discarded: usize,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}

impl EditHistory {
    pub fn new(cap: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            cap: cap.max(1),
            discarded: 0,
        }
    }

    /// Record the pre-mutation state. Clears redo and drops the oldest
    /// entries beyond the cap.
    pub fn push(&mut self, label: &str, timeline: &Timeline) -> Result<()> {
        let snapshot = Snapshot::capture(timeline)?;
        self.push_entry(HistoryEntry::new(label, snapshot));
        Ok(())
    }

    /// Record a snapshot captured earlier, e.g. at the start of a drag.
    pub fn push_entry(&mut self, entry: HistoryEntry) {
        self.redo_stack.clear();
        self.undo_stack.push(entry);

        while self.undo_stack.len() > self.cap {
            self.undo_stack.remove(0);
            self.discarded += 1;
        }

        log::debug!(
            "History entry pushed (undo depth {}, discarded {})",
            self.undo_stack.len(),
            self.discarded
        );
    }

    /// Step back. Returns the state to install, or `None` when nothing is
    /// left to undo. On error the history is left exactly as it was.
    pub fn undo(&mut self, current: &Timeline) -> Result<Option<Timeline>> {
        let Some(entry) = self.undo_stack.pop() else {
            return Ok(None);
        };

        let swapped = entry
            .snapshot
            .restore()
            .and_then(|restored| Ok((restored, Snapshot::capture(current)?)));

        match swapped {
            Ok((restored, current_snapshot)) => {
                log::debug!("Undo: {}", entry.label);
                self.redo_stack
                    .push(HistoryEntry::new(entry.label, current_snapshot));
                Ok(Some(restored))
            }
            Err(e) => {
                self.undo_stack.push(entry);
                Err(e)
            }
        }
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: &Timeline) -> Result<Option<Timeline>> {
        let Some(entry) = self.redo_stack.pop() else {
            return Ok(None);
        };

        let swapped = entry
            .snapshot
            .restore()
            .and_then(|restored| Ok((restored, Snapshot::capture(current)?)));

        match swapped {
            Ok((restored, current_snapshot)) => {
                log::debug!("Redo: {}", entry.label);
                // Redo does not clear the remaining redo entries.
                self.undo_stack
                    .push(HistoryEntry::new(entry.label, current_snapshot));
                Ok(Some(restored))
            }
            Err(e) => {
                self.redo_stack.push(entry);
                Err(e)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Number of entries dropped by the cap so far.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn peek_undo(&self) -> Option<&HistoryEntry> {
        self.undo_stack.last()
    }

    pub fn peek_redo(&self) -> Option<&HistoryEntry> {
        self.redo_stack.last()
    }

    pub fn clear(&mut self) {
        self.discarded += self.undo_stack.len() + self.redo_stack.len();
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Labels of undoable steps, most recent first.
    pub fn undo_labels(&self) -> Vec<&str> {
        self.undo_stack
            .iter()
            .rev()
            .map(|e| e.label.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{Clip, ClipKind, Track, TrackKind};
    use pretty_assertions::assert_eq;

    fn timeline_with(n: usize) -> Timeline {
        let mut track = Track::new(TrackKind::Video, "Video 1").with_id("v1");
        for i in 0..n {
            let mut clip = Clip::new(ClipKind::Image, format!("clip {}", i), 2.0);
            clip.id = format!("c{}", i);
            track.clips.push(clip.with_start(i as f64 * 2.0));
        }
        Timeline {
            video_tracks: vec![track],
            audio_tracks: Vec::new(),
        }
    }

    #[test]
    fn test_new_history() {
        let history = EditHistory::new(10);
        assert_eq!(history.cap(), 10);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_on_empty_is_noop() {
        let mut history = EditHistory::default();
        assert!(history.undo(&timeline_with(1)).unwrap().is_none());
        assert!(history.redo(&timeline_with(1)).unwrap().is_none());
    }

    #[test]
    fn test_undo_restores_pre_mutation_state() {
        let mut history = EditHistory::default();
        let before = timeline_with(1);
        history.push("Add clip", &before).unwrap();
        let after = timeline_with(2);

        let restored = history.undo(&after).unwrap().unwrap();
        assert_eq!(restored, before);
        assert!(history.can_redo());

        let redone = history.redo(&restored).unwrap().unwrap();
        assert_eq!(redone, after);
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = EditHistory::default();
        history.push("a", &timeline_with(0)).unwrap();
        history.undo(&timeline_with(1)).unwrap();
        assert_eq!(history.redo_count(), 1);

        history.push("b", &timeline_with(0)).unwrap();
        assert_eq!(history.redo_count(), 0);
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut history = EditHistory::new(3);
        for i in 0..5 {
            history.push(&format!("step {}", i), &timeline_with(i)).unwrap();
        }
        assert_eq!(history.undo_count(), 3);
        assert_eq!(history.discarded(), 2);
        assert_eq!(history.undo_labels(), vec!["step 4", "step 3", "step 2"]);
    }

    #[test]
    fn test_corrupt_snapshot_leaves_history_intact() {
        let mut history = EditHistory::default();
        history.push_entry(HistoryEntry::new(
            "broken",
            Snapshot::from_json("{\"videoTracks\": 7"),
        ));

        let err = history.undo(&timeline_with(1)).unwrap_err();
        assert_eq!(err.error_code(), "CORRUPT_SNAPSHOT");
        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.redo_count(), 0);
    }

    #[test]
    fn test_clear() {
        let mut history = EditHistory::default();
        history.push("a", &timeline_with(0)).unwrap();
        history.push("b", &timeline_with(1)).unwrap();
        history.clear();
        assert!(!history.can_undo());
        assert_eq!(history.discarded(), 2);
    }
}
