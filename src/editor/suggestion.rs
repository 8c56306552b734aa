//! Edit suggestions
//!
//! An external service looks at a rendered still and proposes color changes.
//! Only fields that differ from the clip are staged, and nothing reaches the
//! timeline until the user confirms through [`Session::apply_pending`].

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::state::Session;
use crate::timeline::{Clip, ClipPatch, FilterPreset};

/// Differences below this are treated as equal.
const VALUE_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSuggestion {
    #[serde(default)]
    pub brightness: Option<f32>,
    #[serde(default)]
    pub contrast: Option<f32>,
    #[serde(default)]
    pub saturation: Option<f32>,
    #[serde(default)]
    pub filter_preset: Option<FilterPreset>,
    #[serde(default)]
    pub explanation: String,
}

/// Produces a suggestion for a rendered frame.
pub trait SuggestionService {
    fn suggest(&self, still: &RgbaImage) -> Result<EditSuggestion>;
}

/// Suggested changes awaiting confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingChanges {
    pub clip_id: String,
    pub patch: ClipPatch,
    pub explanation: String,
}

impl PendingChanges {
    /// Diff a suggestion against `clip`. `None` if nothing would change.
    pub fn stage(suggestion: &EditSuggestion, clip: &Clip) -> Option<Self> {
        let differs = |new: Option<f32>, current: f32| {
            new.filter(|v| (v - current).abs() > VALUE_EPSILON)
        };

        let patch = ClipPatch {
            brightness: differs(suggestion.brightness, clip.brightness),
            contrast: differs(suggestion.contrast, clip.contrast),
            saturation: differs(suggestion.saturation, clip.saturation),
            filter_preset: suggestion
                .filter_preset
                .filter(|preset| *preset != clip.filter_preset),
            ..ClipPatch::default()
        };

        if patch.is_empty() {
            return None;
        }
        Some(Self {
            clip_id: clip.id.clone(),
            patch,
            explanation: suggestion.explanation.clone(),
        })
    }
}

impl Session {
    /// Ask `service` about `still` and stage changes for the selected clip.
    pub fn request_suggestion(
        &self,
        service: &dyn SuggestionService,
        still: &RgbaImage,
    ) -> Result<Option<PendingChanges>> {
        let Some(clip) = self.selected_clip() else {
            return Ok(None);
        };
        let suggestion = service.suggest(still)?;
        log::debug!("Suggestion for {}: {}", clip.id, suggestion.explanation);
        Ok(PendingChanges::stage(&suggestion, clip))
    }

    /// Apply confirmed changes as one undoable property update.
    pub fn apply_pending(&mut self, pending: &PendingChanges) -> bool {
        self.commit_patch(&pending.clip_id, &pending.patch, "Apply suggestion")
    }
}
