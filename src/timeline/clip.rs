//! Clip data model
//!
//! A clip is a timed placement of one media or text source. Source timing
//! (`trim_start`, `trim_end`, `original_duration`) is kept separate from
//! timeline placement (`start_time`, `duration`) so edits never lose source
//! data.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time::quantize;

/// What a clip draws or plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipKind {
    Video,
    Image,
    Text,
    /// Dedicated audio clip living on a timeline audio track.
    Audio,
}

impl ClipKind {
    /// Kinds whose length is bounded by a source file.
    pub fn is_media_backed(self) -> bool {
        matches!(self, ClipKind::Video | ClipKind::Audio)
    }

    /// Kinds that carry a playable media element.
    pub fn is_playable(self) -> bool {
        matches!(self, ClipKind::Video | ClipKind::Audio)
    }

    pub fn is_visual(self) -> bool {
        !matches!(self, ClipKind::Audio)
    }
}

impl std::fmt::Display for ClipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClipKind::Video => write!(f, "video"),
            ClipKind::Image => write!(f, "image"),
            ClipKind::Text => write!(f, "text"),
            ClipKind::Audio => write!(f, "audio"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Normal,
    Screen,
    Multiply,
    Overlay,
    Darken,
    Lighten,
}

/// Named filter palette, composed on top of the numeric filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPreset {
    #[default]
    None,
    Vintage,
    Noir,
    Warm,
    Cool,
    Vivid,
    Faded,
    Cinematic,
}

/// Easing applied to normalized fade progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeCurve {
    #[default]
    Linear,
    /// Cubic smoothstep.
    Smooth,
    /// Quintic smootherstep.
    Buttery,
}

impl FadeCurve {
    /// Map progress `t` to a gain multiplier, clamped to [0, 1].
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            FadeCurve::Linear => t,
            FadeCurve::Smooth => t * t * (3.0 - 2.0 * t),
            FadeCurve::Buttery => t * t * t * (t * (t * 6.0 - 15.0) + 10.0),
        }
    }
}

/// Text-only payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub content: String,
    pub font_size: f32,
    /// CSS-style hex color, e.g. `#ffffff`.
    pub color: String,
    pub font_family: String,
    /// Hex color; `transparent` draws no box.
    pub background_color: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            content: "Text".to_string(),
            font_size: 48.0,
            color: "#ffffff".to_string(),
            font_family: "sans-serif".to_string(),
            background_color: "transparent".to_string(),
        }
    }
}

/// A placed (or pooled) media reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: String,
    pub kind: ClipKind,
    pub name: String,
    /// Media reference (path or URL); `None` for text clips.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,

    // Source timing
    pub original_duration: f64,
    pub trim_start: f64,
    pub trim_end: f64,

    // Placement
    pub start_time: f64,
    pub duration: f64,

    // Transform
    pub opacity: f32,
    pub scale: f32,
    pub rotation: f32,
    pub position_x: f32,
    pub position_y: f32,
    #[serde(default)]
    pub blend_mode: BlendMode,

    // Color
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub hue_rotate: f32,
    pub blur: f32,
    #[serde(default)]
    pub filter_preset: FilterPreset,

    // Transition
    pub fade_in: f64,
    pub fade_out: f64,
    #[serde(default)]
    pub fade_curve: FadeCurve,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextStyle>,

    // Audio
    pub volume: f32,
    /// Playback rate in percent; independent of `duration`.
    pub speed: f32,
}

impl Clip {
    /// Create a clip covering its whole source.
    pub fn new(kind: ClipKind, name: impl Into<String>, duration: f64) -> Self {
        let duration = quantize(duration);
        Self {
            id: fresh_id(),
            kind,
            name: name.into(),
            source: None,
            width: 0,
            height: 0,
            original_duration: duration,
            trim_start: 0.0,
            trim_end: duration,
            start_time: 0.0,
            duration,
            opacity: 100.0,
            scale: 100.0,
            rotation: 0.0,
            position_x: 0.0,
            position_y: 0.0,
            blend_mode: BlendMode::Normal,
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            hue_rotate: 0.0,
            blur: 0.0,
            filter_preset: FilterPreset::None,
            fade_in: 0.0,
            fade_out: 0.0,
            fade_curve: FadeCurve::Linear,
            text: if kind == ClipKind::Text {
                Some(TextStyle::default())
            } else {
                None
            },
            volume: 100.0,
            speed: 100.0,
        }
    }

    /// Create a text overlay clip.
    pub fn text(content: impl Into<String>, duration: f64) -> Self {
        let content = content.into();
        let mut clip = Self::new(ClipKind::Text, content.clone(), duration);
        clip.text = Some(TextStyle {
            content,
            ..TextStyle::default()
        });
        clip
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_start(mut self, start_time: f64) -> Self {
        self.start_time = quantize(start_time.max(0.0));
        self
    }

    /// Timeline end (exclusive).
    pub fn end_time(&self) -> f64 {
        quantize(self.start_time + self.duration)
    }

    /// Half-open containment with an optional early start.
    pub fn contains(&self, time: f64, lookahead: f64) -> bool {
        time >= self.start_time - lookahead && time < self.start_time + self.duration
    }

    /// Check the clip invariants; returns the violated rule.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let times = [
            self.start_time,
            self.duration,
            self.trim_start,
            self.trim_end,
            self.original_duration,
        ];
        if times.iter().any(|t| !t.is_finite()) {
            return Err(format!("clip {} has a non-finite time", self.id));
        }
        if !(self.duration > 0.0) {
            return Err(format!("clip {} has non-positive duration", self.id));
        }
        if self.start_time < 0.0 {
            return Err(format!("clip {} starts before zero", self.id));
        }
        if self.kind.is_media_backed() {
            if self.trim_start < 0.0 {
                return Err(format!("clip {} has negative trim start", self.id));
            }
            if self.trim_end > self.original_duration + super::time::TIME_RESOLUTION {
                return Err(format!("clip {} trims past its source", self.id));
            }
            if self.trim_start >= self.trim_end {
                return Err(format!("clip {} has an empty trim window", self.id));
            }
        }
        if (self.kind == ClipKind::Text) != self.text.is_some() {
            return Err(format!("clip {} text payload does not match its kind", self.id));
        }
        Ok(())
    }

    /// Merge a partial update, clamping every field to its range.
    pub fn apply_patch(&mut self, patch: &ClipPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(v) = patch.opacity {
            self.opacity = v.clamp(0.0, 100.0);
        }
        if let Some(v) = patch.scale {
            self.scale = v.clamp(10.0, 300.0);
        }
        if let Some(v) = patch.rotation {
            self.rotation = v.clamp(-180.0, 180.0);
        }
        if let Some(v) = patch.position_x {
            self.position_x = v;
        }
        if let Some(v) = patch.position_y {
            self.position_y = v;
        }
        if let Some(v) = patch.blend_mode {
            self.blend_mode = v;
        }
        if let Some(v) = patch.brightness {
            self.brightness = v.clamp(0.0, 200.0);
        }
        if let Some(v) = patch.contrast {
            self.contrast = v.clamp(0.0, 200.0);
        }
        if let Some(v) = patch.saturation {
            self.saturation = v.clamp(0.0, 200.0);
        }
        if let Some(v) = patch.hue_rotate {
            self.hue_rotate = v.clamp(0.0, 360.0);
        }
        if let Some(v) = patch.blur {
            self.blur = v.clamp(0.0, 20.0);
        }
        if let Some(v) = patch.filter_preset {
            self.filter_preset = v;
        }
        if let Some(v) = patch.fade_in {
            self.fade_in = quantize(v.clamp(0.0, self.duration));
        }
        if let Some(v) = patch.fade_out {
            self.fade_out = quantize(v.clamp(0.0, self.duration));
        }
        if let Some(v) = patch.fade_curve {
            self.fade_curve = v;
        }
        if let Some(v) = patch.volume {
            self.volume = v.clamp(0.0, 100.0);
        }
        if let Some(v) = patch.speed {
            self.speed = v.clamp(10.0, 400.0);
        }
        if let Some(text) = self.text.as_mut() {
            if let Some(v) = &patch.text_content {
                text.content = v.clone();
            }
            if let Some(v) = patch.font_size {
                text.font_size = v.clamp(8.0, 400.0);
            }
            if let Some(v) = &patch.text_color {
                text.color = v.clone();
            }
            if let Some(v) = &patch.font_family {
                text.font_family = v.clone();
            }
            if let Some(v) = &patch.background_color {
                text.background_color = v.clone();
            }
        }
    }
}

/// Typed partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClipPatch {
    pub name: Option<String>,
    pub opacity: Option<f32>,
    pub scale: Option<f32>,
    pub rotation: Option<f32>,
    pub position_x: Option<f32>,
    pub position_y: Option<f32>,
    pub blend_mode: Option<BlendMode>,
    pub brightness: Option<f32>,
    pub contrast: Option<f32>,
    pub saturation: Option<f32>,
    pub hue_rotate: Option<f32>,
    pub blur: Option<f32>,
    pub filter_preset: Option<FilterPreset>,
    pub fade_in: Option<f64>,
    pub fade_out: Option<f64>,
    pub fade_curve: Option<FadeCurve>,
    pub volume: Option<f32>,
    pub speed: Option<f32>,
    pub text_content: Option<String>,
    pub font_size: Option<f32>,
    pub text_color: Option<String>,
    pub font_family: Option<String>,
    pub background_color: Option<String>,
}

impl ClipPatch {
    pub fn is_empty(&self) -> bool {
        *self == ClipPatch::default()
    }
}

pub(crate) fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}
