//! Media pool
//!
//! Imported and generated clips waiting to be placed. Placing copies a pool
//! item onto a track under a fresh id; the pool entry itself never changes.

use std::path::Path;

use crate::config::EngineConfig;
use crate::error::{CutlineError, Result};
use crate::timeline::{Clip, ClipKind};

/// What a probe learned about a media file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaInfo {
    /// `None` for media without an intrinsic length (stills).
    pub natural_duration: Option<f64>,
    pub width: u32,
    pub height: u32,
}

/// Reads natural duration and dimensions from a media file.
pub trait MediaProbe {
    fn probe(&self, path: &Path) -> Result<MediaInfo>;
}

/// Probes still images by decoding their header.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageProbe;

impl MediaProbe for ImageProbe {
    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        let (width, height) =
            image::image_dimensions(path).map_err(|e| CutlineError::ProbeFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(MediaInfo {
            natural_duration: None,
            width,
            height,
        })
    }
}

/// Guess a clip kind from a file extension.
pub fn kind_for_path(path: &Path) -> Option<ClipKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" => Some(ClipKind::Image),
        "mp4" | "mov" | "webm" | "mkv" | "m4v" => Some(ClipKind::Video),
        "wav" | "mp3" | "ogg" | "flac" | "m4a" | "aac" => Some(ClipKind::Audio),
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct MediaPool {
    clips: Vec<Clip>,
}

impl MediaPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import a file. Probe failures never fail the import: the clip gets
    /// the configured fallback duration and dimensions instead.
    pub fn import(
        &mut self,
        probe: &dyn MediaProbe,
        path: &Path,
        kind: ClipKind,
        config: &EngineConfig,
    ) -> &Clip {
        let info = probe.probe(path).unwrap_or_else(|e| {
            log::warn!("Probe of {} failed, using defaults: {}", path.display(), e);
            MediaInfo {
                natural_duration: Some(config.fallback_duration),
                width: config.fallback_width,
                height: config.fallback_height,
            }
        });

        let duration = info
            .natural_duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(match kind {
                ClipKind::Image | ClipKind::Text => config.still_duration,
                ClipKind::Video | ClipKind::Audio => config.fallback_duration,
            });

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut clip = Clip::new(kind, name, duration).with_source(path.display().to_string());
        clip.width = info.width;
        clip.height = info.height;
        self.add(clip)
    }

    /// Create a text overlay with the default style.
    pub fn add_text(&mut self, content: &str, config: &EngineConfig) -> &Clip {
        let mut clip = Clip::text(content, config.still_duration);
        clip.width = config.canvas_width;
        clip.height = config.canvas_height;
        self.add(clip)
    }

    /// Add an externally created clip (e.g. generated media).
    pub fn add(&mut self, clip: Clip) -> &Clip {
        log::debug!("Pool: added {} ({})", clip.name, clip.kind);
        let index = self.clips.len();
        self.clips.push(clip);
        &self.clips[index]
    }

    pub fn get(&self, id: &str) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Clip> {
        let index = self.clips.iter().position(|c| c.id == id)?;
        Some(self.clips.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clip> {
        self.clips.iter()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}
