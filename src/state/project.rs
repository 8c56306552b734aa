//! Project persistence
//!
//! The full project (video tracks, timeline audio tracks, audio studio
//! tracks) as plain structured data. Loading validates everything before any
//! live state is touched; malformed data aborts only the load.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dsp::StudioTrack;
use crate::error::{CutlineError, Result};
use crate::timeline::{Timeline, TrackKind};

/// Current on-disk schema version.
pub const PROJECT_SCHEMA_VERSION: u32 = 1;

/// Conventional project file name.
pub const PROJECT_FILE: &str = "project.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(flatten)]
    pub timeline: Timeline,

    #[serde(default)]
    pub studio_tracks: Vec<StudioTrack>,
}

fn default_schema_version() -> u32 {
    PROJECT_SCHEMA_VERSION
}

impl ProjectState {
    pub fn new(timeline: Timeline, studio_tracks: Vec<StudioTrack>) -> Self {
        Self {
            schema_version: PROJECT_SCHEMA_VERSION,
            timeline,
            studio_tracks,
        }
    }

    pub fn into_parts(self) -> (Timeline, Vec<StudioTrack>) {
        (self.timeline, self.studio_tracks)
    }

    /// Parse and validate.
    pub fn from_json(json: &str) -> Result<Self> {
        let project: ProjectState =
            serde_json::from_str(json).map_err(|e| CutlineError::InvalidProject {
                reason: e.to_string(),
            })?;
        project.validate()?;
        Ok(project)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CutlineError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        let project = Self::from_json(&content)?;
        log::info!("Loaded project {}", path.display());
        Ok(project)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_json()?)?;
        log::info!("Saved project {}", path.display());
        Ok(())
    }

    /// Structural and per-clip invariant checks.
    pub fn validate(&self) -> Result<()> {
        if self.schema_version > PROJECT_SCHEMA_VERSION {
            return Err(invalid(format!(
                "schema version {} is newer than supported {}",
                self.schema_version, PROJECT_SCHEMA_VERSION
            )));
        }

        let mut track_ids = HashSet::new();
        let mut clip_ids = HashSet::new();

        for kind in [TrackKind::Video, TrackKind::Audio] {
            for track in self.timeline.tracks(kind) {
                if track.kind != kind {
                    return Err(invalid(format!(
                        "track {} is in the wrong collection",
                        track.id
                    )));
                }
                if !track_ids.insert(track.id.as_str()) {
                    return Err(invalid(format!("duplicate track id {}", track.id)));
                }
                for clip in &track.clips {
                    if !kind.accepts(clip.kind) {
                        return Err(invalid(format!(
                            "{} clip {} cannot live on track {}",
                            clip.kind, clip.id, track.id
                        )));
                    }
                    if !clip_ids.insert(clip.id.as_str()) {
                        return Err(invalid(format!("duplicate clip id {}", clip.id)));
                    }
                    clip.validate().map_err(invalid)?;
                }
            }
        }

        let mut studio_ids = HashSet::new();
        for track in &self.studio_tracks {
            if !studio_ids.insert(track.id.as_str()) {
                return Err(invalid(format!("duplicate studio track id {}", track.id)));
            }
        }

        Ok(())
    }
}

fn invalid(reason: String) -> CutlineError {
    CutlineError::InvalidProject { reason }
}
