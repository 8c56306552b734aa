//! Engine configuration
//!
//! Every tunable constant of the timeline engine lives here. Defaults match
//! the interactive editor; a JSON file can override any subset of them.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CutlineError, Result};

/// Tunable constants for editing, playback and rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum number of retained undo snapshots.
    pub history_cap: usize,

    /// Largest logical-time advance a single tick may apply, in seconds.
    pub max_tick_step: f64,

    /// Forward look-ahead applied to the lower bound of video clip intervals.
    pub resolver_lookahead: f64,

    /// Drift tolerated before re-seeking while playing.
    pub seek_tolerance_playing: f64,

    /// Drift tolerated before re-seeking while paused or scrubbing.
    pub seek_tolerance_paused: f64,

    /// Magnet snap distance in pixels.
    pub snap_threshold_px: f64,

    /// Shortest fragment a split may produce, in seconds.
    pub min_clip_length: f64,

    /// Initial timeline zoom.
    pub pixels_per_second: f64,

    /// Duration used when media probing fails.
    pub fallback_duration: f64,
    pub fallback_width: u32,
    pub fallback_height: u32,

    /// Duration given to still images and text clips on creation.
    pub still_duration: f64,

    /// Compositor canvas size.
    pub canvas_width: u32,
    pub canvas_height: u32,

    /// Wrap to zero at the end of the timeline instead of stopping.
    pub loop_playback: bool,

    /// Audio studio sample rate.
    pub mix_sample_rate: u32,

    /// Audio studio master volume (0-100).
    pub master_volume: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_cap: 20,
            max_tick_step: 0.1,
            resolver_lookahead: 0.05,
            seek_tolerance_playing: 0.4,
            seek_tolerance_paused: 0.05,
            snap_threshold_px: 15.0,
            min_clip_length: 0.1,
            pixels_per_second: 50.0,
            fallback_duration: 10.0,
            fallback_width: 1920,
            fallback_height: 1080,
            still_duration: 5.0,
            canvas_width: 1920,
            canvas_height: 1080,
            loop_playback: false,
            mix_sample_rate: 48000,
            master_volume: 100.0,
        }
    }
}

impl EngineConfig {
    /// Load a configuration file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CutlineError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        let config: EngineConfig =
            serde_json::from_str(&content).map_err(|e| CutlineError::InvalidConfig {
                reason: e.to_string(),
            })?;
        config.validate()?;

        log::debug!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("max_tick_step", self.max_tick_step),
            ("seek_tolerance_playing", self.seek_tolerance_playing),
            ("seek_tolerance_paused", self.seek_tolerance_paused),
            ("min_clip_length", self.min_clip_length),
            ("pixels_per_second", self.pixels_per_second),
            ("fallback_duration", self.fallback_duration),
            ("still_duration", self.still_duration),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(CutlineError::InvalidConfig {
                    reason: format!("{} must be positive, got {}", name, value),
                });
            }
        }

        if self.resolver_lookahead < 0.0 || self.snap_threshold_px < 0.0 {
            return Err(CutlineError::InvalidConfig {
                reason: "look-ahead and snap threshold must not be negative".to_string(),
            });
        }
        if self.history_cap == 0 {
            return Err(CutlineError::InvalidConfig {
                reason: "history_cap must be at least 1".to_string(),
            });
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(CutlineError::InvalidConfig {
                reason: "canvas size must be non-zero".to_string(),
            });
        }
        if self.mix_sample_rate == 0 || !(0.0..=100.0).contains(&self.master_volume) {
            return Err(CutlineError::InvalidConfig {
                reason: "mix_sample_rate must be non-zero and master_volume within 0-100"
                    .to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.history_cap, 20);
        assert_eq!(config.snap_threshold_px, 15.0);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "history_cap": 5, "loop_playback": true }}"#).unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.history_cap, 5);
        assert!(config.loop_playback);
        assert_eq!(config.max_tick_step, 0.1);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "histroy_cap": 5 }}"#).unwrap();

        let err = EngineConfig::load(file.path()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = EngineConfig {
            max_tick_step: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            master_volume: 140.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::load(Path::new("/nonexistent/cutline.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }
}
