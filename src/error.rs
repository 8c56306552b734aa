//! Error handling for Cutline
//!
//! Edit mistakes are never errors: editor operations decline silently and
//! report whether they mutated anything. Errors are reserved for media faults
//! and for data the engine cannot safely ignore.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Cutline operations
pub type Result<T> = std::result::Result<T, CutlineError>;

/// Main error type for Cutline operations
#[derive(Error, Debug)]
pub enum CutlineError {
    // Data integrity
    #[error("History snapshot is corrupt: {reason}")]
    CorruptSnapshot {
        reason: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Malformed project data: {reason}")]
    InvalidProject { reason: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // File errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<hound::Error>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // Media collaborators
    #[error("Media probe failed for {path}: {reason}")]
    ProbeFailed { path: PathBuf, reason: String },

    #[error("Media element fault: {reason}")]
    MediaFault { reason: String },

    // Wrapped
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl CutlineError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            CutlineError::CorruptSnapshot { .. } => "CORRUPT_SNAPSHOT",
            CutlineError::InvalidProject { .. } => "INVALID_PROJECT",
            CutlineError::InvalidConfig { .. } => "INVALID_CONFIG",
            CutlineError::FileNotFound { .. } => "FILE_NOT_FOUND",
            CutlineError::InvalidAudio { .. } => "INVALID_AUDIO",
            CutlineError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            CutlineError::ProbeFailed { .. } => "PROBE_FAILED",
            CutlineError::MediaFault { .. } => "MEDIA_FAULT",
            CutlineError::Io(_) => "IO_ERROR",
            CutlineError::Serialization(_) => "SERIALIZATION_ERROR",
            CutlineError::Image(_) => "IMAGE_ERROR",
        }
    }

    /// Media faults fall back to defaults or retry on the next tick.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CutlineError::ProbeFailed { .. } | CutlineError::MediaFault { .. }
        )
    }

    pub(crate) fn corrupt_snapshot(err: serde_json::Error) -> Self {
        CutlineError::CorruptSnapshot {
            reason: err.to_string(),
            source: Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = CutlineError::InvalidProject {
            reason: "negative duration".to_string(),
        };
        assert_eq!(err.error_code(), "INVALID_PROJECT");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_media_faults_are_recoverable() {
        let err = CutlineError::MediaFault {
            reason: "autoplay blocked".to_string(),
        };
        assert!(err.is_recoverable());

        let err = CutlineError::ProbeFailed {
            path: PathBuf::from("clip.mov"),
            reason: "no decoder".to_string(),
        };
        assert!(err.is_recoverable());
        assert_eq!(err.error_code(), "PROBE_FAILED");
    }

    #[test]
    fn test_corrupt_snapshot_keeps_source() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = CutlineError::corrupt_snapshot(parse_err);
        assert_eq!(err.error_code(), "CORRUPT_SNAPSHOT");
        assert!(std::error::Error::source(&err).is_some());
    }
}
