//! Cutline - Timeline and Playback Engine
//!
//! Cutline is the core of a non-linear audio/video editor: clips placed on
//! video and audio tracks, non-destructive edits with undo/redo, a playback
//! clock that keeps independent media elements in sync, a still-frame
//! compositor and a standalone audio mixing studio.
//!
//! # Architecture
//!
//! - `timeline`: clips, tracks and quantized time arithmetic
//! - `state`: the editing session, snapshot history and project files
//! - `editor`: split, trim, move-with-snap and property edits
//! - `engine`: clock, active-clip resolution and media synchronization
//! - `render`: color filters and the frame compositor
//! - `dsp`: the audio studio (EQ, pan, gain, mixdown)

pub mod cli;
pub mod config;
pub mod dsp;
pub mod editor;
pub mod engine;
pub mod error;
pub mod render;
pub mod state;
pub mod timeline;

pub use config::EngineConfig;
pub use error::{CutlineError, Result};
pub use state::{ProjectState, Session};
pub use timeline::{Clip, ClipKind, Timeline, Track, TrackKind};
