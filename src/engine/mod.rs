//! Playback Engine Module
//!
//! Core playback machinery including:
//! - Playback clock state machine
//! - Active-clip resolution per tick
//! - Media element synchronization
//! - The scheduling loop tying them together

pub mod playback;
pub mod resolver;
pub mod sync;
pub mod transport;

pub use playback::{run_playback, IntervalScheduler, PlaybackEngine, RecordingSession, Scheduler};
pub use resolver::{fade_factor, resolve, ActiveAudio, ActiveVisual, ResolvedFrame};
pub use sync::{MediaElement, MediaHost, MediaSynchronizer};
pub use transport::{ClockState, PlaybackClock, TickOutcome};
