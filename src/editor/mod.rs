//! Clip Editor
//!
//! Split, trim, move-with-snap, delete and property updates over the
//! session's timeline, plus the media pool clips are placed from.

mod commands;
pub mod ops;
mod pool;
mod suggestion;

pub use commands::{DragGesture, PointerAction};
pub use ops::TrimEdge;
pub use pool::{kind_for_path, ImageProbe, MediaInfo, MediaPool, MediaProbe};
pub use suggestion::{EditSuggestion, PendingChanges, SuggestionService};
