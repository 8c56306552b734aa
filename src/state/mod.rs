//! State Management Module
//!
//! Session context, undo/redo history and project persistence.

pub mod history;
pub mod project;
pub mod session;

pub use history::{EditHistory, HistoryEntry, Snapshot, DEFAULT_HISTORY_CAP};
pub use project::{ProjectState, PROJECT_FILE, PROJECT_SCHEMA_VERSION};
pub use session::{EditTool, PlaybackState, Session};
