//! Timeline Model
//!
//! Ordered tracks of clips plus the time arithmetic every edit goes through.
//! Pure data: behaviour beyond invariant checks lives in `editor`.

mod clip;
mod time;
mod track;

pub use clip::{BlendMode, Clip, ClipKind, ClipPatch, FadeCurve, FilterPreset, TextStyle};
pub use time::{quantize, time_eq, timeline_extent, TIME_RESOLUTION};
pub use track::{ClipLocation, Timeline, Track, TrackKind};

pub(crate) use clip::fresh_id;
