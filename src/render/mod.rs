//! Frame rendering: color filters and the still-frame compositor.

mod compositor;
mod filter;

pub use compositor::{blend_channel, parse_hex_color, Compositor, FrameSource, StillFrameSource};
pub use filter::{preset_ops, FilterOp, FilterStack};
