//! Rendering: from console state to bytes on the terminal.

mod frame;
pub mod line;
pub mod screen;
pub mod sticky;
pub mod style;
pub mod truncate;

pub use line::{format_seconds, render_line};
pub use screen::{RawWriter, RenderStats, Screen};
pub use sticky::{StickyBlock, StickyBlocks};
pub use truncate::{display_width, truncate_with_tail};
