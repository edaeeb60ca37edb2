//! Terminal boundary: where frames go and how big the screen is.

mod output;
mod size;

pub use output::{MemoryOutput, SharedOutput};
pub use size::{CrosstermSize, FixedSize, TerminalSize};
