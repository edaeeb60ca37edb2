//! # Tasklog
//!
//! A live, flicker-free action tree for developer-platform CLIs.
//!
//! Many threads report the lifecycle of their actions (waiting, running,
//! done) to a [`Console`]. A single worker thread keeps the resulting tree
//! and redraws it in place at a fixed frame rate, while log output scrolls
//! above it.
//!
//! ## Core Concepts
//!
//! - **Single consumer**: all state lives on one worker thread fed by an unbounded queue
//! - **Anchors**: an action waiting on another is displayed as the action it waits on
//! - **Depth budget**: deep subtrees collapse first so the tree fits the terminal
//! - **Differential repaint**: unchanged lines are stepped over, identical frames cost nothing
//! - **Input mode**: callers can pause rendering to read from the terminal
//!
//! ## Example
//!
//! ```rust,ignore
//! use tasklog::{ActionRecord, ConsoleConfig, ConsoleSink, ResultData};
//!
//! let sink = ConsoleSink::start(ConsoleConfig::from_env())?;
//! let console = sink.console();
//!
//! let build = ActionRecord::new("b1", "docker.build").with_category("build");
//! console.started(build.clone(), None);
//! console.done(build, ResultData::default());
//!
//! sink.stop();
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod action;
pub mod actor;
pub mod config;
pub mod debug;
pub mod error;
pub mod log_sources;
pub mod render;
pub mod state;
pub mod terminal;
pub mod tree;

// Re-exports for convenience
pub use action::{
    ActionError, ActionId, ActionProgress, ActionRecord, ActionState, ActionUpdate, Arg, ArgValue,
    ErrorKind, Progress, ResultData,
};
pub use actor::{Console, ConsoleSink, IdleLabelGuard, InputModeGuard, OutputCategory};
pub use config::{ConsoleConfig, DisplayFlags, StickyPolicy};
pub use error::StartupError;
pub use log_sources::{LogSources, MAX_LOG_SOURCES};
pub use state::{ConsoleState, StateCounts};
pub use terminal::{CrosstermSize, FixedSize, MemoryOutput, SharedOutput, TerminalSize};
