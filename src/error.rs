//! Errors surfaced when starting the console.
//!
//! Once running, the engine has no fatal error path: bad event data degrades
//! to fallbacks and frame write failures are logged and skipped.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to bring up the console engine.
#[derive(Debug, Error)]
pub enum StartupError {
    /// A worker thread could not be spawned.
    #[error("failed to spawn {thread} thread: {source}")]
    Spawn {
        /// Thread name.
        thread: &'static str,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The debug snapshot file could not be created.
    #[error("failed to create console debug output {}: {source}", path.display())]
    DebugOutput {
        /// Requested path.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
}
