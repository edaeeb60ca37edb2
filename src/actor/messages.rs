//! Message types for actor communication.
//!
//! Every change to the console state travels as a [`ConsoleEvent`] over one
//! unbounded queue, so the worker applies them in the order they were sent.

use crate::action::{ActionId, ActionUpdate, ResultData};
use crossbeam_channel::Sender;

/// Who produced a block of output lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputCategory {
    /// The console's own output.
    Us,
    /// Passthrough output of an external tool.
    #[default]
    Tool,
}

/// A block of plain output lines attributed to a source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleOutput {
    /// Identifier of the producer, recorded in the recent log sources.
    pub source: String,
    /// Display name. Empty, `stdout` and `stderr` blocks are written bare.
    pub name: String,
    /// Producer kind.
    pub category: OutputCategory,
    /// Lines, without trailing newlines.
    pub lines: Vec<String>,
}

impl ConsoleOutput {
    /// Whether the block is written without a header bar.
    pub(crate) fn is_bare(&self) -> bool {
        matches!(self.name.as_str(), "" | "stdout" | "stderr")
    }
}

/// Events consumed by the console worker.
#[derive(Debug)]
pub enum ConsoleEvent {
    /// Insert or overwrite an action.
    Action(Box<ActionUpdate>),

    /// Replace the results of an existing action.
    AttachmentsUpdated {
        /// Target action.
        id: ActionId,
        /// New results.
        results: ResultData,
    },

    /// Output lines to flush above the live area on the next frame.
    Output(ConsoleOutput),

    /// Set or, with empty content, remove a sticky block.
    SetSticky {
        /// Block name.
        name: String,
        /// Block content; lines separated by `\n`.
        content: String,
    },

    /// Push an idle label.
    PushIdleLabel {
        /// Identifies the label when it is popped.
        token: u64,
        /// Label text.
        label: String,
    },

    /// Remove a previously pushed idle label.
    PopIdleLabel {
        /// Token given when the label was pushed.
        token: u64,
    },

    /// Stop rendering once idle, then signal `notify`.
    EnterInputMode {
        /// Receives `()` when the terminal is handed over. A request whose
        /// receiver is gone is treated as cancelled.
        notify: Sender<()>,
    },

    /// Take the terminal back after input mode.
    ResumeRendering,

    /// Draw a final frame and stop the worker.
    Shutdown,
}
