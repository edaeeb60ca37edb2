//! Worker Actor: the single consumer of console events.
//!
//! Owns the [`ConsoleState`] and alternates between applying queued events
//! and drawing a frame on every tick.

use super::messages::ConsoleEvent;
use super::ticker::Tick;
use crate::state::ConsoleState;
use crate::terminal::TerminalSize;
use chrono::Utc;
use crossbeam_channel::{select, Receiver};

/// State and inputs of the worker thread.
pub(crate) struct Worker {
    state: ConsoleState,
    events: Receiver<ConsoleEvent>,
    ticks: Receiver<Tick>,
    size: Box<dyn TerminalSize>,
}

impl Worker {
    pub(crate) fn new(
        state: ConsoleState,
        events: Receiver<ConsoleEvent>,
        ticks: Receiver<Tick>,
        size: Box<dyn TerminalSize>,
    ) -> Self {
        Self {
            state,
            events,
            ticks,
            size,
        }
    }

    /// Run until shut down, then draw a final flush frame.
    pub(crate) fn run(mut self) {
        loop {
            select! {
                recv(self.events) -> event => {
                    let Ok(event) = event else { break };
                    if self.state.apply(event, Utc::now()).is_break() {
                        break;
                    }
                }
                recv(self.ticks) -> tick => {
                    if tick.is_err() {
                        tracing::debug!("ticker stopped");
                        break;
                    }
                    self.state.tick(Utc::now(), self.size.size());
                }
            }
        }

        self.state.render(Utc::now(), self.size.size(), true);
    }
}
