//! Input mode: handing the terminal to a caller that needs to read from it.
//!
//! A caller asks for input mode and blocks. The worker keeps rendering until
//! nothing is running or waiting, draws a final flush frame, then stops
//! rendering and wakes every pending caller. Rendering resumes when the
//! caller's guard is released.
//!
//! A caller that gives up drops its notifier receiver before telling the
//! worker to resume, so a waiter whose receiver is gone never pauses the
//! console.

use super::messages::ConsoleEvent;
use crate::terminal::SharedOutput;
use crossbeam_channel::{bounded, select, Receiver, Sender};

/// Worker-side state of the handshake.
#[derive(Debug)]
pub struct InputCoordinator {
    rendering: bool,
    waiters: Vec<Sender<()>>,
}

impl Default for InputCoordinator {
    fn default() -> Self {
        Self {
            rendering: true,
            waiters: Vec::new(),
        }
    }
}

impl InputCoordinator {
    /// Queue a caller to be woken at the next idle frame.
    pub fn request(&mut self, notify: Sender<()>) {
        self.waiters.push(notify);
    }

    /// Start rendering again.
    pub fn resume(&mut self) {
        self.rendering = true;
    }

    /// Whether frames are being drawn.
    pub const fn is_rendering(&self) -> bool {
        self.rendering
    }

    /// Whether a caller is waiting for the terminal.
    pub fn has_waiters(&self) -> bool {
        !self.waiters.is_empty()
    }

    /// Wake every pending caller. Rendering stops if any of them is still
    /// listening; cancelled requests are discarded.
    pub fn release_waiters(&mut self) {
        let live = self
            .waiters
            .drain(..)
            .filter(|notify| notify.try_send(()).is_ok())
            .count();
        self.rendering = live == 0;
        if live > 0 {
            tracing::debug!(waiters = live, "entering input mode");
        }
    }
}

/// Holds the terminal while in input mode. Rendering resumes on release or drop.
#[must_use = "rendering resumes as soon as the guard is dropped"]
#[derive(Debug)]
pub struct InputModeGuard {
    tx: Option<Sender<ConsoleEvent>>,
}

impl InputModeGuard {
    pub(crate) const fn noop() -> Self {
        Self { tx: None }
    }

    /// Whether this guard actually paused rendering.
    pub const fn is_active(&self) -> bool {
        self.tx.is_some()
    }

    /// Resume rendering now.
    pub fn resume(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(tx) = self.tx.take() {
            tracing::debug!("leaving input mode");
            let _ = tx.send(ConsoleEvent::ResumeRendering);
        }
    }
}

impl Drop for InputModeGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// Block until the worker hands over the terminal or `cancel` fires.
pub(crate) fn enter_input_mode(
    tx: &Sender<ConsoleEvent>,
    output: &SharedOutput,
    cancel: &Receiver<()>,
    prompt: Option<&str>,
) -> InputModeGuard {
    // One slot: the worker's handover never blocks and is never lost.
    let (notify, notified) = bounded::<()>(1);
    if tx.send(ConsoleEvent::EnterInputMode { notify }).is_err() {
        return InputModeGuard::noop();
    }

    let handed_over = select! {
        recv(notified) -> msg => Some(msg.is_ok()),
        recv(cancel) -> _ => None,
    };
    // Must be gone before the resume below is queued.
    drop(notified);

    match handed_over {
        Some(true) => {
            if let Some(prompt) = prompt {
                if let Err(err) = output.write_all(prompt.as_bytes()) {
                    tracing::warn!(error = %err, "failed to write input prompt");
                }
            }
            InputModeGuard { tx: Some(tx.clone()) }
        }
        Some(false) => {
            tracing::debug!("console stopped before input mode was granted");
            InputModeGuard::noop()
        }
        None => {
            let _ = tx.send(ConsoleEvent::ResumeRendering);
            InputModeGuard::noop()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_release_without_waiters_keeps_rendering() {
        let mut input = InputCoordinator::default();
        input.release_waiters();
        assert!(input.is_rendering());
    }

    #[test]
    fn test_release_wakes_waiters_and_stops_rendering() {
        let mut input = InputCoordinator::default();
        let (notify, notified) = bounded::<()>(1);
        input.request(notify);
        assert!(input.has_waiters());

        input.release_waiters();
        assert!(!input.is_rendering());
        assert!(!input.has_waiters());
        assert_eq!(notified.try_recv(), Ok(()));

        input.resume();
        assert!(input.is_rendering());
    }

    #[test]
    fn test_cancelled_waiter_does_not_pause() {
        let mut input = InputCoordinator::default();
        let (gone, gone_rx) = bounded::<()>(1);
        drop(gone_rx);
        input.request(gone);

        input.release_waiters();
        assert!(input.is_rendering());
        assert!(!input.has_waiters());

        let (gone, gone_rx) = bounded::<()>(1);
        drop(gone_rx);
        let (live, live_rx) = bounded::<()>(1);
        input.request(gone);
        input.request(live);

        input.release_waiters();
        assert!(!input.is_rendering());
        assert_eq!(live_rx.try_recv(), Ok(()));
    }

    #[test]
    fn test_guard_resumes_on_drop() {
        let (tx, rx) = unbounded();
        drop(InputModeGuard { tx: Some(tx) });
        assert!(matches!(rx.try_recv(), Ok(ConsoleEvent::ResumeRendering)));
    }

    #[test]
    fn test_enter_without_worker_is_noop() {
        let (tx, rx) = unbounded::<ConsoleEvent>();
        drop(rx);
        let (_cancel_tx, cancel) = bounded(0);
        let guard = enter_input_mode(&tx, &SharedOutput::new(std::io::sink()), &cancel, None);
        assert!(!guard.is_active());
    }

    #[test]
    fn test_cancel_sends_resume() {
        let (tx, rx) = unbounded::<ConsoleEvent>();
        let (cancel_tx, cancel) = bounded(1);
        cancel_tx.send(()).unwrap();

        let guard = enter_input_mode(&tx, &SharedOutput::new(std::io::sink()), &cancel, None);
        assert!(!guard.is_active());
        let Ok(ConsoleEvent::EnterInputMode { notify }) = rx.try_recv() else {
            panic!("expected an input mode request");
        };
        assert!(matches!(rx.try_recv(), Ok(ConsoleEvent::ResumeRendering)));
        // The request is already abandoned when the resume arrives.
        assert!(notify.try_send(()).is_err_and(|e| e.is_disconnected()));
    }

    #[test]
    fn test_worker_gone_while_waiting_is_noop() {
        let (tx, rx) = unbounded::<ConsoleEvent>();
        let worker = std::thread::spawn(move || {
            // Exit without granting, dropping the notifier.
            let _ = rx.recv();
        });
        let output = crate::terminal::MemoryOutput::new();
        let (_cancel_tx, cancel) = bounded(0);

        let guard = enter_input_mode(&tx, &SharedOutput::new(output.clone()), &cancel, Some("ok? "));
        worker.join().unwrap();
        assert!(!guard.is_active());
        assert!(output.contents().is_empty());
    }
}
