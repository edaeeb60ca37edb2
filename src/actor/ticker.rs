//! Ticker Actor: Dedicated thread pacing console frames.
//!
//! The worker `select!`s over its event queue and this ticker, so frames are
//! drawn at a steady rate no matter how busy the queue is. The ticker sleeps
//! on its stop channel between ticks, so stopping it takes effect at once.

use crate::error::StartupError;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Frame deadline reached. The worker reads the clock itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick;

/// Ticker actor that generates regular timing events.
#[derive(Debug)]
pub struct TickerActor {
    handle: Option<JoinHandle<()>>,
    /// Dropping this stops the thread.
    stop: Option<Sender<()>>,
    tick_rx: Receiver<Tick>,
}

impl TickerActor {
    /// Spawn a ticker firing every `interval`.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::Spawn`] if the OS fails to spawn the thread.
    pub fn spawn(interval: Duration) -> Result<Self, StartupError> {
        let (stop_tx, stop_rx) = bounded::<()>(0);
        // Ticks must not queue up behind a slow frame.
        let (tick_tx, tick_rx) = bounded(2);

        let handle = thread::Builder::new()
            .name("tasklog-ticker".to_string())
            .spawn(move || Self::run_loop(&tick_tx, &stop_rx, interval))
            .map_err(|source| StartupError::Spawn {
                thread: "tasklog-ticker",
                source,
            })?;

        Ok(Self {
            handle: Some(handle),
            stop: Some(stop_tx),
            tick_rx,
        })
    }

    /// Tick receiver, for use with `select!`.
    #[inline]
    pub const fn receiver(&self) -> &Receiver<Tick> {
        &self.tick_rx
    }

    /// Signal the ticker to stop. The tick channel disconnects once it has.
    pub fn shutdown(&mut self) {
        self.stop.take();
    }

    /// Stop the ticker and wait for its thread.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn run_loop(tick_tx: &Sender<Tick>, stop: &Receiver<()>, interval: Duration) {
        let mut next_tick = Instant::now() + interval;

        loop {
            let wait = next_tick.saturating_duration_since(Instant::now());
            if !matches!(stop.recv_timeout(wait), Err(RecvTimeoutError::Timeout)) {
                break;
            }

            // Skipped when the worker is behind.
            let _ = tick_tx.try_send(Tick);

            let now = Instant::now();
            next_tick += interval;
            if next_tick < now {
                next_tick = now + interval;
            }
        }
    }
}

impl Drop for TickerActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_basic() {
        let ticker = TickerActor::spawn(Duration::from_millis(10)).unwrap();

        let tick = ticker.receiver().recv_timeout(Duration::from_millis(100));
        assert_eq!(tick, Ok(Tick));

        let tick = ticker.receiver().recv_timeout(Duration::from_millis(50));
        assert!(tick.is_ok());

        ticker.join();
    }

    #[test]
    fn test_shutdown_disconnects_receiver() {
        let mut ticker = TickerActor::spawn(Duration::from_secs(60)).unwrap();
        let ticks = ticker.receiver().clone();
        ticker.shutdown();

        // The thread wakes at once rather than after a full interval.
        assert!(ticks.recv_timeout(Duration::from_secs(5)).is_err_and(|e| e.is_disconnected()));
        ticker.join();
    }
}
