//! Engine: starts the console threads and hands out [`Console`] handles.
//!
//! ```text
//! producers ──ConsoleEvent──▶ queue ──▶ worker ──frame──▶ output
//!                                         ▲
//!                              ticker ────┘ Tick
//! ```

use super::input::{enter_input_mode, InputModeGuard};
use super::messages::{ConsoleEvent, ConsoleOutput, OutputCategory};
use super::ticker::TickerActor;
use super::worker::Worker;
use crate::action::{ActionId, ActionRecord, ActionState, ActionUpdate, Progress, ResultData};
use crate::config::ConsoleConfig;
use crate::debug::DebugLog;
use crate::error::StartupError;
use crate::log_sources::LogSources;
use crate::state::ConsoleState;
use crate::terminal::{CrosstermSize, SharedOutput, TerminalSize};
use chrono::Utc;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// The running console. Stopping it (or dropping it) draws a final frame.
#[derive(Debug)]
pub struct ConsoleSink {
    console: Console,
    worker: Option<JoinHandle<()>>,
    ticker: Option<TickerActor>,
}

impl ConsoleSink {
    /// Start a console on standard output.
    ///
    /// # Errors
    ///
    /// Returns an error if a thread cannot be spawned or the debug output
    /// file cannot be created.
    pub fn start(config: ConsoleConfig) -> Result<Self, StartupError> {
        Self::start_with(config, SharedOutput::stdout(), CrosstermSize)
    }

    /// Start a console on `output`, sized by `size`.
    ///
    /// # Errors
    ///
    /// Returns an error if a thread cannot be spawned or the debug output
    /// file cannot be created.
    pub fn start_with(
        config: ConsoleConfig,
        output: SharedOutput,
        size: impl TerminalSize + 'static,
    ) -> Result<Self, StartupError> {
        let debug = config
            .debug_output
            .as_deref()
            .map(DebugLog::create)
            .transpose()?;

        let log_sources = LogSources::default();
        let (tx, rx) = unbounded::<ConsoleEvent>();
        let ticker = TickerActor::spawn(config.frame_interval())?;

        let fps = config.fps;
        let interactive = config.interactive;
        let mut state = ConsoleState::new(config, output.clone(), log_sources.clone());
        if let Some(debug) = debug {
            state = state.with_debug_log(debug);
        }
        let worker = Worker::new(state, rx, ticker.receiver().clone(), Box::new(size));

        let handle = thread::Builder::new()
            .name("tasklog-console".to_string())
            .spawn(move || worker.run())
            .map_err(|source| StartupError::Spawn {
                thread: "tasklog-console",
                source,
            })?;

        tracing::info!(fps, interactive, "console started");

        Ok(Self {
            console: Console {
                tx,
                log_sources,
                output,
                tokens: Arc::new(AtomicU64::new(1)),
            },
            worker: Some(handle),
            ticker: Some(ticker),
        })
    }

    /// A handle for producers.
    pub fn console(&self) -> Console {
        self.console.clone()
    }

    /// Draw a final frame and stop the threads.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.console.tx.send(ConsoleEvent::Shutdown);
            if worker.join().is_err() {
                tracing::warn!("console worker panicked");
            }
        }
        if let Some(ticker) = self.ticker.take() {
            ticker.join();
            tracing::info!("console stopped");
        }
    }
}

impl Drop for ConsoleSink {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Cloneable producer handle. Every method returns immediately except
/// [`Console::enter_input_mode`]; events sent after the console stopped are dropped.
#[derive(Debug, Clone)]
pub struct Console {
    tx: Sender<ConsoleEvent>,
    log_sources: LogSources,
    output: SharedOutput,
    tokens: Arc<AtomicU64>,
}

impl Console {
    fn send(&self, event: ConsoleEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("console stopped, dropping event");
        }
    }

    fn action(&self, record: ActionRecord, results: ResultData, progress: Option<Progress>) {
        self.send(ConsoleEvent::Action(Box::new(ActionUpdate {
            record,
            results,
            progress,
        })));
    }

    /// An action was created and waits to run.
    pub fn waiting(&self, mut record: ActionRecord, progress: Option<Progress>) {
        record.state = ActionState::Waiting;
        self.action(record, ResultData::default(), progress);
    }

    /// An action started running.
    pub fn started(&self, mut record: ActionRecord, progress: Option<Progress>) {
        record.state = ActionState::Running;
        record.started.get_or_insert_with(Utc::now);
        self.action(record, ResultData::default(), progress);
    }

    /// An action completed, successfully or with `record.error`.
    pub fn done(&self, mut record: ActionRecord, results: ResultData) {
        let now = Utc::now();
        record.state = ActionState::Done;
        record.started.get_or_insert(now);
        record.completed.get_or_insert(now);
        let progress = results.progress.clone();
        self.action(record, results, progress);
    }

    /// A one-shot action that completed without ever running.
    pub fn instant(&self, mut record: ActionRecord) {
        let now = Utc::now();
        record.state = ActionState::Done;
        record.started = Some(now);
        record.completed = Some(now);
        self.action(record, ResultData::default(), None);
    }

    /// Replace the results (and progress, if given) of an existing action.
    pub fn attachments_updated(&self, id: impl Into<ActionId>, results: ResultData) {
        self.send(ConsoleEvent::AttachmentsUpdated {
            id: id.into(),
            results,
        });
    }

    /// Queue output lines, written above the live area on the next frame.
    pub fn write_lines<I, S>(&self, source: &str, name: &str, category: OutputCategory, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.send(ConsoleEvent::Output(ConsoleOutput {
            source: source.to_string(),
            name: name.to_string(),
            category,
            lines: lines.into_iter().map(Into::into).collect(),
        }));
    }

    /// Set a sticky block; empty content removes it.
    pub fn set_sticky_content(&self, name: &str, content: &str) {
        self.send(ConsoleEvent::SetSticky {
            name: name.to_string(),
            content: content.to_string(),
        });
    }

    /// Show `label` while idle, until the guard is restored or dropped.
    pub fn set_idle_label(&self, label: impl Into<String>) -> IdleLabelGuard {
        let token = self.tokens.fetch_add(1, Ordering::Relaxed);
        self.send(ConsoleEvent::PushIdleLabel {
            token,
            label: label.into(),
        });
        IdleLabelGuard {
            tx: Some(self.tx.clone()),
            token,
        }
    }

    /// Wait until nothing runs, then take over the terminal.
    ///
    /// Blocks until the console hands over the terminal or `cancel` receives
    /// (or disconnects). `prompt` is written once the terminal is ours.
    pub fn enter_input_mode(&self, cancel: &Receiver<()>, prompt: Option<&str>) -> InputModeGuard {
        enter_input_mode(&self.tx, &self.output, cancel, prompt)
    }

    /// Whether one of the recently flushed lines came from `source`.
    pub fn recent_log_sources_contain(&self, source: &str) -> bool {
        self.log_sources.contains(source)
    }

    /// A random identifier for a new output source.
    pub fn allocate_console_id(&self) -> u64 {
        rand::random()
    }
}

/// Keeps an idle label displayed. The previous label returns on restore or drop.
#[must_use = "the label is removed as soon as the guard is dropped"]
#[derive(Debug)]
pub struct IdleLabelGuard {
    tx: Option<Sender<ConsoleEvent>>,
    token: u64,
}

impl IdleLabelGuard {
    /// Remove the label now.
    pub fn restore(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(ConsoleEvent::PopIdleLabel { token: self.token });
        }
    }
}

impl Drop for IdleLabelGuard {
    fn drop(&mut self) {
        self.release();
    }
}
