//! Console state: the single place where events are applied and frames are drawn.
//!
//! `ConsoleState` is owned by the worker thread and is fully synchronous:
//! events go in through [`ConsoleState::apply`], frames come out through
//! [`ConsoleState::tick`]. Nothing here spawns threads or reads the clock, so
//! the whole rendering pipeline can be driven step by step.

mod idle;
mod item;

pub use idle::{IdleLabels, IdleTracker};
pub use item::{ActionItem, Atom};

use crate::action::{ActionId, ActionState, ActionUpdate};
use crate::actor::{ConsoleEvent, ConsoleOutput, InputCoordinator};
use crate::config::ConsoleConfig;
use crate::debug::DebugLog;
use crate::log_sources::LogSources;
use crate::render::{Screen, StickyBlocks};
use crate::terminal::SharedOutput;
use crate::tree::ActionTree;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::ops::ControlFlow;

/// Action counts shown in the summary banner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts {
    /// Running actions not waiting on an anchor.
    pub running: usize,
    /// Waiting actions.
    pub waiting: usize,
    /// Running actions waiting on an anchor.
    pub anchored: usize,
}

impl StateCounts {
    /// Whether nothing is running or waiting.
    pub const fn is_idle(&self) -> bool {
        self.running + self.waiting + self.anchored == 0
    }
}

/// Everything the console knows.
#[derive(Debug)]
pub struct ConsoleState {
    pub(crate) config: ConsoleConfig,
    pub(crate) items: Vec<ActionItem>,
    index: HashMap<ActionId, usize>,
    pub(crate) tree: ActionTree,
    pub(crate) buffer: Vec<ConsoleOutput>,
    pub(crate) sticky: StickyBlocks,
    pub(crate) idle_labels: IdleLabels,
    pub(crate) idle: IdleTracker,
    pub(crate) input: InputCoordinator,
    pub(crate) log_sources: LogSources,
    pub(crate) debug: Option<DebugLog>,
    screen: Screen,
    output: SharedOutput,
}

impl ConsoleState {
    /// Create an empty state writing frames to `output`.
    pub fn new(config: ConsoleConfig, output: SharedOutput, log_sources: LogSources) -> Self {
        let screen = if config.debug_console {
            Screen::append_only()
        } else {
            Screen::new()
        };
        Self {
            config,
            items: Vec::new(),
            index: HashMap::new(),
            tree: ActionTree::default(),
            buffer: Vec::new(),
            sticky: StickyBlocks::default(),
            idle_labels: IdleLabels::default(),
            idle: IdleTracker::default(),
            input: InputCoordinator::default(),
            log_sources,
            debug: None,
            screen,
            output,
        }
    }

    /// Append frame snapshots to `debug`.
    #[must_use]
    pub fn with_debug_log(mut self, debug: DebugLog) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Apply one event. Breaks on [`ConsoleEvent::Shutdown`].
    pub fn apply(&mut self, event: ConsoleEvent, now: DateTime<Utc>) -> ControlFlow<()> {
        match event {
            ConsoleEvent::Action(update) => self.upsert(*update, now),
            ConsoleEvent::AttachmentsUpdated { id, results } => {
                if let Some(&index) = self.index.get(&id) {
                    self.items[index].attach(results);
                }
            }
            ConsoleEvent::Output(block) => self.buffer.push(block),
            ConsoleEvent::SetSticky { name, content } => {
                self.sticky.set(&name, &content, &self.config.sticky);
            }
            ConsoleEvent::PushIdleLabel { token, label } => self.idle_labels.push(token, label),
            ConsoleEvent::PopIdleLabel { token } => self.idle_labels.pop(token),
            ConsoleEvent::EnterInputMode { notify } => self.input.request(notify),
            ConsoleEvent::ResumeRendering => self.input.resume(),
            ConsoleEvent::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn upsert(&mut self, update: ActionUpdate, now: DateTime<Utc>) {
        let id = update.record.id.clone();
        match self.index.get(&id) {
            Some(&index) => {
                let item = &mut self.items[index];
                if update.record.state < item.record.state {
                    tracing::trace!(%id, "ignoring out of order action update");
                    return;
                }
                item.update(update);
            }
            None => {
                self.index.insert(id, self.items.len());
                self.items.push(ActionItem::new(update));
            }
        }
        self.rebuild(now);
    }

    pub(crate) fn rebuild(&mut self, now: DateTime<Utc>) {
        self.tree = ActionTree::build(&self.items);
        self.idle.update(&self.items, now);
    }

    /// Drop completed actions. Returns whether any was removed.
    pub(crate) fn prune_done(&mut self, now: DateTime<Utc>) -> bool {
        let before = self.items.len();
        self.items.retain(|item| !item.record.state.is_done());
        if self.items.len() == before {
            return false;
        }
        self.index = self
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| (item.record.id.clone(), index))
            .collect();
        self.rebuild(now);
        true
    }

    /// Count running, waiting and anchored actions.
    pub fn counts(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for item in &self.items {
            let record = &item.record;
            match record.state {
                ActionState::Running if !record.indefinite => {
                    if record.anchor().is_some() {
                        counts.anchored += 1;
                    } else {
                        counts.running += 1;
                    }
                }
                ActionState::Waiting => counts.waiting += 1,
                _ => {}
            }
        }
        counts
    }

    /// Periodic frame.
    ///
    /// When idle, draws a flush frame and hands the terminal to any pending
    /// input-mode caller.
    pub fn tick(&mut self, now: DateTime<Utc>, size: Option<(u16, u16)>) {
        if !self.input.is_rendering() {
            return;
        }
        if self.counts().is_idle() {
            self.render(now, size, true);
            self.input.release_waiters();
        } else {
            self.render(now, size, false);
        }
    }

    /// Draw one frame and write it out.
    ///
    /// A write failure drops the frame and forgets what is on screen, so the
    /// next frame is drawn from scratch.
    pub fn render(&mut self, now: DateTime<Utc>, size: Option<(u16, u16)>, flush: bool) {
        let mut screen = std::mem::take(&mut self.screen);
        let result = if self.config.interactive {
            screen.repaint(|raw| self.draw_frame(raw, now, size, flush))
        } else {
            screen.passthrough(|out| self.draw_frame(out, now, size, flush).map(drop))
        };

        let written = result.and_then(|changed| {
            if changed {
                self.output.write_all(screen.output())
            } else {
                Ok(())
            }
        });
        if let Err(err) = written {
            tracing::warn!(error = %err, "failed to write console frame");
            screen.invalidate();
        }
        screen.clear_output();
        self.screen = screen;
    }

    /// Whether frames are being drawn (false while in input mode).
    pub const fn is_rendering(&self) -> bool {
        self.input.is_rendering()
    }

    /// Tracked actions.
    pub fn items(&self) -> &[ActionItem] {
        &self.items
    }

    /// Current display tree.
    pub const fn tree(&self) -> &ActionTree {
        &self.tree
    }

    /// Current sticky blocks.
    pub const fn sticky(&self) -> &StickyBlocks {
        &self.sticky
    }

    /// Differ, for inspecting what was drawn.
    pub const fn screen(&self) -> &Screen {
        &self.screen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionRecord, Arg, ResultData};
    use crate::actor::OutputCategory;
    use crate::terminal::MemoryOutput;
    use crossbeam_channel::bounded;

    fn state() -> (ConsoleState, MemoryOutput) {
        let memory = MemoryOutput::new();
        let state = ConsoleState::new(
            ConsoleConfig::default(),
            SharedOutput::new(memory.clone()),
            LogSources::default(),
        );
        (state, memory)
    }

    fn action(record: ActionRecord) -> ConsoleEvent {
        ConsoleEvent::Action(Box::new(ActionUpdate {
            record,
            ..ActionUpdate::default()
        }))
    }

    #[test]
    fn test_upsert_overwrites() {
        let (mut state, _) = state();
        let now = Utc::now();
        let _ = state.apply(action(ActionRecord::new("a", "build")), now);
        let _ = state.apply(action(ActionRecord::new("a", "build").start()), now);

        assert_eq!(state.items().len(), 1);
        assert_eq!(state.items()[0].record.state, ActionState::Running);
    }

    #[test]
    fn test_state_never_moves_backwards() {
        let (mut state, _) = state();
        let now = Utc::now();
        let _ = state.apply(action(ActionRecord::new("a", "build").start()), now);
        let _ = state.apply(action(ActionRecord::new("a", "build")), now);
        assert_eq!(state.items()[0].record.state, ActionState::Running);
    }

    #[test]
    fn test_attachments_for_unknown_action_are_ignored() {
        let (mut state, _) = state();
        let now = Utc::now();
        let _ = state.apply(
            ConsoleEvent::AttachmentsUpdated {
                id: "ghost".into(),
                results: ResultData::default().with(Arg::new("n", 1)),
            },
            now,
        );
        assert!(state.items().is_empty());

        let _ = state.apply(action(ActionRecord::new("a", "build").start()), now);
        let _ = state.apply(
            ConsoleEvent::AttachmentsUpdated {
                id: "a".into(),
                results: ResultData::default().with(Arg::new("n", 1)),
            },
            now,
        );
        assert_eq!(state.items()[0].atoms[0].key, "n");
    }

    #[test]
    fn test_counts() {
        let (mut state, _) = state();
        let now = Utc::now();
        for event in [
            action(ActionRecord::new("a", "a").start()),
            action(ActionRecord::new("b", "b").with_anchor("a").start()),
            action(ActionRecord::new("c", "c")),
            action(ActionRecord::new("d", "d").indefinite().start()),
            action(ActionRecord::new("e", "e").complete(None)),
        ] {
            let _ = state.apply(event, now);
        }
        assert_eq!(
            state.counts(),
            StateCounts {
                running: 1,
                waiting: 1,
                anchored: 1
            }
        );
    }

    #[test]
    fn test_shutdown_breaks() {
        let (mut state, _) = state();
        assert!(state.apply(ConsoleEvent::Shutdown, Utc::now()).is_break());
        assert!(state.apply(ConsoleEvent::ResumeRendering, Utc::now()).is_continue());
    }

    #[test]
    fn test_idle_tick_releases_input_mode() {
        let (mut state, _) = state();
        let now = Utc::now();
        let (notify, notified) = bounded::<()>(1);
        let _ = state.apply(action(ActionRecord::new("a", "build").start()), now);
        let _ = state.apply(ConsoleEvent::EnterInputMode { notify }, now);

        state.tick(now, Some((80, 24)));
        assert!(state.is_rendering());
        assert!(notified.try_recv().is_err_and(|e| e.is_empty()));

        let _ = state.apply(action(ActionRecord::new("a", "build").complete(None)), now);
        state.tick(now, Some((80, 24)));
        assert!(!state.is_rendering());
        assert_eq!(notified.try_recv(), Ok(()));

        // Paused: ticks draw nothing.
        let _ = state.apply(
            ConsoleEvent::Output(ConsoleOutput {
                source: "s".into(),
                category: OutputCategory::Tool,
                lines: vec!["hello".into()],
                ..ConsoleOutput::default()
            }),
            now,
        );
        state.tick(now, Some((80, 24)));
        assert!(!state.log_sources.contains("s"));

        let _ = state.apply(ConsoleEvent::ResumeRendering, now);
        state.tick(now, Some((80, 24)));
        assert!(state.log_sources.contains("s"));
    }

    #[test]
    fn test_write_failure_is_survived() {
        struct Broken;
        impl std::io::Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut state = ConsoleState::new(
            ConsoleConfig::default(),
            SharedOutput::new(Broken),
            LogSources::default(),
        );
        let now = Utc::now();
        let _ = state.apply(action(ActionRecord::new("a", "build").start()), now);
        state.tick(now, Some((80, 24)));
        assert!(state.screen().previous().is_empty());
    }
}
