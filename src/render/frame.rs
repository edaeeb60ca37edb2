//! Frame assembly.
//!
//! A frame has two parts. Permanent output (completed actions, buffered log
//! lines) is written straight to the raw writer and scrolls up with the
//! terminal. The live area (sticky blocks, idle banner, summary, action tree)
//! is returned as lines for the differ.

use super::line::{format_seconds, render_line};
use super::style::{sticky_bar, tool_header, us_bar};
use super::truncate::truncate_with_tail;
use crate::action::{ActionState, ErrorKind};
use crate::actor::OutputCategory;
use crate::config::DisplayFlags;
use crate::debug::{DebugAction, DebugFrame};
use crate::state::{ActionItem, ConsoleState};
use crate::tree::{budget, RenderPolicy, BANNER_LINES, DEFAULT_ROWS};
use chrono::{DateTime, Utc};
use crossterm::queue;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use std::io::{self, Write};

/// Rows always left free for log output when fitting sticky blocks.
const LOG_ROWS: i64 = 3;

impl ConsoleState {
    /// Draw one frame: write permanent output to `raw`, return the live area.
    ///
    /// Flush frames stop after the idle banner. Non-interactive consoles only
    /// produce permanent output.
    pub(crate) fn draw_frame<W: Write>(
        &mut self,
        raw: &mut W,
        now: DateTime<Utc>,
        size: Option<(u16, u16)>,
        flush: bool,
    ) -> io::Result<Vec<String>> {
        let width = size.map_or(0, |(w, _)| usize::from(w));
        let height = size.map(|(_, h)| h);
        let counts = self.counts();

        self.log_completed(raw)?;
        let buffer_count = self.flush_output(raw)?;

        if let Some(debug) = self.debug.as_mut() {
            let frame = DebugFrame {
                width: size.map_or(0, |(w, _)| w),
                height: height.unwrap_or(0),
                flush,
                running: self.items.iter().map(DebugAction::from).collect(),
                buffer_count,
            };
            if let Err(err) = debug.record(&frame) {
                tracing::warn!(error = %err, "failed to write console debug snapshot");
            }
        }

        self.prune_done(now);

        let mut lines = Vec::new();
        if !self.config.interactive {
            return Ok(lines);
        }

        let policy = self.render_policy();
        let budget = budget(&self.tree, &self.items, policy, height);

        if !self.sticky.is_empty() {
            let rows = height.map_or(DEFAULT_ROWS + BANNER_LINES, usize::from);
            let available = to_i64(rows) - to_i64(budget.lines) - LOG_ROWS;
            let (blocks, hidden) = self.sticky.fit(available, &self.config.sticky);
            let bar = format!("{} ", sticky_bar());

            if available > 2 {
                push_line(&mut lines, width, &bar, "");
            }
            for (k, block) in blocks.iter().enumerate() {
                if k > 0 && !block.lines.is_empty() {
                    push_line(&mut lines, width, &bar, "");
                }
                for line in &block.lines {
                    push_line(&mut lines, width, &format!("{bar}{line}"), "");
                }
            }
            if !hidden.is_empty() {
                let hiding = format!("[... hiding {}]", hidden.join(", "));
                push_line(&mut lines, width, &format!("{bar}{hiding}"), "");
            }
            if available > 2 {
                push_line(&mut lines, width, &bar, "");
            }
        }

        if counts.is_idle() {
            if !self.input.has_waiters() {
                if let Some(label) = self.idle_labels.current() {
                    push_line(&mut lines, width, &format!("[-] idle, {label}."), "");
                }
            }
            return Ok(lines);
        }

        if flush {
            return Ok(lines);
        }

        let shortened = if budget.render_tree { "" } else { "[...] " };
        let mut report = format!(
            "[+] {shortened}{} {} {} running",
            format_seconds(self.idle.elapsed(now)),
            counts.running.to_string().green(),
            if counts.running == 1 { "action" } else { "actions" },
        );
        if counts.waiting > 0 {
            report.push_str(&format!(", {} waiting", counts.waiting.to_string().cyan()));
        }
        report.push('.');
        push_line(&mut lines, width, &report, "");

        if budget.render_tree {
            let flags = self.config.flags;
            let items = &self.items;
            self.tree.walk(budget.max_depth, |index, _, indent| {
                let item = &items[index];
                if policy.skip(&item.record) {
                    return false;
                }
                let (line, suffix) = tree_line(item, flags, indent, now);
                push_line(&mut lines, width, &line, &suffix);
                true
            });
        }

        Ok(lines)
    }

    fn render_policy(&self) -> RenderPolicy {
        RenderPolicy {
            max_level: self.config.max_level,
            display_waiting: self.config.flags.contains(DisplayFlags::DISPLAY_WAITING),
        }
    }

    /// Write completed actions as permanent lines, oldest completion first.
    fn log_completed<W: Write>(&self, raw: &mut W) -> io::Result<()> {
        let flags = self.config.flags;
        if !flags.contains(DisplayFlags::LOG_ACTIONS) {
            return Ok(());
        }

        let display_waiting = flags.contains(DisplayFlags::DISPLAY_WAITING);
        let mut completed: Vec<&ActionItem> = self
            .items
            .iter()
            .filter(|item| {
                let record = &item.record;
                let failed = record
                    .error
                    .as_ref()
                    .is_some_and(|err| err.kind == ErrorKind::Regular);
                let logged = display_waiting || record.anchor().is_none();
                record.state.is_done()
                    && (logged || failed)
                    && record.level <= self.config.max_level
            })
            .collect();
        completed.sort_by_key(|item| item.record.completed);

        for item in completed {
            write_raw_line(raw, self.config.interactive, &render_line(item, flags))?;
        }
        Ok(())
    }

    /// Write buffered output blocks as permanent lines. Returns the number of blocks.
    fn flush_output<W: Write>(&mut self, raw: &mut W) -> io::Result<usize> {
        let blocks = std::mem::take(&mut self.buffer);
        let interactive = self.config.interactive;

        for block in &blocks {
            let header = match block.category {
                _ if block.is_bare() => None,
                OutputCategory::Us => Some(us_bar()),
                OutputCategory::Tool => Some(tool_header(&block.source, &block.name)),
            };
            for line in &block.lines {
                match &header {
                    Some(header) => write_raw_line(raw, interactive, &format!("{header} {line}"))?,
                    None => write_raw_line(raw, interactive, line)?,
                }
                self.log_sources.record(&block.source);
            }
        }
        Ok(blocks.len())
    }
}

/// Tree line for `item` and its status suffix.
fn tree_line(
    item: &ActionItem,
    flags: DisplayFlags,
    indent: usize,
    now: DateTime<Utc>,
) -> (String, String) {
    let record = &item.record;
    let mut line = String::new();
    if flags.contains(DisplayFlags::OUTPUT_ACTION_ID) {
        line.push_str(&format!(" [{}]", record.id.short()).dark_grey().to_string());
    }
    line.push_str(" => ");
    line.push_str(&"=> ".repeat(indent));
    line.push_str(&render_line(item, flags));

    let suffix = match record.state {
        ActionState::Running => {
            let started = record.started.unwrap_or(record.created);
            let elapsed = (now - started).to_std().unwrap_or_default();
            format!(" ({}) ", format_seconds(elapsed))
        }
        ActionState::Waiting => " (waiting) ".to_string(),
        ActionState::Done => String::new(),
    };
    (line, suffix)
}

/// Append `line` + `suffix`, cut to `width` keeping the suffix visible.
fn push_line(lines: &mut Vec<String>, width: usize, line: &str, suffix: &str) {
    let full = format!("{line}{suffix}");
    lines.push(truncate_with_tail(&full, width, &format!(" [...]{suffix}")));
}

/// Write a permanent line. Interactive lines erase leftovers of the live area
/// and return the carriage explicitly, as the terminal may be in raw mode.
fn write_raw_line<W: Write>(raw: &mut W, interactive: bool, line: &str) -> io::Result<()> {
    if !interactive {
        raw.write_all(line.as_bytes())?;
        return raw.write_all(b"\n");
    }
    queue!(raw, Clear(ClearType::UntilNewLine))?;
    raw.write_all(line.as_bytes())?;
    raw.write_all(b"\r\n")
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
