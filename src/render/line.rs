//! Rendering of a single action line.

use crate::action::{ActionState, ErrorKind};
use crate::config::DisplayFlags;
use crate::state::ActionItem;
use chrono::Local;
use crossterm::style::Stylize;
use std::fmt::Write;
use std::time::Duration;

/// Scope entries listed before "and N more".
const MAX_SCOPE: usize = 3;

/// `1.2s` style duration.
pub fn format_seconds(duration: Duration) -> String {
    format!("{:.1}s", duration.as_secs_f64())
}

/// Render `item` without indentation or status suffix.
///
/// The result never contains a newline: every frame line must occupy exactly
/// one terminal row.
pub fn render_line(item: &ActionItem, flags: DisplayFlags) -> String {
    let record = &item.record;
    let mut out = String::new();

    if record.state.is_done() {
        if let Some(completed) = record.completed {
            let stamp = completed.with_timezone(&Local).format("%H:%M:%S%.3f").to_string();
            let _ = write!(out, "{} ", stamp.dark_grey());
        }
        if flags.contains(DisplayFlags::OUTPUT_ACTION_ID) {
            let _ = write!(out, "{}", format!("[{}] ", record.id.short()).dark_grey());
        }
    }

    if let Some(category) = record.category.as_deref().filter(|c| !c.is_empty()) {
        let _ = write!(out, "{}", format!("({category}) ").blue());
    }

    let name = record.display_name();
    if item.cached {
        let _ = write!(out, "{}", name.dark_grey());
    } else {
        out.push_str(name);
    }

    if record.state == ActionState::Running {
        if let Some(progress) = &item.progress {
            let progress = progress.format_progress();
            if !progress.is_empty() {
                let _ = write!(out, " {}", progress.dark_grey());
            }
        }
    }

    let has_label = record.human_readable.as_deref().is_some_and(|l| !l.is_empty());
    if !has_label && !item.scope.is_empty() {
        let mut scope = item.scope[..item.scope.len().min(MAX_SCOPE)].join(" ");
        if item.scope.len() > MAX_SCOPE {
            let _ = write!(scope, " and {} more", item.scope.len() - MAX_SCOPE);
        }
        let _ = write!(out, " {}", format!("[{scope}]").dark_magenta());
    }

    for atom in &item.atoms {
        let key = format!("{}=", atom.key);
        let key = if atom.result {
            key.dark_blue()
        } else {
            key.dark_cyan()
        };
        let _ = write!(out, " {key}{}", atom.value);
    }

    if let Some(error) = &record.error {
        match error.kind {
            ErrorKind::Cancelled | ErrorKind::DependencyFailed => {
                let _ = write!(out, " {}", error.kind.label().dark_blue());
            }
            ErrorKind::Regular => {
                let _ = write!(out, " {}{}", "err=".dark_red(), error.message.as_str().dark_red());
            }
        }
    }

    if out.contains(['\n', '\r']) {
        out = out.replace(['\n', '\r'], " ");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionError, ActionRecord, ActionUpdate, Arg, Progress};
    use crate::render::truncate::display_width;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn item(record: ActionRecord) -> ActionItem {
        ActionItem::new(ActionUpdate {
            record,
            ..ActionUpdate::default()
        })
    }

    fn plain(s: &str) -> String {
        let mut out = String::new();
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                for c in chars.by_ref() {
                    if c.is_ascii_alphabetic() {
                        break;
                    }
                }
                continue;
            }
            out.push(c);
        }
        assert_eq!(display_width(s), display_width(&out));
        out
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(Duration::from_millis(1234)), "1.2s");
        assert_eq!(format_seconds(Duration::ZERO), "0.0s");
    }

    #[test]
    fn test_basic_line() {
        let record = ActionRecord::new("a", "docker.build")
            .with_category("build")
            .with_arg(Arg::new("image", "web"));
        let line = plain(&render_line(&item(record), DisplayFlags::empty()));
        assert_eq!(line, "(build) docker.build image=\"web\"");
    }

    #[test]
    fn test_scope_summary() {
        let record = ActionRecord::new("a", "provision").with_scope(["a", "b", "c", "d", "e"]);
        let line = plain(&render_line(&item(record), DisplayFlags::empty()));
        assert_eq!(line, "provision [a b c and 2 more]");

        let record = ActionRecord::new("a", "provision")
            .with_human_readable("Provisioning")
            .with_scope(["a"]);
        let line = plain(&render_line(&item(record), DisplayFlags::empty()));
        assert_eq!(line, "Provisioning");
    }

    #[test]
    fn test_progress_only_while_running() {
        let progress: Progress = Arc::new(|| "3/7 layers".to_string());
        let mut running = item(ActionRecord::new("a", "pull").start());
        running.progress = Some(progress);
        let line = plain(&render_line(&running, DisplayFlags::empty()));
        assert_eq!(line, "pull 3/7 layers");

        let mut waiting = running.clone();
        waiting.record.state = ActionState::Waiting;
        assert_eq!(plain(&render_line(&waiting, DisplayFlags::empty())), "pull");
    }

    #[test]
    fn test_error_suffix_by_kind() {
        let failed = item(
            ActionRecord::new("a", "deploy").complete(Some(ActionError::regular("boom"))),
        );
        assert!(plain(&render_line(&failed, DisplayFlags::empty())).ends_with("deploy err=boom"));

        let cancelled = item(ActionRecord::new("a", "deploy").complete(Some(ActionError::cancelled())));
        assert!(plain(&render_line(&cancelled, DisplayFlags::empty())).ends_with("deploy cancelled"));

        let dep = item(
            ActionRecord::new("a", "deploy").complete(Some(ActionError::dependency_failed("x"))),
        );
        assert!(plain(&render_line(&dep, DisplayFlags::empty())).ends_with("deploy dependency failed"));
    }

    #[test]
    fn test_done_line_has_id_when_requested() {
        let done = item(ActionRecord::new("0123456789", "deploy").complete(None));
        let line = plain(&render_line(&done, DisplayFlags::OUTPUT_ACTION_ID));
        assert!(line.contains("[01234567] deploy"), "{line}");
    }

    #[test]
    fn test_completion_stamp_in_local_time() {
        let completed = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 58).single().unwrap();
        let mut done = item(ActionRecord::new("a", "deploy").complete(None));
        done.record.completed = Some(completed);

        let expected = completed.with_timezone(&Local).format("%H:%M:%S%.3f").to_string();
        let line = plain(&render_line(&done, DisplayFlags::empty()));
        assert_eq!(line, format!("{expected} deploy"));
    }

    #[test]
    fn test_newlines_are_flattened() {
        let record = ActionRecord::new("a", "multi\nline");
        assert!(!render_line(&item(record), DisplayFlags::empty()).contains('\n'));
    }
}
