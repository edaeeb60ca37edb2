//! Console configuration.

use bitflags::bitflags;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

bitflags! {
    /// Optional pieces of the action display.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DisplayFlags: u8 {
        /// Prefix each tree line with the short action ID.
        const OUTPUT_ACTION_ID = 0b0000_0001;
        /// Show waiting actions (and anchored completions) instead of skipping them.
        const DISPLAY_WAITING = 0b0000_0010;
        /// Log every completed action as a permanent line above the live area.
        const LOG_ACTIONS = 0b0000_0100;
    }
}

/// Ordering and suppression rules for sticky blocks.
#[derive(Debug, Clone, Default)]
pub struct StickyPolicy {
    /// Lower values render first. Unlisted names render last, in insertion order.
    pub priorities: HashMap<String, i32>,
    /// Names kept when not every block fits.
    pub required: Vec<String>,
}

impl StickyPolicy {
    /// Assign a priority to a block name.
    #[must_use]
    pub fn with_priority(mut self, name: impl Into<String>, priority: i32) -> Self {
        self.priorities.insert(name.into(), priority);
        self
    }

    /// Mark a block as required.
    #[must_use]
    pub fn with_required(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    pub(crate) fn priority(&self, name: &str) -> i32 {
        self.priorities.get(name).copied().unwrap_or(i32::MAX)
    }

    pub(crate) fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|required| required == name)
    }
}

/// Configuration for the console engine.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Target frames per second.
    pub fps: u32,
    /// Slow frame rate and append frames instead of redrawing in place.
    pub debug_console: bool,
    /// When false, only log output and logged actions are emitted.
    pub interactive: bool,
    /// Only actions at this level or below are displayed.
    pub max_level: u32,
    /// Optional display pieces.
    pub flags: DisplayFlags,
    /// Sticky block ordering.
    pub sticky: StickyPolicy,
    /// Append a JSON snapshot of every frame to this file.
    pub debug_output: Option<PathBuf>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            debug_console: false,
            interactive: true,
            max_level: 0,
            flags: DisplayFlags::empty(),
            sticky: StickyPolicy::default(),
            debug_output: None,
        }
    }
}

impl ConsoleConfig {
    /// Defaults overlaid with `TASKLOG_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = |key: &str| {
            lookup(key).is_some_and(|value| matches!(value.as_str(), "1" | "true" | "yes"))
        };

        if enabled("TASKLOG_DEBUG_CONSOLE") {
            self.debug_console = true;
        }
        for (key, flag) in [
            ("TASKLOG_OUTPUT_ACTION_ID", DisplayFlags::OUTPUT_ACTION_ID),
            ("TASKLOG_DISPLAY_WAITING", DisplayFlags::DISPLAY_WAITING),
            ("TASKLOG_LOG_ACTIONS", DisplayFlags::LOG_ACTIONS),
        ] {
            if enabled(key) {
                self.flags |= flag;
            }
        }
        if let Some(level) = lookup("TASKLOG_MAX_LEVEL").and_then(|v| v.parse().ok()) {
            self.max_level = level;
        }
        if let Some(path) = lookup("TASKLOG_DEBUG_OUTPUT").filter(|v| !v.is_empty()) {
            self.debug_output = Some(PathBuf::from(path));
        }
        self
    }

    /// Set the frame rate.
    #[must_use]
    pub const fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Set the maximum displayed level.
    #[must_use]
    pub const fn with_max_level(mut self, max_level: u32) -> Self {
        self.max_level = max_level;
        self
    }

    /// Set display flags.
    #[must_use]
    pub const fn with_flags(mut self, flags: DisplayFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Toggle interactive rendering.
    #[must_use]
    pub const fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Set the sticky policy.
    #[must_use]
    pub fn with_sticky(mut self, sticky: StickyPolicy) -> Self {
        self.sticky = sticky;
        self
    }

    /// Write frame snapshots to `path`.
    #[must_use]
    pub fn with_debug_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_output = Some(path.into());
        self
    }

    /// Time between frames.
    pub fn frame_interval(&self) -> Duration {
        if self.debug_console {
            return Duration::from_millis(300);
        }
        Duration::from_millis(1000 / u64::from(self.fps.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_interval() {
        assert_eq!(ConsoleConfig::default().frame_interval(), Duration::from_millis(16));

        let config = ConsoleConfig {
            debug_console: true,
            ..ConsoleConfig::default()
        };
        assert_eq!(config.frame_interval(), Duration::from_millis(300));

        assert_eq!(
            ConsoleConfig::default().with_fps(0).frame_interval(),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn test_env_overlay() {
        let env: HashMap<&str, &str> = [
            ("TASKLOG_LOG_ACTIONS", "1"),
            ("TASKLOG_DISPLAY_WAITING", "no"),
            ("TASKLOG_MAX_LEVEL", "2"),
            ("TASKLOG_DEBUG_OUTPUT", "/tmp/console.json"),
        ]
        .into_iter()
        .collect();

        let config = ConsoleConfig::default().overlay(|key| env.get(key).map(ToString::to_string));

        assert!(config.flags.contains(DisplayFlags::LOG_ACTIONS));
        assert!(!config.flags.contains(DisplayFlags::DISPLAY_WAITING));
        assert_eq!(config.max_level, 2);
        assert_eq!(config.debug_output, Some(PathBuf::from("/tmp/console.json")));
        assert!(!config.debug_console);
    }

    #[test]
    fn test_sticky_policy() {
        let policy = StickyPolicy::default()
            .with_priority("stack", 1)
            .with_required("commands");

        assert_eq!(policy.priority("stack"), 1);
        assert_eq!(policy.priority("other"), i32::MAX);
        assert!(policy.is_required("commands"));
        assert!(!policy.is_required("stack"));
    }
}
