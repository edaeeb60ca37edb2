//! Idle bookkeeping: when the console last became busy, and what to say when it is not.

use super::ActionItem;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Tracks the start of the current busy period.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleTracker {
    active: bool,
    since: DateTime<Utc>,
}

impl IdleTracker {
    /// Re-evaluate after the item list changed.
    ///
    /// An idle to active transition restarts the elapsed-time origin at `now`.
    /// Indefinite actions never make the console active.
    pub fn update(&mut self, items: &[ActionItem], now: DateTime<Utc>) {
        let active = items
            .iter()
            .any(|item| !item.record.indefinite && item.record.state.is_running());
        if active && !self.active {
            self.since = now;
        }
        self.active = active;
    }

    /// Whether any countable action is waiting or running.
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Time since the console became active.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        (now - self.since).to_std().unwrap_or_default()
    }
}

/// Stack of idle labels. The top one is displayed.
#[derive(Debug, Clone, Default)]
pub struct IdleLabels {
    stack: Vec<(u64, String)>,
}

impl IdleLabels {
    /// Push `label`, identified by `token`.
    pub fn push(&mut self, token: u64, label: String) {
        self.stack.push((token, label));
    }

    /// Remove the label pushed with `token`, wherever it is in the stack.
    pub fn pop(&mut self, token: u64) {
        if let Some(index) = self.stack.iter().rposition(|(t, _)| *t == token) {
            self.stack.remove(index);
        }
    }

    /// Label to display, if any.
    pub fn current(&self) -> Option<&str> {
        self.stack
            .last()
            .map(|(_, label)| label.as_str())
            .filter(|label| !label.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionRecord, ActionUpdate};

    fn item(record: ActionRecord) -> ActionItem {
        ActionItem::new(ActionUpdate {
            record,
            ..ActionUpdate::default()
        })
    }

    #[test]
    fn test_idle_transition_resets_origin() {
        let t0 = DateTime::<Utc>::default();
        let t1 = t0 + chrono::Duration::seconds(5);
        let mut tracker = IdleTracker::default();

        tracker.update(&[item(ActionRecord::new("a", "a").start())], t1);
        assert!(tracker.is_active());
        assert_eq!(tracker.elapsed(t1 + chrono::Duration::seconds(2)), Duration::from_secs(2));

        // Staying active keeps the origin.
        tracker.update(&[item(ActionRecord::new("b", "b"))], t1 + chrono::Duration::seconds(1));
        assert_eq!(tracker.elapsed(t1 + chrono::Duration::seconds(2)), Duration::from_secs(2));

        tracker.update(&[], t1);
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_indefinite_is_idle() {
        let mut tracker = IdleTracker::default();
        tracker.update(&[item(ActionRecord::new("w", "watch").indefinite().start())], Utc::now());
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_labels_nest_and_pop_out_of_order() {
        let mut labels = IdleLabels::default();
        assert_eq!(labels.current(), None);

        labels.push(1, "waiting for changes".into());
        labels.push(2, "press enter".into());
        assert_eq!(labels.current(), Some("press enter"));

        labels.pop(1);
        assert_eq!(labels.current(), Some("press enter"));
        labels.pop(2);
        assert_eq!(labels.current(), None);

        labels.pop(3);
    }
}
