//! Action records: one tracked unit of work and its lifecycle.

use super::value::{Arg, ResultData};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Stable, globally unique identifier of an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    /// Create an identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty (i.e. "no action").
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first 8 characters, used when action IDs are displayed inline.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ActionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Lifecycle state of an action. Ordered: transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionState {
    /// Created, waiting on something before it can run.
    #[default]
    Waiting,
    /// Currently executing.
    Running,
    /// Completed (successfully or not). Terminal.
    Done,
}

impl ActionState {
    /// Waiting or running.
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Waiting | Self::Running)
    }

    /// Completed.
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Classification of an action failure, used to pick its styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorKind {
    /// A genuine failure of the action itself.
    #[default]
    Regular,
    /// The action was cancelled.
    Cancelled,
    /// One of the action's dependencies failed.
    DependencyFailed,
}

impl ErrorKind {
    /// Short label rendered in place of the message for non-regular errors.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Regular => "error",
            Self::Cancelled => "cancelled",
            Self::DependencyFailed => "dependency failed",
        }
    }
}

/// Terminal error attached to a completed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionError {
    /// Failure classification.
    pub kind: ErrorKind,
    /// Human readable message.
    pub message: String,
}

impl ActionError {
    /// A regular failure.
    pub fn regular(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Regular,
            message: message.into(),
        }
    }

    /// A cancellation.
    pub fn cancelled() -> Self {
        Self {
            kind: ErrorKind::Cancelled,
            message: "context cancelled".to_string(),
        }
    }

    /// A failure caused by a dependency.
    pub fn dependency_failed(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::DependencyFailed,
            message: message.into(),
        }
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Live progress of a running action.
///
/// Implementations are shared with the producer, which keeps updating them;
/// the renderer only ever calls [`format_progress`](Self::format_progress).
pub trait ActionProgress: Send + Sync {
    /// A short progress string, e.g. `"12/40 layers"`. Empty means "nothing to show".
    fn format_progress(&self) -> String;
}

impl<F> ActionProgress for F
where
    F: Fn() -> String + Send + Sync,
{
    fn format_progress(&self) -> String {
        self()
    }
}

/// Shared progress handle.
pub type Progress = Arc<dyn ActionProgress>;

/// Everything known about one action at the time an event was emitted.
#[derive(Debug, Clone, Default)]
pub struct ActionRecord {
    /// Unique ID.
    pub id: ActionId,
    /// Structural parent in the call tree.
    pub parent_id: Option<ActionId>,
    /// The action this one is waiting on.
    pub anchor_id: Option<ActionId>,
    /// Lifecycle state.
    pub state: ActionState,
    /// Excluded from running/waiting counts (e.g. long-lived watchers).
    pub indefinite: bool,
    /// When the action was created.
    pub created: DateTime<Utc>,
    /// When the action started running.
    pub started: Option<DateTime<Utc>>,
    /// When the action completed.
    pub completed: Option<DateTime<Utc>>,
    /// Machine name, e.g. `"docker.build"`.
    pub name: String,
    /// Display name; falls back to `name`.
    pub human_readable: Option<String>,
    /// Category shown in parentheses.
    pub category: Option<String>,
    /// 0 is the most important; higher levels are filtered out.
    pub level: u32,
    /// Package or unit names this action pertains to.
    pub scope: Vec<String>,
    /// Arguments rendered as `key=value`.
    pub arguments: Vec<Arg>,
    /// Terminal error, if the action failed.
    pub error: Option<ActionError>,
}

impl ActionRecord {
    /// A new waiting action created now.
    pub fn new(id: impl Into<ActionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            created: Utc::now(),
            ..Self::default()
        }
    }

    /// Set the structural parent.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<ActionId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    /// Set the anchor (the action this one waits on).
    #[must_use]
    pub fn with_anchor(mut self, anchor: impl Into<ActionId>) -> Self {
        self.anchor_id = Some(anchor.into());
        self
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the human readable name.
    #[must_use]
    pub fn with_human_readable(mut self, label: impl Into<String>) -> Self {
        self.human_readable = Some(label.into());
        self
    }

    /// Set the display level.
    #[must_use]
    pub const fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Mark as indefinite.
    #[must_use]
    pub const fn indefinite(mut self) -> Self {
        self.indefinite = true;
        self
    }

    /// Set the scope.
    #[must_use]
    pub fn with_scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = scope.into_iter().map(Into::into).collect();
        self
    }

    /// Append an argument.
    #[must_use]
    pub fn with_arg(mut self, arg: Arg) -> Self {
        self.arguments.push(arg);
        self
    }

    /// Transition to running, stamping the start time.
    #[must_use]
    pub fn start(mut self) -> Self {
        self.state = ActionState::Running;
        self.started = Some(Utc::now());
        self
    }

    /// Transition to done, stamping the completion time.
    #[must_use]
    pub fn complete(mut self, error: Option<ActionError>) -> Self {
        let now = Utc::now();
        self.state = ActionState::Done;
        self.started.get_or_insert(now);
        self.completed = Some(now);
        self.error = error;
        self
    }

    /// Name shown to users.
    pub fn display_name(&self) -> &str {
        match self.human_readable.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => &self.name,
        }
    }

    /// Start time used for ordering siblings.
    pub fn sort_time(&self) -> DateTime<Utc> {
        self.started.unwrap_or(self.created)
    }

    pub(crate) fn parent(&self) -> Option<&ActionId> {
        self.parent_id.as_ref().filter(|id| !id.is_empty())
    }

    pub(crate) fn anchor(&self) -> Option<&ActionId> {
        self.anchor_id.as_ref().filter(|id| !id.is_empty())
    }
}

/// Record plus attachments, as carried by a lifecycle message.
#[derive(Clone, Default)]
pub struct ActionUpdate {
    /// The record snapshot.
    pub record: ActionRecord,
    /// Results attached so far.
    pub results: ResultData,
    /// Live progress, if any.
    pub progress: Option<Progress>,
}

impl fmt::Debug for ActionUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionUpdate")
            .field("record", &self.record)
            .field("results", &self.results)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}
