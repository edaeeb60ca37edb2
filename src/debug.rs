//! Frame snapshots for debugging the console itself.
//!
//! When enabled, every frame appends a pretty-printed JSON document
//! describing what the console knew at that point.

use crate::action::{ActionId, ActionState};
use crate::error::StartupError;
use crate::state::ActionItem;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// One tracked action, as seen by a frame.
#[derive(Debug, Clone, Serialize)]
pub struct DebugAction {
    /// Action ID.
    pub id: ActionId,
    /// Machine name.
    pub name: String,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Lifecycle state.
    pub state: ActionState,
    /// Completion time, for done actions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<DateTime<Utc>>,
}

impl From<&ActionItem> for DebugAction {
    fn from(item: &ActionItem) -> Self {
        let record = &item.record;
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            created: record.created,
            state: record.state,
            completed: record.completed.filter(|_| record.state.is_done()),
        }
    }
}

/// Snapshot of one frame.
#[derive(Debug, Clone, Serialize)]
pub struct DebugFrame {
    /// Terminal width, 0 when unknown.
    pub width: u16,
    /// Terminal height, 0 when unknown.
    pub height: u16,
    /// Whether this was a flush frame.
    pub flush: bool,
    /// Tracked actions, before completed ones are pruned.
    pub running: Vec<DebugAction>,
    /// Output blocks flushed by this frame.
    pub buffer_count: usize,
}

/// Destination of frame snapshots.
pub struct DebugLog {
    out: BufWriter<File>,
}

impl DebugLog {
    /// Create (or truncate) the snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::DebugOutput`] if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self, StartupError> {
        let file = File::create(path).map_err(|source| StartupError::DebugOutput {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "writing console debug snapshots");
        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    /// Append one snapshot.
    pub fn record(&mut self, frame: &DebugFrame) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, frame)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

impl std::fmt::Debug for DebugLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugLog").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionRecord, ActionUpdate};

    #[test]
    fn test_snapshots_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.json");
        let mut log = DebugLog::create(&path).unwrap();

        let item = ActionItem::new(ActionUpdate {
            record: ActionRecord::new("a1", "build").complete(None),
            ..ActionUpdate::default()
        });
        let frame = DebugFrame {
            width: 80,
            height: 24,
            flush: false,
            running: vec![DebugAction::from(&item)],
            buffer_count: 2,
        };
        log.record(&frame).unwrap();
        log.record(&DebugFrame { flush: true, running: Vec::new(), ..frame }).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let docs: Vec<serde_json::Value> = serde_json::Deserializer::from_str(&text)
            .into_iter()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["running"][0]["id"], "a1");
        assert_eq!(docs[0]["running"][0]["state"], "done");
        assert_eq!(docs[0]["buffer_count"], 2);
        assert_eq!(docs[1]["flush"], true);
    }

    #[test]
    fn test_create_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = DebugLog::create(&dir.path().join("missing/frames.json")).unwrap_err();
        assert!(matches!(err, StartupError::DebugOutput { .. }));
    }
}
