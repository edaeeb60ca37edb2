//! Engine-side view of one action: the latest record plus precomputed presentation.

use crate::action::{ActionRecord, ActionUpdate, Progress, ResultData};
use std::fmt;

/// A pre-rendered `key=value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    /// Key.
    pub key: String,
    /// Serialized value.
    pub value: String,
    /// Whether this came from the results rather than the arguments.
    pub result: bool,
}

/// An action as tracked by the console.
#[derive(Clone)]
pub struct ActionItem {
    /// Latest record.
    pub record: ActionRecord,
    /// Latest results.
    pub results: ResultData,
    /// Latest progress.
    pub progress: Option<Progress>,
    /// Package names the action pertains to.
    pub scope: Vec<String>,
    /// Arguments and results, serialized once per update.
    pub atoms: Vec<Atom>,
    /// Whether the action was served from cache.
    pub cached: bool,
}

impl ActionItem {
    /// Track a new action.
    pub fn new(update: ActionUpdate) -> Self {
        let mut item = Self {
            record: update.record,
            results: update.results,
            progress: update.progress,
            scope: Vec::new(),
            atoms: Vec::new(),
            cached: false,
        };
        item.precompute();
        item
    }

    /// Overwrite data, results and progress with a newer snapshot.
    pub fn update(&mut self, update: ActionUpdate) {
        self.record = update.record;
        self.results = update.results;
        self.progress = update.progress;
        self.precompute();
    }

    /// Replace results without touching the record; progress only when provided.
    pub fn attach(&mut self, results: ResultData) {
        if let Some(progress) = &results.progress {
            self.progress = Some(progress.clone());
        }
        self.results = results;
        self.precompute();
    }

    fn precompute(&mut self) {
        let record = &self.record;
        let mut atoms = Vec::with_capacity(record.arguments.len() + self.results.items.len() + 1);

        if let Some(anchor) = record.anchor() {
            atoms.push(Atom {
                key: "anchor".to_string(),
                value: anchor.to_string(),
                result: false,
            });
        }

        self.cached = false;
        for arg in &record.arguments {
            let value = arg.render_value();
            if arg.name == "cached" {
                self.cached |= value == "true";
                continue;
            }
            if !value.is_empty() {
                atoms.push(Atom {
                    key: arg.name.clone(),
                    value,
                    result: false,
                });
            }
        }

        for result in &self.results.items {
            let value = result.render_value();
            if !value.is_empty() {
                atoms.push(Atom {
                    key: result.name.clone(),
                    value,
                    result: true,
                });
            }
        }

        self.scope.clone_from(&record.scope);
        self.atoms = atoms;
    }
}

impl fmt::Debug for ActionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionItem")
            .field("record", &self.record)
            .field("atoms", &self.atoms)
            .field("cached", &self.cached)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Arg;

    fn update(record: ActionRecord) -> ActionUpdate {
        ActionUpdate {
            record,
            ..ActionUpdate::default()
        }
    }

    #[test]
    fn test_atoms_order() {
        let record = ActionRecord::new("a", "deploy")
            .with_anchor("b")
            .with_arg(Arg::new("image", "nginx"))
            .with_arg(Arg::new("replicas", 3));
        let mut item = ActionItem::new(update(record));
        item.attach(ResultData::default().with(Arg::new("digest", "sha256:1")));

        let keys: Vec<_> = item.atoms.iter().map(|a| (a.key.as_str(), a.result)).collect();
        assert_eq!(
            keys,
            vec![("anchor", false), ("image", false), ("replicas", false), ("digest", true)]
        );
    }

    #[test]
    fn test_cached_argument() {
        let record = ActionRecord::new("a", "build").with_arg(Arg::new("cached", true));
        let item = ActionItem::new(update(record));
        assert!(item.cached);
        assert!(item.atoms.is_empty());

        let record = ActionRecord::new("a", "build").with_arg(Arg::new("cached", false));
        assert!(!ActionItem::new(update(record)).cached);
    }

    #[test]
    fn test_attach_keeps_progress_when_absent() {
        let progress: Progress = std::sync::Arc::new(|| "1/2".to_string());
        let mut item = ActionItem::new(ActionUpdate {
            record: ActionRecord::new("a", "pull"),
            results: ResultData::default(),
            progress: Some(progress),
        });

        item.attach(ResultData::default());
        assert!(item.progress.is_some());
    }
}
