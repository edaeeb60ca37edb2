//! Display tree: parent/child structure with anchor substitution.
//!
//! The tree is never patched. Every structural change rebuilds it from the
//! flat list of tracked actions, which keeps it trivially consistent with
//! that list.

use crate::action::ActionId;
use crate::state::ActionItem;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// One action's position in the display tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    /// Index of the action in the item list the tree was built from.
    pub item: usize,
    /// Children in display order.
    pub children: Vec<ActionId>,
    /// Another waiter already displays the anchor this node waits on.
    pub hidden: bool,
    /// The anchor displayed in place of this node.
    pub replacement: Option<ActionId>,
}

/// Tree of displayable actions, rooted at a synthetic root.
#[derive(Debug, Clone, Default)]
pub struct ActionTree {
    root: Vec<ActionId>,
    nodes: HashMap<ActionId, Node>,
}

impl ActionTree {
    /// Build the tree for `items`.
    ///
    /// Unknown or self-referencing parents attach to the root. Of all the
    /// actions anchored to the same target, only the first (in item order)
    /// substitutes the target; the others are hidden. A claimed anchor is
    /// detached from its structural parent so it is displayed only once.
    pub fn build(items: &[ActionItem]) -> Self {
        let mut tree = Self {
            root: Vec::new(),
            nodes: items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    (
                        item.record.id.clone(),
                        Node {
                            item: index,
                            ..Node::default()
                        },
                    )
                })
                .collect(),
        };

        let mut claimed: Vec<ActionId> = Vec::new();
        for item in items {
            let id = &item.record.id;
            let parent = tree.parent_key(id, item.record.parent());
            tree.children_mut(parent.as_ref()).push(id.clone());

            let Some(anchor) = item.record.anchor() else {
                continue;
            };
            if anchor == id || !tree.nodes.contains_key(anchor) {
                continue;
            }

            let first = !claimed.contains(anchor);
            if let Some(node) = tree.nodes.get_mut(id) {
                if first {
                    node.replacement = Some(anchor.clone());
                } else {
                    node.hidden = true;
                }
            }
            if first {
                claimed.push(anchor.clone());
            }
        }

        for anchor in &claimed {
            let Some(node) = tree.nodes.get(anchor) else {
                continue;
            };
            let parent = tree.parent_key(anchor, items[node.item].record.parent());
            tree.children_mut(parent.as_ref()).retain(|child| child != anchor);
        }

        tree.sort(items);
        tree
    }

    /// Resolve the structural parent of `id`, `None` meaning the root.
    fn parent_key(&self, id: &ActionId, parent: Option<&ActionId>) -> Option<ActionId> {
        parent
            .filter(|parent| *parent != id && self.nodes.contains_key(*parent))
            .cloned()
    }

    fn children_mut(&mut self, parent: Option<&ActionId>) -> &mut Vec<ActionId> {
        match parent.and_then(|id| self.nodes.get_mut(id)) {
            Some(node) => &mut node.children,
            None => &mut self.root,
        }
    }

    /// Order every child list by effective start time, following anchors.
    fn sort(&mut self, items: &[ActionItem]) {
        let times: HashMap<ActionId, DateTime<Utc>> = self
            .nodes
            .keys()
            .map(|id| {
                let shown = self.follow(id);
                let time = self
                    .nodes
                    .get(shown)
                    .map_or_else(DateTime::default, |node| items[node.item].record.sort_time());
                (id.clone(), time)
            })
            .collect();

        let key = |id: &ActionId| times.get(id).copied().unwrap_or_default();
        self.root.sort_by_key(key);
        for node in self.nodes.values_mut() {
            node.children.sort_by_key(key);
        }
    }

    /// Top-level actions in display order.
    pub fn root(&self) -> &[ActionId] {
        &self.root
    }

    /// Look up a node.
    pub fn node(&self, id: &ActionId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// The node displayed in place of `id`: its anchor if it claimed one, else itself.
    pub fn follow<'a>(&'a self, id: &'a ActionId) -> &'a ActionId {
        self.nodes
            .get(id)
            .and_then(|node| node.replacement.as_ref())
            .unwrap_or(id)
    }

    /// Number of nodes, hidden ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Visit the displayable nodes depth-first, down to `max_depth` levels.
    ///
    /// Children are followed through their anchors, hidden nodes are skipped
    /// together with their subtrees, and every node is visited at most once so
    /// that parent/anchor cycles terminate. `visit` receives the node's item
    /// index and depth, and returns whether it consumed a line; the returned
    /// value is threaded into the children's `indent` argument.
    pub fn walk<F>(&self, max_depth: usize, mut visit: F)
    where
        F: FnMut(usize, usize, usize) -> bool,
    {
        let mut visited = HashSet::new();
        self.walk_rec(&self.root, 0, 0, max_depth, &mut visited, &mut visit);
    }

    fn walk_rec<'a, F>(
        &'a self,
        children: &'a [ActionId],
        depth: usize,
        indent: usize,
        max_depth: usize,
        visited: &mut HashSet<&'a ActionId>,
        visit: &mut F,
    ) where
        F: FnMut(usize, usize, usize) -> bool,
    {
        if depth >= max_depth {
            return;
        }
        for id in children {
            let shown = self.follow(id);
            let Some(node) = self.nodes.get(shown) else {
                continue;
            };
            if node.hidden || !visited.insert(shown) {
                continue;
            }
            let drawn = visit(node.item, depth, indent);
            let indent = if drawn { indent + 1 } else { indent };
            self.walk_rec(&node.children, depth + 1, indent, max_depth, visited, visit);
        }
    }
}
