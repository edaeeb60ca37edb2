//! Render budgeter: how deep the tree can be drawn within the terminal height.

use super::ActionTree;
use crate::action::{ActionRecord, ActionState};
use crate::state::ActionItem;

/// Depth the search starts from.
pub const DEFAULT_MAX_DEPTH: usize = 16;
/// Depth below which the tree is not worth drawing.
pub const MIN_DEPTH: usize = 2;
/// Lines taken by the summary banner block.
pub const BANNER_LINES: usize = 2;
/// Rows assumed available when the terminal height is unknown.
pub const DEFAULT_ROWS: usize = 20;

/// Which actions get a line of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPolicy {
    /// Actions above this level are not drawn.
    pub max_level: u32,
    /// Whether waiting actions are drawn.
    pub display_waiting: bool,
}

impl RenderPolicy {
    /// Whether `record` is walked through without consuming a line.
    pub const fn skip(&self, record: &ActionRecord) -> bool {
        record.level > self.max_level
            || record.indefinite
            || (!self.display_waiting && matches!(record.state, ActionState::Waiting))
    }
}

/// Outcome of budgeting a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Budget {
    /// Levels to draw.
    pub max_depth: usize,
    /// Tree lines that will be drawn.
    pub lines: usize,
    /// False when even the minimum depth does not fit; the tree is then omitted.
    pub render_tree: bool,
}

/// Depth of the tree and the lines drawn within `max_depth` levels.
pub fn measure(
    tree: &ActionTree,
    items: &[ActionItem],
    policy: RenderPolicy,
    max_depth: usize,
) -> (usize, usize) {
    let mut depth = 0;
    let mut lines = 0;
    tree.walk(max_depth, |index, level, _| {
        depth = depth.max(level + 1);
        let drawn = !policy.skip(&items[index].record);
        if drawn {
            lines += 1;
        }
        drawn
    });
    (depth, lines)
}

/// Rows left for the tree below the banner.
pub fn available_rows(height: Option<u16>) -> usize {
    height.map_or(DEFAULT_ROWS, |h| usize::from(h).saturating_sub(BANNER_LINES))
}

/// Reduce the drawn depth until the tree fits in the terminal.
///
/// Deep subtrees collapse first. Depth never drops below [`MIN_DEPTH`]; if the
/// tree still does not fit at that depth, it is not drawn at all.
pub fn budget(
    tree: &ActionTree,
    items: &[ActionItem],
    policy: RenderPolicy,
    height: Option<u16>,
) -> Budget {
    let available = available_rows(height);
    let (mut max_depth, mut lines) = measure(tree, items, policy, DEFAULT_MAX_DEPTH);

    while lines > available && max_depth > MIN_DEPTH {
        max_depth -= 1;
        lines = measure(tree, items, policy, max_depth).1;
    }

    if lines > available {
        return Budget::default();
    }

    Budget {
        max_depth,
        lines,
        render_tree: true,
    }
}
