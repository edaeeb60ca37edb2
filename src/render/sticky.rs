//! Sticky content: named multi-line blocks kept above the action tree.

use crate::config::StickyPolicy;

/// One named block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StickyBlock {
    /// Block name, unique among blocks.
    pub name: String,
    /// Content lines.
    pub lines: Vec<String>,
}

/// Ordered set of sticky blocks.
#[derive(Debug, Clone, Default)]
pub struct StickyBlocks {
    blocks: Vec<StickyBlock>,
}

impl StickyBlocks {
    /// Insert, replace, or (with empty content) remove the block called `name`.
    pub fn set(&mut self, name: &str, content: &str, policy: &StickyPolicy) {
        if let Some(index) = self.blocks.iter().position(|b| b.name == name) {
            if content.is_empty() {
                self.blocks.remove(index);
            } else {
                self.blocks[index].lines = split_lines(content);
            }
            return;
        }

        if content.is_empty() {
            return;
        }

        self.blocks.push(StickyBlock {
            name: name.to_string(),
            lines: split_lines(content),
        });
        self.blocks.sort_by_key(|b| policy.priority(&b.name));
    }

    /// Blocks in display order.
    pub fn blocks(&self) -> &[StickyBlock] {
        &self.blocks
    }

    /// Whether no block is set.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Choose the blocks that fit in `available` rows.
    ///
    /// Returns the blocks to draw and the names of the suppressed ones: all
    /// blocks when they fit, otherwise only the required ones, otherwise none.
    pub fn fit(&self, available: i64, policy: &StickyPolicy) -> (Vec<&StickyBlock>, Vec<String>) {
        let all: Vec<&StickyBlock> = self.blocks.iter().collect();
        if measure(&all) <= available {
            return (all, Vec::new());
        }

        let (required, suppressed): (Vec<&StickyBlock>, Vec<&StickyBlock>) =
            all.iter().copied().partition(|b| policy.is_required(&b.name));
        if measure(&required) <= available {
            return (required, suppressed.iter().map(|b| b.name.clone()).collect());
        }

        (Vec::new(), all.iter().map(|b| b.name.clone()).collect())
    }
}

fn split_lines(content: &str) -> Vec<String> {
    content.split('\n').map(|l| l.trim_end_matches('\r').to_string()).collect()
}

/// Rows needed to draw `blocks`: a margin line above and below plus one separator between blocks.
fn measure(blocks: &[&StickyBlock]) -> i64 {
    let lines: usize = blocks.iter().map(|b| b.lines.len()).sum();
    let separators = blocks.len().saturating_sub(1);
    i64::try_from(2 + separators + lines).unwrap_or(i64::MAX)
}
