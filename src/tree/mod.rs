//! Display tree and the budget that fits it into the terminal.

mod budget;
mod builder;

pub use budget::{
    available_rows, budget, measure, Budget, RenderPolicy, BANNER_LINES, DEFAULT_MAX_DEPTH,
    DEFAULT_ROWS, MIN_DEPTH,
};
pub use builder::{ActionTree, Node};
