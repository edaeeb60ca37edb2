//! Actor Model: Message-passing concurrency for the console.
//!
//! - **Producers** hold [`Console`] handles and send [`ConsoleEvent`]s
//! - **Worker**: the only thread touching console state; applies events, draws frames
//! - **Ticker**: paces frames
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ConsoleEvent     ┌──────────────┐    bytes    ┌──────────┐
//! │  Producers   │ ──────────────────▶ │    Worker    │ ──────────▶ │ Terminal │
//! └──────────────┘   (unbounded)       │              │             └──────────┘
//!                                      │              │
//! ┌──────────────┐        Tick         │              │
//! │ Ticker Thread│ ──────────────────▶ │              │
//! └──────────────┘                     └──────────────┘
//! ```

mod engine;
mod input;
mod messages;
mod ticker;
mod worker;

pub use engine::{Console, ConsoleSink, IdleLabelGuard};
pub use input::{InputCoordinator, InputModeGuard};
pub use messages::{ConsoleEvent, ConsoleOutput, OutputCategory};
pub use ticker::{Tick, TickerActor};
