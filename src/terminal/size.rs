//! Terminal size queries.

/// Source of the current terminal dimensions in character cells.
pub trait TerminalSize: Send {
    /// `(width, height)`, or `None` when unknown.
    fn size(&self) -> Option<(u16, u16)>;
}

/// Queries the controlling terminal through crossterm.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrosstermSize;

impl TerminalSize for CrosstermSize {
    fn size(&self) -> Option<(u16, u16)> {
        match crossterm::terminal::size() {
            Ok((0, _) | (_, 0)) => None,
            Ok(size) => Some(size),
            Err(err) => {
                tracing::trace!(error = %err, "terminal size unavailable");
                None
            }
        }
    }
}

/// A fixed size, for tests and non-terminal outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedSize(pub Option<(u16, u16)>);

impl FixedSize {
    /// A known size.
    pub const fn new(width: u16, height: u16) -> Self {
        Self(Some((width, height)))
    }

    /// An unknown size.
    pub const fn unknown() -> Self {
        Self(None)
    }
}

impl TerminalSize for FixedSize {
    fn size(&self) -> Option<(u16, u16)> {
        self.0
    }
}
