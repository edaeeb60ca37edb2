//! Screen: differential repaint of the live area.
//!
//! The live area is the block of lines at the bottom of the output that is
//! redrawn in place every frame. The screen remembers the lines it drew last
//! and on the next frame:
//! 1. Skips the frame entirely if nothing changed and nothing else was written
//! 2. Otherwise moves the cursor back to the top of the live area
//! 3. Rewrites only the rows that differ, stepping over the others
//! 4. Erases whatever is left below
//!
//! Permanent output (log lines, completed actions) goes through a
//! [`RawWriter`], which first clears the live area so that the permanent lines
//! take its place and the live area is redrawn below them.
//!
//! All bytes are accumulated in one buffer and written with a single call.

use crossterm::{cursor, queue, terminal};
use std::io::{self, Write};

/// Render statistics for debugging/profiling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames that produced output.
    pub frames: u64,
    /// Frames skipped because nothing changed.
    pub skipped: u64,
    /// Rows rewritten across all frames.
    pub lines_written: u64,
    /// Bytes produced across all frames.
    pub bytes_written: u64,
}

/// Differential renderer for the live area.
#[derive(Debug, Default)]
pub struct Screen {
    /// Lines drawn by the previous frame.
    previous: Vec<String>,
    /// Pre-allocated output buffer.
    output: Vec<u8>,
    /// Append frames instead of redrawing in place (debugging aid).
    append_only: bool,
    stats: RenderStats,
}

/// Writer for permanent output emitted while a frame is being drawn.
pub struct RawWriter<'a> {
    out: &'a mut Vec<u8>,
    previous_lines: usize,
    append_only: bool,
    cursor_reset: bool,
    dirty: bool,
}

impl<'a> RawWriter<'a> {
    const fn new(out: &'a mut Vec<u8>, previous_lines: usize, append_only: bool) -> Self {
        Self {
            out,
            previous_lines,
            append_only,
            cursor_reset: false,
            dirty: false,
        }
    }

    /// Hide the cursor and move it to the top of the live area, once per frame.
    fn reset_cursor_once(&mut self) -> io::Result<()> {
        if self.cursor_reset {
            return Ok(());
        }
        self.cursor_reset = true;
        queue!(self.out, cursor::Hide)?;
        if !self.append_only && self.previous_lines > 0 {
            let up = u16::try_from(self.previous_lines).unwrap_or(u16::MAX);
            queue!(self.out, cursor::MoveUp(up))?;
        }
        Ok(())
    }

    /// Whether anything was written through this writer.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl Write for RawWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.dirty {
            self.dirty = true;
            self.reset_cursor_once()?;
            queue!(self.out, terminal::Clear(terminal::ClearType::FromCursorDown))?;
        }
        self.out.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Screen {
    /// Create a screen that redraws in place.
    pub fn new() -> Self {
        Self {
            output: Vec::with_capacity(4096),
            ..Self::default()
        }
    }

    /// Create a screen that appends every frame below the previous one.
    pub fn append_only() -> Self {
        Self {
            append_only: true,
            ..Self::new()
        }
    }

    /// Lines drawn by the last frame.
    pub fn previous(&self) -> &[String] {
        &self.previous
    }

    /// Bytes produced by the last call, to be written to the terminal.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Drop any bytes not yet handed to the terminal.
    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    /// Render statistics.
    pub const fn stats(&self) -> &RenderStats {
        &self.stats
    }

    /// Forget what is on screen, e.g. after a failed write.
    ///
    /// The next frame is drawn below whatever is there instead of over it.
    pub fn invalidate(&mut self) {
        self.previous.clear();
        self.output.clear();
    }

    /// Draw a frame and diff it against the previous one.
    ///
    /// `draw` may write permanent output to the raw writer and returns the
    /// live-area lines. Returns whether any bytes were produced.
    pub fn repaint<F>(&mut self, draw: F) -> io::Result<bool>
    where
        F: FnOnce(&mut RawWriter<'_>) -> io::Result<Vec<String>>,
    {
        self.output.clear();
        let mut raw = RawWriter::new(&mut self.output, self.previous.len(), self.append_only);

        let lines = match draw(&mut raw) {
            Ok(lines) => lines,
            Err(err) => {
                self.invalidate();
                return Err(err);
            }
        };
        let previous = std::mem::replace(&mut self.previous, lines);

        if !raw.dirty && previous == self.previous {
            self.stats.skipped += 1;
            return Ok(false);
        }

        raw.reset_cursor_once()?;
        let dirty = raw.dirty;
        let mut written = 0u64;
        for (row, line) in self.previous.iter().enumerate() {
            if !dirty && !self.append_only && previous.get(row) == Some(line) {
                queue!(raw.out, cursor::MoveDown(1))?;
                continue;
            }
            queue!(raw.out, terminal::Clear(terminal::ClearType::UntilNewLine))?;
            raw.out.extend_from_slice(line.as_bytes());
            raw.out.extend_from_slice(b"\n\r");
            written += 1;
        }
        queue!(
            raw.out,
            terminal::Clear(terminal::ClearType::FromCursorDown),
            cursor::Show
        )?;

        self.stats.frames += 1;
        self.stats.lines_written += written;
        self.stats.bytes_written += self.output.len() as u64;
        Ok(true)
    }

    /// Pass permanent output straight through, for non-interactive outputs.
    pub fn passthrough<F>(&mut self, draw: F) -> io::Result<bool>
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        self.output.clear();
        draw(&mut self.output)?;
        self.stats.bytes_written += self.output.len() as u64;
        Ok(!self.output.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    fn frame(screen: &mut Screen, parser: &mut vt100::Parser, items: &[&str]) -> bool {
        let frame = lines(items);
        let changed = screen.repaint(|_| Ok(frame)).unwrap();
        parser.process(screen.output());
        changed
    }

    fn rows(parser: &vt100::Parser) -> Vec<String> {
        parser.screen().rows(0, 80).map(|r| r.trim_end().to_string()).collect()
    }

    #[test]
    fn test_identical_frame_writes_nothing() {
        let mut screen = Screen::new();
        assert!(screen.repaint(|_| Ok(lines(&["a", "b"]))).unwrap());
        assert!(!screen.output().is_empty());

        assert!(!screen.repaint(|_| Ok(lines(&["a", "b"]))).unwrap());
        assert!(screen.output().is_empty());
        assert_eq!(screen.stats().skipped, 1);
    }

    #[test]
    fn test_empty_frames_write_nothing() {
        let mut screen = Screen::new();
        assert!(!screen.repaint(|_| Ok(Vec::new())).unwrap());
        assert!(screen.output().is_empty());
    }

    #[test]
    fn test_repaint_in_place() {
        let mut screen = Screen::new();
        let mut parser = vt100::Parser::new(10, 80, 0);

        frame(&mut screen, &mut parser, &["one", "two", "three"]);
        assert_eq!(&rows(&parser)[..3], &["one", "two", "three"]);

        frame(&mut screen, &mut parser, &["one", "TWO", "three"]);
        assert_eq!(&rows(&parser)[..4], &["one", "TWO", "three", ""]);
        assert_eq!(screen.stats().lines_written, 4);
    }

    #[test]
    fn test_shrinking_frame_erases_leftovers() {
        let mut screen = Screen::new();
        let mut parser = vt100::Parser::new(10, 80, 0);

        frame(&mut screen, &mut parser, &["one", "two", "three"]);
        frame(&mut screen, &mut parser, &["solo"]);

        let rows = rows(&parser);
        assert_eq!(rows[0], "solo");
        assert!(rows[1..].iter().all(String::is_empty), "{rows:?}");
    }

    #[test]
    fn test_raw_output_lands_above_live_area() {
        let mut screen = Screen::new();
        let mut parser = vt100::Parser::new(10, 80, 0);
        frame(&mut screen, &mut parser, &["live"]);

        let changed = screen
            .repaint(|raw| {
                raw.write_all(b"log line\n\r")?;
                Ok(lines(&["live"]))
            })
            .unwrap();
        assert!(changed);
        parser.process(screen.output());

        assert_eq!(&rows(&parser)[..3], &["log line", "live", ""]);
    }

    #[test]
    fn test_draw_error_invalidates() {
        let mut screen = Screen::new();
        screen.repaint(|_| Ok(lines(&["a"]))).unwrap();

        let err = screen.repaint(|_| Err(io::Error::other("boom")));
        assert!(err.is_err());
        assert!(screen.previous().is_empty());
    }

    #[test]
    fn test_passthrough() {
        let mut screen = Screen::new();
        assert!(screen.passthrough(|out| out.write_all(b"plain\n")).unwrap());
        assert_eq!(screen.output(), b"plain\n");
    }
}
