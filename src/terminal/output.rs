//! `SharedOutput`: the stream frames are written to.
//!
//! Frames are assembled in memory and handed over in a single `write_all`
//! to prevent terminal flickering.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Sink = Box<dyn Write + Send>;

/// Output stream shared by the render worker and input-mode callers.
#[derive(Clone)]
pub struct SharedOutput {
    inner: Arc<Mutex<Sink>>,
}

impl SharedOutput {
    /// Wrap any writer.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Process standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    fn lock(&self) -> MutexGuard<'_, Sink> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write `bytes` and flush, in one critical section.
    pub fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        let mut sink = self.lock();
        sink.write_all(bytes)?;
        sink.flush()
    }
}

impl std::fmt::Debug for SharedOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedOutput").finish_non_exhaustive()
    }
}

/// In-memory output that can be inspected while the console writes to it.
#[derive(Debug, Clone, Default)]
pub struct MemoryOutput {
    data: Arc<Mutex<Vec<u8>>>,
}

impl MemoryOutput {
    /// Create an empty capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Everything written so far, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.data.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing was written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Write for MemoryOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_output_writes_through() {
        let capture = MemoryOutput::new();
        let output = SharedOutput::new(capture.clone());

        output.write_all(b"hello").unwrap();
        output.clone().write_all(b" world").unwrap();

        assert_eq!(capture.text(), "hello world");
    }

    #[test]
    fn test_empty_write_is_skipped() {
        let capture = MemoryOutput::new();
        SharedOutput::new(capture.clone()).write_all(b"").unwrap();
        assert!(capture.is_empty());
    }
}
