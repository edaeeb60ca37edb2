//! Recent log sources: a bounded ring of the sources of the last flushed lines.
//!
//! Producers query it between frames to guess whether an action recently
//! wrote output (e.g. before asking the user for input), so unlike the rest
//! of the console state it is shared and guarded by a lock.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Number of recent output lines whose source is remembered.
pub const MAX_LOG_SOURCES: usize = 30;

/// Shared FIFO ring of source identifiers.
#[derive(Debug, Clone)]
pub struct LogSources {
    inner: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl Default for LogSources {
    fn default() -> Self {
        Self::with_capacity(MAX_LOG_SOURCES)
    }
}

impl LogSources {
    /// Create a ring holding at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the source of one flushed line, evicting the oldest entry when full.
    pub fn record(&self, source: &str) {
        if self.capacity == 0 {
            return;
        }
        let mut sources = self.lock();
        while sources.len() >= self.capacity {
            sources.pop_front();
        }
        sources.push_back(source.to_string());
    }

    /// Whether `source` produced one of the remembered lines.
    pub fn contains(&self, source: &str) -> bool {
        self.lock().iter().any(|s| s == source)
    }

    /// Number of remembered entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
