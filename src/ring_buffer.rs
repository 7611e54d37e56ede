// src/ring_buffer.rs
//! Ring buffer log sink with bounded memory.
//!
//! Keeps the most recent log lines in a fixed-size buffer with FIFO
//! eviction. Useful where stderr is not collected (embedded servers, test
//! harnesses) or where an admin endpoint should show the last N errors.
//!
//! # Design Principles
//!
//! - **Bounded memory**: Fixed maximum size regardless of error volume
//! - **FIFO eviction**: Oldest lines dropped first
//! - **Per-line size caps**: No single line can dominate the buffer
//! - **RwLock-based**: Concurrent readers, exclusive writers
//! - **Grouped writes**: Lines of one logging call are pushed under one
//!   write lock, so they stay adjacent
//!
//! # Example
//!
//! ```rust
//! use xerror::ring_buffer::RingBufferLogger;
//! use xerror::{Identity, Report, XError};
//!
//! // Max 1000 lines, 2KB per line = 2MB total
//! let logger = RingBufferLogger::new(1000, 2048);
//!
//! let err = XError::without_cause(Identity::Supplied(7), "lookup failed");
//! err.log_to(&logger);
//!
//! let recent = logger.get_recent(2);
//! assert!(recent[0].line.starts_with("  at "));
//! assert_eq!(recent[1].line.as_ref(), "error: unspecified internal error");
//! ```

use crate::logging::LogSink;
use std::borrow::Cow;
use std::collections::VecDeque;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

/// A single buffered log line.
///
/// Uses `Arc<str>` so reads clone by refcount only.
#[derive(Clone, Debug)]
pub struct LogEntry {
    /// Unix timestamp (seconds) when the line was written
    pub timestamp: u64,
    /// Monotonic sequence number, unique per logger
    pub sequence: u64,
    /// The line text, possibly truncated
    pub line: Arc<str>,
}

/// Bounded FIFO of log entries. Allocated once at full capacity.
struct RingBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl RingBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `entry`, returning the entry it displaced when full.
    fn push(&mut self, entry: LogEntry) -> Option<LogEntry> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }
}

/// Ring buffer log sink with bounded memory usage.
///
/// Clones share the same buffer.
pub struct RingBufferLogger {
    buffer: Arc<RwLock<RingBuffer>>,
    max_entries: usize,
    max_entry_bytes: usize,
    eviction_count: Arc<AtomicU64>,
    sequence: Arc<AtomicU64>,
}

impl RingBufferLogger {
    /// Create a new ring buffer logger.
    ///
    /// # Arguments
    ///
    /// * `max_entries` - Maximum number of lines before FIFO eviction (at least 1)
    /// * `max_entry_bytes` - Maximum bytes kept per line
    pub fn new(max_entries: usize, max_entry_bytes: usize) -> Self {
        let bounded_entries = max_entries.max(1);
        Self {
            buffer: Arc::new(RwLock::new(RingBuffer::new(bounded_entries))),
            max_entries: bounded_entries,
            max_entry_bytes,
            eviction_count: Arc::new(AtomicU64::new(0)),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    #[inline]
    fn read_buffer(&self) -> RwLockReadGuard<'_, RingBuffer> {
        match self.buffer.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[inline]
    fn write_buffer(&self) -> RwLockWriteGuard<'_, RingBuffer> {
        match self.buffer.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn create_entry(&self, line: &str, timestamp: u64) -> LogEntry {
        LogEntry {
            timestamp,
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
            line: Arc::from(truncate_to_bytes(line, self.max_entry_bytes).as_ref()),
        }
    }

    /// Get the N most recent lines, newest first.
    pub fn get_recent(&self, count: usize) -> Vec<LogEntry> {
        let buffer = self.read_buffer();
        buffer.entries.iter().rev().take(count).cloned().collect()
    }

    /// Get all lines, newest first.
    pub fn get_all(&self) -> Vec<LogEntry> {
        let buffer = self.read_buffer();
        buffer.entries.iter().rev().cloned().collect()
    }

    /// All line texts, oldest first.
    pub fn lines(&self) -> Vec<Arc<str>> {
        let buffer = self.read_buffer();
        buffer.entries.iter().map(|e| Arc::clone(&e.line)).collect()
    }

    /// Number of buffered lines.
    #[inline]
    pub fn len(&self) -> usize {
        self.read_buffer().entries.len()
    }

    /// Whether no lines are buffered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of evictions since creation.
    #[inline]
    pub fn eviction_count(&self) -> u64 {
        self.eviction_count.load(Ordering::Relaxed)
    }

    /// Clear all lines. Eviction and sequence counters keep counting.
    pub fn clear(&self) {
        self.write_buffer().entries.clear();
    }

    /// Maximum number of lines kept.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_entries
    }
}

impl LogSink for RingBufferLogger {
    fn write_line(&self, line: &str) {
        self.write_lines(&[line]);
    }

    fn write_lines(&self, lines: &[&str]) {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());

        let mut buffer = self.write_buffer();
        for line in lines {
            // Sequence is taken under the write lock so it matches buffer order.
            let entry = self.create_entry(line, timestamp);
            if buffer.push(entry).is_some() {
                self.eviction_count.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

impl Clone for RingBufferLogger {
    fn clone(&self) -> Self {
        Self {
            buffer: Arc::clone(&self.buffer),
            max_entries: self.max_entries,
            max_entry_bytes: self.max_entry_bytes,
            eviction_count: Arc::clone(&self.eviction_count),
            sequence: Arc::clone(&self.sequence),
        }
    }
}

impl std::fmt::Debug for RingBufferLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBufferLogger")
            .field("len", &self.len())
            .field("capacity", &self.max_entries)
            .field("max_entry_bytes", &self.max_entry_bytes)
            .field("evictions", &self.eviction_count())
            .finish()
    }
}

/// Truncate string to maximum byte length, respecting UTF-8 boundaries.
fn truncate_to_bytes(s: &str, max_bytes: usize) -> Cow<'_, str> {
    if max_bytes == 0 {
        return Cow::Borrowed("");
    }
    if s.len() <= max_bytes {
        return Cow::Borrowed(s);
    }

    let indicator = "...[TRUNC]";
    if max_bytes <= indicator.len() {
        return Cow::Borrowed(&indicator[..max_bytes]);
    }
    let max_content = max_bytes - indicator.len();

    let mut idx = max_content;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    if idx == 0 {
        return Cow::Borrowed(indicator);
    }

    let mut out = String::with_capacity(idx + indicator.len());
    out.push_str(&s[..idx]);
    out.push_str(indicator);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Identity, Report, XError};

    #[test]
    fn ring_buffer_evicts_oldest() {
        let logger = RingBufferLogger::new(3, 1024);

        for i in 0..5 {
            logger.write_line(&format!("line {}", i));
        }

        assert_eq!(logger.len(), 3);
        assert_eq!(logger.eviction_count(), 2);

        let entries = logger.get_all();
        assert_eq!(entries[0].line.as_ref(), "line 4");
        assert_eq!(entries[2].line.as_ref(), "line 2");
    }

    #[test]
    fn ring_buffer_respects_size_limit() {
        let logger = RingBufferLogger::new(100, 128);
        logger.write_line(&"A".repeat(10_000));

        let entry = &logger.get_recent(1)[0];
        assert!(entry.line.len() <= 128);
        assert!(entry.line.contains("TRUNC"));
    }

    #[test]
    fn error_log_lines_stay_adjacent() {
        let logger = RingBufferLogger::new(16, 1024);
        let err = XError::without_cause(Identity::Supplied(1), "first");
        err.log_to(&logger);
        logger.write_line("unrelated");
        err.log_to(&logger);

        let lines = logger.lines();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("error: "));
        assert!(lines[1].starts_with("  at "));
        assert_eq!(lines[2].as_ref(), "unrelated");
        assert!(lines[3].starts_with("error: "));
        assert!(lines[4].starts_with("  at "));
    }

    #[test]
    fn sequence_numbers_increase() {
        let logger = RingBufferLogger::new(4, 64);
        logger.write_lines(&["a", "b", "c"]);
        let seqs: Vec<u64> = logger.get_all().iter().rev().map(|e| e.sequence).collect();
        assert_eq!(seqs, [0, 1, 2]);
    }

    #[test]
    fn ring_buffer_clone_shares_state() {
        let logger1 = RingBufferLogger::new(100, 1024);
        let logger2 = logger1.clone();

        logger1.write_line("shared");

        assert_eq!(logger1.len(), 1);
        assert_eq!(logger2.len(), 1);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let logger = RingBufferLogger::new(0, 16);
        assert_eq!(logger.capacity(), 1);
        logger.write_lines(&["a", "b"]);
        assert_eq!(logger.len(), 1);
        assert_eq!(logger.eviction_count(), 1);
        assert_eq!(logger.lines()[0].as_ref(), "b");
    }

    #[test]
    fn clear_empties_buffer() {
        let logger = RingBufferLogger::new(4, 16);
        logger.write_line("x");
        logger.clear();
        assert!(logger.is_empty());
    }

    #[test]
    fn truncate_respects_utf8() {
        let emoji = "🔥".repeat(100);
        let truncated = truncate_to_bytes(&emoji, 50);
        assert!(std::str::from_utf8(truncated.as_bytes()).is_ok());
        assert!(truncated.len() <= 50);
    }

    #[test]
    fn truncate_no_allocation_when_short() {
        let truncated = truncate_to_bytes("short", 100);
        assert!(matches!(truncated, Cow::Borrowed(_)));
        assert_eq!(truncated.as_ref(), "short");
    }

    #[test]
    fn ring_buffer_concurrent_logging() {
        use std::thread;

        let logger = RingBufferLogger::new(128, 256);
        let mut handles = Vec::new();

        for i in 0..8 {
            let logger = logger.clone();
            handles.push(thread::spawn(move || {
                for j in 0..100 {
                    let err = XError::without_cause(Identity::Supplied(i * 100 + j), "busy");
                    err.log_to(&logger);
                }
            }));
        }

        for handle in handles {
            handle.join().expect("thread panicked");
        }

        assert_eq!(logger.len(), 128);
        assert!(logger.eviction_count() > 0);

        // Every cause line is immediately followed by its location line.
        let lines = logger.lines();
        let start = usize::from(lines[0].starts_with("  at "));
        for pair in lines[start..].chunks_exact(2) {
            assert!(pair[0].starts_with("error: "));
            assert!(pair[1].starts_with("  at "));
        }
    }

    #[test]
    fn arc_str_cloning_is_cheap() {
        let logger = RingBufferLogger::new(10, 1024);
        logger.write_line("details");

        let entry1 = logger.get_recent(1)[0].clone();
        let entry2 = logger.get_recent(1)[0].clone();
        assert!(Arc::ptr_eq(&entry1.line, &entry2.line));
    }
}
