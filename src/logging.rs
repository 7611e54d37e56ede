//! Log sinks and the internal log view.
//!
//! # Log Sinks
//!
//! A [`LogSink`] is an append-only line sink. It owns its own prefix and
//! timestamp conventions; errors hand it finished lines. Lines passed in one
//! [`write_lines`](LogSink::write_lines) call belong together and sinks that
//! can keep them contiguous should.
//!
//! Provided sinks:
//!
//! - [`StderrLogger`]: `2026/10/19 14:03:11 <line>` on standard error
//! - [`RingBufferLogger`](crate::ring_buffer::RingBufferLogger): bounded in-memory buffer
//! - `TracingLogger`: `tracing::error!` events (feature `tracing`)
//!
//! [`Report::log`](crate::Report::log) writes to the process default sink,
//! which is `StderrLogger` unless [`install_default_sink`] ran first.
//!
//! # Internal Log
//!
//! [`InternalLog`] borrows from the error that created it and cannot outlive
//! it. Internal detail is materialised into text only at the moment it is
//! written, and each field is truncated to [`MAX_FIELD_OUTPUT_LEN`] bytes so
//! a runaway cause message cannot flood the sink.

use crate::codes::ErrorCode;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::io::{self, Write};
use std::panic::Location;
use std::sync::{Arc, OnceLock};

/// Maximum length for any individual field in formatted output.
pub const MAX_FIELD_OUTPUT_LEN: usize = 1024;

/// Truncation indicator appended to truncated strings
const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

/// Rendered in place of an absent internal cause.
pub const UNSPECIFIED_CAUSE: &str = "unspecified internal error";

/// Timestamp layout used by [`StderrLogger`].
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Lines produced by a single logging call.
pub type LogLines = SmallVec<[String; 3]>;

static DEFAULT_SINK: OnceLock<Box<dyn LogSink>> = OnceLock::new();

// ============================================================================
// Sink Trait
// ============================================================================

/// Append-only text sink.
pub trait LogSink: Send + Sync {
    /// Append one line. Must not fail; sinks swallow their own I/O errors.
    fn write_line(&self, line: &str);

    /// Append related lines in order.
    fn write_lines(&self, lines: &[&str]) {
        for line in lines {
            self.write_line(line);
        }
    }
}

impl<S: LogSink + ?Sized> LogSink for &S {
    fn write_line(&self, line: &str) {
        (**self).write_line(line);
    }

    fn write_lines(&self, lines: &[&str]) {
        (**self).write_lines(lines);
    }
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn write_line(&self, line: &str) {
        (**self).write_line(line);
    }

    fn write_lines(&self, lines: &[&str]) {
        (**self).write_lines(lines);
    }
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn write_line(&self, line: &str) {
        (**self).write_line(line);
    }

    fn write_lines(&self, lines: &[&str]) {
        (**self).write_lines(lines);
    }
}

/// Install the process default sink used by [`Report::log`](crate::Report::log).
///
/// Returns `false` if a default was already installed or already resolved
/// to the stderr fallback.
pub fn install_default_sink(sink: impl LogSink + 'static) -> bool {
    DEFAULT_SINK.set(Box::new(sink)).is_ok()
}

/// The process default sink.
#[inline]
pub fn default_sink() -> &'static dyn LogSink {
    DEFAULT_SINK
        .get_or_init(|| Box::new(StderrLogger::new()))
        .as_ref()
}

// ============================================================================
// Stderr Sink
// ============================================================================

/// Writes timestamped lines to standard error.
///
/// Format: `<prefix><YYYY/MM/DD HH:MM:SS> <line>`. All lines of one call are
/// written under a single stderr lock.
#[derive(Debug, Clone, Default)]
pub struct StderrLogger {
    prefix: Cow<'static, str>,
}

impl StderrLogger {
    /// Logger with no prefix.
    pub const fn new() -> Self {
        Self {
            prefix: Cow::Borrowed(""),
        }
    }

    /// Logger that writes `prefix` before the timestamp.
    pub fn with_prefix(prefix: impl Into<Cow<'static, str>>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Format one line the way this logger writes it.
    pub fn format_line(&self, line: &str) -> String {
        format!(
            "{}{} {}",
            self.prefix,
            chrono::Local::now().format(TIMESTAMP_FORMAT),
            line
        )
    }
}

impl LogSink for StderrLogger {
    fn write_line(&self, line: &str) {
        self.write_lines(&[line]);
    }

    fn write_lines(&self, lines: &[&str]) {
        let stamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
        let mut out = io::stderr().lock();
        for line in lines {
            // Nowhere left to report a failed stderr write.
            let _ = writeln!(out, "{}{} {}", self.prefix, stamp, line);
        }
    }
}

// ============================================================================
// Tracing Sink
// ============================================================================

/// Emits each line as a `tracing` error event with target `xerror`.
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

#[cfg(feature = "tracing")]
impl LogSink for TracingLogger {
    fn write_line(&self, line: &str) {
        tracing::error!(target: "xerror", "{}", line);
    }
}

// ============================================================================
// Internal Log View
// ============================================================================

/// Borrowed view of an error's internal detail.
///
/// Obtained from [`XError::internal_log`](crate::XError::internal_log).
/// The lifetime ties it to the error; it cannot be stored past it.
pub struct InternalLog<'a> {
    pub(crate) code: &'a ErrorCode,
    pub(crate) cause: Option<&'a (dyn Error + Send + Sync + 'static)>,
    pub(crate) location: &'static Location<'static>,
}

impl<'a> InternalLog<'a> {
    /// Code of the error this view was taken from.
    #[inline]
    pub const fn code(&self) -> &ErrorCode {
        self.code
    }

    /// The wrapped cause, if one was given.
    #[inline]
    pub fn cause(&self) -> Option<&'a (dyn Error + Send + Sync + 'static)> {
        self.cause
    }

    /// Captured call site.
    #[inline]
    pub const fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Rendered cause, or [`UNSPECIFIED_CAUSE`], truncated for output.
    pub fn cause_text(&self) -> String {
        let text = match self.cause {
            Some(cause) => cause.to_string(),
            None => return UNSPECIFIED_CAUSE.to_owned(),
        };
        if text.is_empty() {
            return UNSPECIFIED_CAUSE.to_owned();
        }
        match truncate_with_indicator(&text) {
            Cow::Borrowed(_) => text,
            Cow::Owned(truncated) => truncated,
        }
    }

    /// The two lines [`Report::log`](crate::Report::log) writes:
    /// the cause, then the location.
    pub fn lines(&self) -> LogLines {
        let mut lines = LogLines::new();
        lines.push(format!("error: {}", self.cause_text()));
        lines.push(format!("  at {}", LocationDisplay(self.location)));
        lines
    }

    /// Write a single-line summary without allocating intermediate buffers
    /// for anything but the cause text.
    ///
    /// Format: `[<code>] cause='<cause>' at=<file>:<line>`
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "[{}] cause='{}' at={}",
            self.code,
            self.cause_text(),
            LocationDisplay(self.location)
        )
    }
}

impl fmt::Debug for InternalLog<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternalLog")
            .field("code", self.code)
            .field("cause", &self.cause.map(|_| "<PRESENT>"))
            .field("location", &LocationDisplay(self.location).to_string())
            .finish()
    }
}

/// `<file>:<line>` rendering of a captured call site.
#[derive(Clone, Copy)]
pub(crate) struct LocationDisplay(pub(crate) &'static Location<'static>);

impl fmt::Display for LocationDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0.file(), self.0.line())
    }
}

/// Truncate a string for display to prevent floods from extremely long messages.
///
/// If the string exceeds MAX_FIELD_OUTPUT_LEN, it's truncated with an indicator
/// to make the truncation visible to operators.
pub(crate) fn truncate_with_indicator(s: &str) -> Cow<'_, str> {
    if s.len() <= MAX_FIELD_OUTPUT_LEN {
        return Cow::Borrowed(s);
    }

    let max_content_len = MAX_FIELD_OUTPUT_LEN.saturating_sub(TRUNCATION_INDICATOR.len());

    // Last char boundary at or before the limit
    let mut idx = max_content_len;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    if idx == 0 {
        return Cow::Borrowed(TRUNCATION_INDICATOR);
    }

    let mut result = String::with_capacity(idx + TRUNCATION_INDICATOR.len());
    result.push_str(&s[..idx]);
    result.push_str(TRUNCATION_INDICATOR);
    Cow::Owned(result)
}
