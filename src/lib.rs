//! # xerror
//!
//! Structured errors that separate what developers need from what users see.
//!
//! ## Design Philosophy
//!
//! 1. **Every error has a short code** a user can read back to support
//! 2. **Internal causes are kept intact** for logs and cause-chain checks
//! 3. **External messages are the only thing users see**
//! 4. **The call site is captured once**, at construction
//! 5. **Reporting never fails**: missing parts render as placeholders
//!
//! ## Information Barrier
//!
//! - `Display` and the HTTP body show the external message and the code
//! - Logs show the internal cause and the call site
//! - `Debug` redacts the internal cause unless `trusted_debug` is enabled in a
//!   debug build
//! - The internal cause never reaches a [`ResponseSink`]
//!
//! ## Quick Start
//!
//! ```rust
//! use std::fmt;
//!
//! #[derive(Debug, PartialEq)]
//! struct NoRowsFound;
//!
//! impl fmt::Display for NoRowsFound {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         f.write_str("No rows found.")
//!     }
//! }
//!
//! impl std::error::Error for NoRowsFound {}
//!
//! fn find_user(id: u32) -> xerror::Result<String> {
//!     Err(xerror::errorf!(NoRowsFound, 0x1f, "invalid userid {}", id))
//! }
//!
//! let err = find_user(7).unwrap_err();
//!
//! // Chain-walking reaches the sentinel
//! assert!(err.has_cause(&NoRowsFound));
//!
//! // External rendering: message plus bracketed code
//! assert_eq!(
//!     err.render_compact_with(xerror::CodeRadix::Hex),
//!     "error: invalid userid 7 [0x1f]"
//! );
//! ```
//!
//! ## Identity Modes
//!
//! - [`Identity::Generate`]: random 4-digit token (`e0427`) from a process-wide
//!   generator seeded once from the clock. Renders verbose by default.
//! - [`Identity::Supplied`]: caller-chosen integer (`0x1f`). Renders compact by
//!   default.
//!
//! See [`style`] for how to pick the rendering explicitly.
//!
//! ## HTTP Boundary
//!
//! ```rust
//! use xerror::{Identity, Report, XError};
//! use xerror::response::RecordedResponse;
//! use xerror::ring_buffer::RingBufferLogger;
//!
//! let err = XError::new("db timeout", Identity::Supplied(3), "try again later");
//! let logger = RingBufferLogger::new(16, 1024);
//! let mut response = RecordedResponse::default();
//!
//! err.handle_http_with(&mut response, &logger);
//!
//! assert_eq!(response.status().map(|s| s.as_u16()), Some(500));
//! assert!(response.body().starts_with("error: try again later ["));
//! assert!(!response.body().contains("db timeout"));
//! assert!(logger.lines()[0].contains("db timeout"));
//! ```
//!
//! ## Features
//!
//! - `trusted_debug`: `Debug` output includes the internal cause (debug builds only)
//! - `decimal_codes`: numeric codes render in decimal by default
//! - `tracing`: [`TracingLogger`](logging::TracingLogger) log sink

#![warn(missing_docs)]
#![warn(clippy::all)]

use smallvec::SmallVec;
use std::error::Error;
use std::fmt;
use std::panic::Location;
use std::result;
use zeroize::Zeroize;

pub mod codes;
pub mod convenience;
pub mod identity;
pub mod logging;
pub mod response;
pub mod ring_buffer;
pub mod style;
pub mod template;

pub use codes::*;
pub use identity::*;
pub use logging::{InternalLog, LogSink, StderrLogger, default_sink, install_default_sink};
pub use response::{DEFAULT_STATUS, RecordedResponse, ResponseSink, StatusCode};
pub use style::{ConfigError, RenderStyle};

use logging::LocationDisplay;

/// Type alias for Results using our error type.
pub type Result<T> = result::Result<T, XError>;

/// Boxed internal cause.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Literal tag every external message starts with.
pub const EXTERNAL_PREFIX: &str = "error: ";

/// Rendered in place of an absent external message.
pub const UNKNOWN_ERROR: &str = "unknown error";

pub use logging::UNSPECIFIED_CAUSE;

// ============================================================================
// Report Capability Set
// ============================================================================

/// What every structured error can do at a reporting boundary.
pub trait Report: Error {
    /// Render in the configured style. Never empty, never fails.
    fn render(&self) -> String;

    /// The wrapped internal cause, if any.
    fn unwrap_cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)>;

    /// Append the internal detail to `sink`.
    fn log_to(&self, sink: &dyn LogSink);

    /// Append the internal detail to the process default sink.
    fn log(&self) {
        self.log_to(default_sink());
    }

    /// Log to `log` and write the external rendering to `response`.
    fn handle_http_with(&self, response: &mut dyn ResponseSink, log: &dyn LogSink);

    /// Log to the process default sink and write the external rendering to `response`.
    fn handle_http(&self, response: &mut dyn ResponseSink) {
        self.handle_http_with(response, default_sink());
    }
}

// ============================================================================
// XError
// ============================================================================

/// Structured error with a code, split messages and a captured call site.
///
/// # Key Properties
///
/// - Immutable once shared: only the builder-style `with_*` methods and
///   [`set_status`](Self::set_status) change it, before it reaches a boundary
/// - The code is computed once at construction
/// - The call site is that of the constructor's caller
/// - The internal cause is reachable through [`Error::source`]
/// - The external message buffer is zeroized on drop
///
/// Construct with [`XError::new`], [`XError::errorf`], the
/// [`xerror!`](crate::xerror) / [`errorf!`](crate::errorf) macros, or
/// [`XError::from_parts`] when parts may be missing.
#[must_use = "errors should be handled or logged"]
pub struct XError {
    code: ErrorCode,
    external: Option<String>,
    cause: Option<BoxError>,
    location: &'static Location<'static>,
    status: Option<StatusCode>,
    style: RenderStyle,
}

impl XError {
    fn build(
        cause: Option<BoxError>,
        identity: Identity<'_>,
        external: Option<String>,
        location: &'static Location<'static>,
    ) -> Self {
        let code = identity.resolve();
        Self {
            code,
            external,
            cause,
            location,
            status: None,
            style: style::initial_style(&code),
        }
    }

    #[inline]
    fn prefixed(external: impl fmt::Display) -> String {
        format!("{}{}", EXTERNAL_PREFIX, external)
    }

    /// Create an error wrapping `cause`.
    ///
    /// `cause` is anything convertible into a boxed error: an error value,
    /// another `XError`, or plain text. The external message is
    /// `"error: "` followed by `external`.
    ///
    /// ```rust
    /// use xerror::{Identity, XError};
    ///
    /// let err = XError::new("fk violation on orders", Identity::Supplied(12), "order rejected");
    /// assert_eq!(err.external_message(), "error: order rejected");
    /// ```
    #[track_caller]
    pub fn new<E>(cause: E, identity: Identity<'_>, external: impl fmt::Display) -> Self
    where
        E: Into<BoxError>,
    {
        Self::build(
            Some(cause.into()),
            identity,
            Some(Self::prefixed(external)),
            Location::caller(),
        )
    }

    /// Create an error with no internal cause.
    #[track_caller]
    pub fn without_cause(identity: Identity<'_>, external: impl fmt::Display) -> Self {
        Self::build(
            None,
            identity,
            Some(Self::prefixed(external)),
            Location::caller(),
        )
    }

    /// Create an error from optional parts.
    ///
    /// Missing parts are filled with placeholders when rendered.
    #[track_caller]
    pub fn from_parts(
        cause: Option<BoxError>,
        identity: Identity<'_>,
        external: Option<fmt::Arguments<'_>>,
    ) -> Self {
        Self::build(
            cause,
            identity,
            external.map(Self::prefixed),
            Location::caller(),
        )
    }

    /// Create an error with a caller-supplied numeric code.
    ///
    /// Usually reached through [`errorf!`](crate::errorf).
    #[track_caller]
    pub fn errorf<E>(cause: E, code: u32, external: fmt::Arguments<'_>) -> Self
    where
        E: Into<BoxError>,
    {
        Self::build(
            Some(cause.into()),
            Identity::Supplied(code),
            Some(Self::prefixed(external)),
            Location::caller(),
        )
    }

    /// Create an error whose external message comes from a runtime template.
    ///
    /// Mismatched arguments never fail; see [`template`].
    ///
    /// ```rust
    /// use xerror::{Identity, XError};
    ///
    /// let err = XError::with_template("timeout", Identity::Supplied(1), "retry in {}s", &[]);
    /// assert_eq!(err.external_message(), "error: retry in %!(MISSING)s");
    /// ```
    #[track_caller]
    pub fn with_template<E>(
        cause: E,
        identity: Identity<'_>,
        template: &str,
        args: &[&dyn fmt::Display],
    ) -> Self
    where
        E: Into<BoxError>,
    {
        let mut external = String::from(EXTERNAL_PREFIX);
        // Writing into a String cannot fail.
        let _ = template::render_into(&mut external, template, args);
        Self::build(
            Some(cause.into()),
            identity,
            Some(external),
            Location::caller(),
        )
    }

    /// Set the status written at the HTTP boundary.
    #[inline]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Override the status before the error reaches the boundary.
    #[inline]
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// Choose the rendering `Display` produces.
    #[inline]
    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    /// Identifying code, fixed at construction.
    #[inline]
    pub const fn code(&self) -> &ErrorCode {
        &self.code
    }

    /// External message, or [`UNKNOWN_ERROR`] if none was given.
    #[inline]
    pub fn external_message(&self) -> &str {
        match self.external.as_deref() {
            Some(msg) if !msg.is_empty() => msg,
            _ => UNKNOWN_ERROR,
        }
    }

    /// Call site of the constructor.
    #[inline]
    pub const fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Status set so far. `None` until set explicitly.
    #[inline]
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Status the HTTP boundary will write.
    #[inline]
    pub fn resolved_status(&self) -> StatusCode {
        self.status.unwrap_or(DEFAULT_STATUS)
    }

    /// Rendering used by `Display`.
    #[inline]
    pub const fn style(&self) -> RenderStyle {
        self.style
    }

    /// The wrapped cause, if any.
    #[inline]
    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Take the wrapped cause out, dropping the rest of the error.
    pub fn into_cause(mut self) -> Option<BoxError> {
        self.cause.take()
    }

    /// Iterate the cause chain, starting with this error.
    #[inline]
    pub fn chain(&self) -> Chain<'_> {
        Chain {
            next: Some(self as &(dyn Error + 'static)),
        }
    }

    /// First error of type `E` in the chain, starting with this error.
    pub fn find_cause<E: Error + 'static>(&self) -> Option<&E> {
        self.chain().find_map(|e| e.downcast_ref::<E>())
    }

    /// Whether any error of type `E` in the chain satisfies `pred`.
    pub fn is_caused_by<E, F>(&self, pred: F) -> bool
    where
        E: Error + 'static,
        F: Fn(&E) -> bool,
    {
        self.chain()
            .filter_map(|e| e.downcast_ref::<E>())
            .any(pred)
    }

    /// Whether any error in the chain equals `sentinel`.
    pub fn has_cause<E>(&self, sentinel: &E) -> bool
    where
        E: Error + PartialEq + 'static,
    {
        self.is_caused_by(|e: &E| e == sentinel)
    }

    /// Radix compact renderings of this error use.
    ///
    /// The radix of a `Compact` style, else the crate default.
    #[inline]
    pub fn compact_radix(&self) -> CodeRadix {
        match self.style {
            RenderStyle::Compact(radix) => radix,
            RenderStyle::Verbose => CodeRadix::default(),
        }
    }

    /// Single-line rendering: `"<external> [<code>]"`, in [`compact_radix`](Self::compact_radix).
    pub fn render_compact(&self) -> String {
        self.render_compact_with(self.compact_radix())
    }

    /// Single-line rendering in an explicit radix.
    pub fn render_compact_with(&self, radix: CodeRadix) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_compact(&mut out, radix);
        out
    }

    /// Multi-line rendering: external message, code, cause, location.
    pub fn render_verbose(&self) -> String {
        let mut out = String::new();
        let _ = self.write_verbose(&mut out);
        out
    }

    fn write_compact(&self, f: &mut impl fmt::Write, radix: CodeRadix) -> fmt::Result {
        write!(f, "{} [{}]", self.external_message(), self.code.display(radix))
    }

    fn write_verbose(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "{}\n\t[{}]\n\t{}\n\t{}\n",
            self.external_message(),
            self.code,
            CauseText(self.cause()),
            LocationDisplay(self.location)
        )
    }

    /// Borrowed view of the internal detail for logging.
    ///
    /// ```rust
    /// # use xerror::{Identity, XError};
    /// let err = XError::new("disk full", Identity::Supplied(4), "upload failed");
    /// let log = err.internal_log();
    /// assert_eq!(log.cause_text(), "disk full");
    /// ```
    #[inline]
    pub fn internal_log(&self) -> InternalLog<'_> {
        InternalLog {
            code: &self.code,
            cause: self.cause(),
            location: self.location,
        }
    }
}

/// Write lines to a sink as one group, then wipe the buffers.
fn emit(sink: &dyn LogSink, mut lines: logging::LogLines) {
    {
        let refs: SmallVec<[&str; 3]> = lines.iter().map(String::as_str).collect();
        sink.write_lines(&refs);
    }
    for line in lines.iter_mut() {
        line.zeroize();
    }
}

impl Report for XError {
    #[inline]
    fn render(&self) -> String {
        self.to_string()
    }

    #[inline]
    fn unwrap_cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause()
    }

    fn log_to(&self, sink: &dyn LogSink) {
        emit(sink, self.internal_log().lines());
    }

    fn handle_http_with(&self, response: &mut dyn ResponseSink, log: &dyn LogSink) {
        let status = self.resolved_status();
        let body = self.render_compact();

        let internal = self.internal_log();
        let mut lines = internal.lines();
        lines.insert(0, format!("{}: {}", body, internal.cause_text()));
        emit(log, lines);

        response.write_response(status, &body);
    }
}

impl Drop for XError {
    fn drop(&mut self) {
        if let Some(external) = self.external.as_mut() {
            external.zeroize();
        }
    }
}

impl fmt::Display for XError {
    /// Renders in the configured [`RenderStyle`]. `{:#}` always renders verbose.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.style {
            _ if f.alternate() => self.write_verbose(f),
            RenderStyle::Verbose => self.write_verbose(f),
            RenderStyle::Compact(radix) => self.write_compact(f, radix),
        }
    }
}

impl fmt::Debug for XError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("XError");
        s.field("code", &format_args!("{}", self.code))
            .field("external", &self.external_message())
            .field("location", &format_args!("{}", LocationDisplay(self.location)))
            .field("status", &self.status);

        #[cfg(all(feature = "trusted_debug", debug_assertions))]
        s.field("cause", &self.cause);
        #[cfg(not(all(feature = "trusted_debug", debug_assertions)))]
        s.field("cause", &self.cause.as_ref().map(|_| "<REDACTED>"));

        s.finish()
    }
}

impl Error for XError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause
            .as_deref()
            .map(|e| e as &(dyn Error + 'static))
    }
}

/// Iterator over an error and its sources. Created by [`XError::chain`].
#[derive(Clone)]
pub struct Chain<'a> {
    next: Option<&'a (dyn Error + 'static)>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn Error + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.source();
        Some(current)
    }
}

/// Cause text with the placeholder substituted.
struct CauseText<'a>(Option<&'a (dyn Error + Send + Sync + 'static)>);

impl fmt::Display for CauseText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.map(ToString::to_string) {
            Some(text) if !text.is_empty() => f.write_str(&text),
            _ => f.write_str(UNSPECIFIED_CAUSE),
        }
    }
}
