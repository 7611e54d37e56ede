//! HTTP boundary: response sinks.
//!
//! A [`ResponseSink`] receives exactly one status and one plain-text body
//! per error. Only the compact external rendering is ever written to it;
//! the internal cause goes to the log sink instead.
//!
//! Implementations:
//!
//! - `http::Response<String>`: sets status, body and plain-text headers,
//!   so it can be handed to any server built on the `http` crate.
//! - [`RecordedResponse`]: captures writes for tests and demos.
//!
//! ```rust
//! use http::StatusCode;
//! use xerror::{Identity, Report, XError};
//! use xerror::response::RecordedResponse;
//! use xerror::ring_buffer::RingBufferLogger;
//!
//! let err = XError::new("connection reset", Identity::Supplied(0x2a), "upstream failed")
//!     .with_status(StatusCode::BAD_GATEWAY);
//!
//! let mut response = RecordedResponse::default();
//! err.handle_http_with(&mut response, &RingBufferLogger::new(8, 256));
//!
//! assert_eq!(response.status(), Some(StatusCode::BAD_GATEWAY));
//! assert!(!response.body().contains("connection reset"));
//! ```

use http::header::{self, HeaderValue};
pub use http::StatusCode;

/// Status written when an error reaches the boundary without one.
pub const DEFAULT_STATUS: StatusCode = StatusCode::INTERNAL_SERVER_ERROR;

/// `content-type` written with error bodies.
pub const PLAIN_TEXT_UTF8: &str = "text/plain; charset=utf-8";

/// Destination for an error response.
pub trait ResponseSink {
    /// Set the status and write `body`. Called once per error.
    fn write_response(&mut self, status: StatusCode, body: &str);
}

impl<S: ResponseSink + ?Sized> ResponseSink for &mut S {
    fn write_response(&mut self, status: StatusCode, body: &str) {
        (**self).write_response(status, body);
    }
}

impl ResponseSink for http::Response<String> {
    /// Replaces status and body. The body gets a trailing newline and the
    /// response is marked plain text with sniffing disabled.
    fn write_response(&mut self, status: StatusCode, body: &str) {
        *self.status_mut() = status;

        let headers = self.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(PLAIN_TEXT_UTF8),
        );
        headers.insert(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        );

        let out = self.body_mut();
        out.clear();
        out.push_str(body);
        out.push('\n');
    }
}

/// Response sink that records what it was given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedResponse {
    writes: Vec<(StatusCode, String)>,
}

impl RecordedResponse {
    /// Status of the last write.
    pub fn status(&self) -> Option<StatusCode> {
        self.writes.last().map(|(status, _)| *status)
    }

    /// Body of the last write, or `""`.
    pub fn body(&self) -> &str {
        self.writes.last().map_or("", |(_, body)| body.as_str())
    }

    /// Number of writes received.
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }
}

impl ResponseSink for RecordedResponse {
    fn write_response(&mut self, status: StatusCode, body: &str) {
        self.writes.push((status, body.to_owned()));
    }
}
