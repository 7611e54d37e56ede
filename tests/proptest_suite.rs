//! Property-based tests for xerror
//!
//! These tests use proptest to generate random inputs and verify invariants hold.

use proptest::prelude::*;
use std::fmt;
use xerror::ring_buffer::RingBufferLogger;
use xerror::{
    CodeRadix, Identity, ProcessRng, RecordedResponse, Report, StatusCode, TOKEN_LEN, XError,
    template,
};

#[derive(Debug, PartialEq)]
struct Sentinel(u32);

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sentinel {}", self.0)
    }
}

impl std::error::Error for Sentinel {}

// ============================================================================
// RENDERING PROPERTIES
// ============================================================================

proptest! {
    /// Rendering never yields an empty string, whatever parts are present
    #[test]
    fn render_never_empty(
        external in proptest::option::of("\\PC{0,200}"),
        cause in proptest::option::of("\\PC{0,200}"),
        code in any::<u32>(),
    ) {
        let cause: Option<xerror::BoxError> = cause.map(Into::into);
        let err = match external.as_deref() {
            Some(e) => XError::from_parts(cause, Identity::Supplied(code), Some(format_args!("{}", e))),
            None => XError::from_parts(cause, Identity::Supplied(code), None),
        };

        prop_assert!(!err.render().is_empty());
        prop_assert!(!err.render_compact().is_empty());
        prop_assert!(!err.render_verbose().is_empty());
        prop_assert!(!err.external_message().is_empty());
    }

    /// Rendering the same value twice gives the same text
    #[test]
    fn render_is_idempotent(external in "\\PC{0,100}", cause in "\\PC{0,100}") {
        let err = XError::new(cause, Identity::Generate, external);
        let first = err.render();
        prop_assert_eq!(&first, &err.render());
        prop_assert_eq!(err.render_verbose(), err.render_verbose());
    }

    /// Compact rendering is a single line ending in a bracketed code
    #[test]
    fn compact_is_single_bracketed_line(external in "[a-z ]{0,60}", code in any::<u32>()) {
        let err = XError::new("cause", Identity::Supplied(code), &external);

        let hex = err.render_compact_with(CodeRadix::Hex);
        prop_assert!(!hex.contains('\n'));
        let expected_hex = format!(" [{:#x}]", code);
        prop_assert!(hex.ends_with(&expected_hex));

        let decimal = err.render_compact_with(CodeRadix::Decimal);
        let expected_decimal = format!(" [{}]", code);
        prop_assert!(decimal.ends_with(&expected_decimal));
    }
}

// ============================================================================
// IDENTITY PROPERTIES
// ============================================================================

proptest! {
    /// Generated tokens are exactly four decimal digits
    #[test]
    fn generated_tokens_are_four_digits(seed in any::<u64>()) {
        let rng = ProcessRng::with_seed(seed);
        let err = XError::without_cause(Identity::GenerateWith(&rng), "x");

        let token = err.code().token().expect("generated code");
        prop_assert_eq!(token.as_str().len(), TOKEN_LEN);
        prop_assert!(token.as_str().bytes().all(|b| b.is_ascii_digit()));
    }

    /// Supplied codes are stored unchanged
    #[test]
    fn supplied_codes_unchanged(code in any::<u32>()) {
        let err = XError::without_cause(Identity::Supplied(code), "x");
        prop_assert_eq!(err.code().numeric(), Some(code));
    }
}

#[test]
fn process_tokens_vary() {
    let tokens: std::collections::HashSet<String> = (0..64)
        .map(|_| {
            let err = XError::without_cause(Identity::Generate, "x");
            err.code().to_string()
        })
        .collect();
    // 64 draws from 10_000 values: a handful of collisions at most.
    assert!(tokens.len() > 50, "only {} distinct tokens", tokens.len());
}

// ============================================================================
// CAUSE CHAIN PROPERTIES
// ============================================================================

proptest! {
    /// The sentinel is reachable however deep it is wrapped
    #[test]
    fn sentinel_reachable_at_any_depth(value in any::<u32>(), depth in 0usize..6) {
        let mut err = XError::new(Sentinel(value), Identity::Supplied(0), "root");
        for level in 0..depth {
            err = XError::new(err, Identity::Supplied(level as u32 + 1), "wrapped");
        }

        prop_assert!(err.has_cause(&Sentinel(value)));
        prop_assert!(!err.has_cause(&Sentinel(value.wrapping_add(1))));
        prop_assert_eq!(err.find_cause::<Sentinel>(), Some(&Sentinel(value)));
        prop_assert_eq!(err.chain().count(), depth + 2);
    }
}

// ============================================================================
// BOUNDARY PROPERTIES
// ============================================================================

proptest! {
    /// The response body is the compact rendering and never the cause
    #[test]
    fn response_never_contains_cause(secret in "[A-Z]{12}", external in "[a-z ]{1,40}") {
        let logger = RingBufferLogger::new(8, 4096);
        let mut response = RecordedResponse::default();
        let err = XError::new(secret.clone(), Identity::Supplied(7), &external);

        err.handle_http_with(&mut response, &logger);

        prop_assert_eq!(response.write_count(), 1);
        prop_assert_eq!(response.body(), err.render_compact());
        prop_assert!(!response.body().contains(&secret));
        prop_assert!(logger.lines()[0].contains(&secret));
    }

    /// Explicit statuses pass through; unset means 500
    #[test]
    fn status_resolution(raw in 100u16..1000, explicit in any::<bool>()) {
        let status = StatusCode::from_u16(raw).expect("valid range");
        let logger = RingBufferLogger::new(8, 1024);
        let mut response = RecordedResponse::default();

        let mut err = XError::without_cause(Identity::Supplied(1), "x");
        if explicit {
            err.set_status(status);
        }
        err.handle_http_with(&mut response, &logger);

        let expected = if explicit { status } else { StatusCode::INTERNAL_SERVER_ERROR };
        prop_assert_eq!(response.status(), Some(expected));
    }
}

// ============================================================================
// TEMPLATE PROPERTIES
// ============================================================================

proptest! {
    /// Templates with any argument count render without panicking
    #[test]
    fn template_never_panics(
        tpl in "[a-z{} ]{0,40}",
        args in prop::collection::vec("[a-z]{0,5}", 0..5),
    ) {
        let refs: Vec<&dyn fmt::Display> = args.iter().map(|a| a as &dyn fmt::Display).collect();
        let rendered = template::render(&tpl, &refs);
        let err = XError::with_template("c", Identity::Supplied(1), &tpl, &refs);

        prop_assert_eq!(err.external_message(), format!("error: {}", rendered));
    }

    /// Placeholder-free templates without arguments come back verbatim
    #[test]
    fn plain_templates_verbatim(tpl in "[a-z ]{0,40}") {
        prop_assert_eq!(template::render(&tpl, &[]), tpl);
    }
}
