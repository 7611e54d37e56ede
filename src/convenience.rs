//! Convenience macros for creating errors with format strings.
//!
//! Both macros expand to a single constructor call at the invocation site,
//! so the captured location is the line the macro was written on.
//!
//! - [`xerror!`](crate::xerror): generated token code
//! - [`errorf!`](crate::errorf): caller-supplied numeric code
//!
//! Format strings are checked at compile time like `format!`. For templates
//! only known at runtime use [`XError::with_template`](crate::XError::with_template).
//!
//! ```rust
//! use xerror::{errorf, xerror};
//!
//! let id = 42;
//! let a = xerror!("no such row", "user {} not found", id);
//! let b = errorf!("no such row", 0x404, "user {} not found", id);
//!
//! assert_eq!(a.external_message(), "error: user 42 not found");
//! assert!(a.code().is_generated());
//! assert_eq!(b.code().numeric(), Some(0x404));
//! ```

/// Create an [`XError`](crate::XError) with a generated token code.
///
/// `xerror!(cause, "format", args...)`
#[macro_export]
macro_rules! xerror {
    ($cause:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::XError::new(
            $cause,
            $crate::Identity::Generate,
            ::core::format_args!($fmt $(, $arg)*),
        )
    };
}

/// Create an [`XError`](crate::XError) with a caller-supplied numeric code.
///
/// `errorf!(cause, code, "format", args...)`
#[macro_export]
macro_rules! errorf {
    ($cause:expr, $code:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::XError::errorf($cause, $code, ::core::format_args!($fmt $(, $arg)*))
    };
}
