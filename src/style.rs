//! Rendering configuration.
//!
//! Two renderings exist for every error:
//!
//! - **Verbose**: multi-line, for developers reading a terminal.
//! - **Compact**: one line with a bracketed code, for production output.
//!
//! The style an error's `Display` uses is picked at construction:
//!
//! 1. The process default, if one was configured (see [`set_default_style`]
//!    and the `XERROR_STYLE` environment variable).
//! 2. Otherwise by identity: generated tokens render verbose, supplied
//!    numeric codes render compact in the default [`CodeRadix`].
//!
//! It can be overridden per error with [`XError::with_style`](crate::XError::with_style).
//!
//! # Environment
//!
//! `XERROR_STYLE` accepts `verbose`, `compact`, `compact-hex` and
//! `compact-decimal` (case-insensitive). It is read once, the first time
//! an error is constructed. Unrecognised values are reported once to the
//! default log sink and otherwise ignored.

use crate::codes::{CodeRadix, ErrorCode};
use crate::logging::{LogSink, default_sink};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Environment variable consulted for the process default style.
pub const STYLE_ENV_VAR: &str = "XERROR_STYLE";

static DEFAULT_STYLE: OnceLock<Option<RenderStyle>> = OnceLock::new();

/// Which rendering an error's `Display` produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderStyle {
    /// External message, code, internal cause, location; one per line.
    Verbose,
    /// `"<external> [<code>]"` on a single line.
    Compact(CodeRadix),
}

impl RenderStyle {
    /// The style implied by how the code was produced.
    #[inline]
    pub fn for_code(code: &ErrorCode) -> Self {
        if code.is_generated() {
            Self::Verbose
        } else {
            Self::Compact(CodeRadix::default())
        }
    }

    /// Read [`STYLE_ENV_VAR`]. `Ok(None)` when unset.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        match std::env::var(STYLE_ENV_VAR) {
            Ok(value) => value.parse().map(Some),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode {
                var: STYLE_ENV_VAR,
            }),
        }
    }
}

impl Default for RenderStyle {
    #[inline]
    fn default() -> Self {
        Self::Compact(CodeRadix::default())
    }
}

impl FromStr for RenderStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verbose" | "debug" => Ok(Self::Verbose),
            "compact" => Ok(Self::Compact(CodeRadix::default())),
            "compact-hex" | "hex" => Ok(Self::Compact(CodeRadix::Hex)),
            "compact-decimal" | "decimal" => Ok(Self::Compact(CodeRadix::Decimal)),
            _ => Err(ConfigError::UnknownStyle {
                value: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verbose => f.write_str("verbose"),
            Self::Compact(CodeRadix::Hex) => f.write_str("compact-hex"),
            Self::Compact(CodeRadix::Decimal) => f.write_str("compact-decimal"),
        }
    }
}

/// Configuration could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The style name is not one of the recognised values.
    UnknownStyle {
        /// The rejected input.
        value: String,
    },
    /// The environment variable holds non-UTF-8 data.
    NotUnicode {
        /// Name of the variable.
        var: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownStyle { value } => write!(
                f,
                "unknown render style '{}' (expected verbose, compact, compact-hex or compact-decimal)",
                value
            ),
            Self::NotUnicode { var } => write!(f, "{} is not valid unicode", var),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Fix the process default style.
///
/// Returns `false` if the default was already settled, either by an earlier
/// call or because an error was constructed first (which reads the environment).
pub fn set_default_style(style: RenderStyle) -> bool {
    DEFAULT_STYLE.set(Some(style)).is_ok()
}

/// The process default style, if any.
///
/// A rejected [`STYLE_ENV_VAR`] value is reported once to the default log
/// sink and otherwise ignored.
#[inline]
pub fn default_style() -> Option<RenderStyle> {
    *DEFAULT_STYLE.get_or_init(|| match RenderStyle::from_env() {
        Ok(style) => style,
        Err(e) => {
            default_sink().write_line(&format!("xerror: ignoring {}: {}", STYLE_ENV_VAR, e));
            None
        }
    })
}

/// Style for a freshly constructed error with this code.
#[inline]
pub(crate) fn initial_style(code: &ErrorCode) -> RenderStyle {
    default_style().unwrap_or_else(|| RenderStyle::for_code(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::Token;

    #[test]
    fn parses_known_names() {
        assert_eq!("verbose".parse::<RenderStyle>(), Ok(RenderStyle::Verbose));
        assert_eq!(" Compact-Hex ".parse::<RenderStyle>(), Ok(RenderStyle::Compact(CodeRadix::Hex)));
        assert_eq!(
            "decimal".parse::<RenderStyle>(),
            Ok(RenderStyle::Compact(CodeRadix::Decimal))
        );
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "fancy".parse::<RenderStyle>().unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownStyle {
                value: "fancy".to_owned()
            }
        );
        assert!(err.to_string().contains("fancy"));
    }

    #[test]
    fn display_round_trips() {
        for style in [
            RenderStyle::Verbose,
            RenderStyle::Compact(CodeRadix::Hex),
            RenderStyle::Compact(CodeRadix::Decimal),
        ] {
            assert_eq!(style.to_string().parse::<RenderStyle>(), Ok(style));
        }
    }

    #[test]
    fn style_follows_identity() {
        let token = ErrorCode::Token(Token::from_low_digits(1));
        assert_eq!(RenderStyle::for_code(&token), RenderStyle::Verbose);
        assert!(matches!(
            RenderStyle::for_code(&ErrorCode::Numeric(1)),
            RenderStyle::Compact(_)
        ));
    }
}
