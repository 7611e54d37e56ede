//! Error identity - short codes a human can read back over the phone.
//!
//! An error carries exactly one [`ErrorCode`]:
//!
//! - **Token**: a 4-character string of decimal digits drawn at random when
//!   the error is constructed. Identifies one *occurrence*.
//! - **Numeric**: an integer supplied by the caller. Identifies one *class*
//!   of error (one call site, one failure mode).
//!
//! Both render compactly so the code survives being copied off a screen:
//!
//! ```rust
//! use xerror::{CodeRadix, ErrorCode, Token};
//!
//! let token: Token = "0427".parse().unwrap();
//! assert_eq!(ErrorCode::Token(token).to_string(), "e0427");
//!
//! let numeric = ErrorCode::Numeric(31);
//! assert_eq!(numeric.display(CodeRadix::Hex).to_string(), "0x1f");
//! assert_eq!(numeric.display(CodeRadix::Decimal).to_string(), "31");
//! ```
//!
//! # Zero-Allocation Guarantee
//!
//! Display writes directly to the formatter. `to_string()` allocates in user code.

use std::fmt;
use std::str::FromStr;

/// Number of characters in a generated token.
pub const TOKEN_LEN: usize = 4;

/// Characters a generated token is drawn from.
pub const TOKEN_ALPHABET: &[u8; 10] = b"0123456789";

/// Marker written in front of tokens so they read as codes, not quantities.
pub const TOKEN_MARKER: char = 'e';

// ============================================================================
// Token
// ============================================================================

/// Fixed-length digit token identifying a single error occurrence.
///
/// Stored inline as ASCII bytes. Only constructible from bytes that belong
/// to [`TOKEN_ALPHABET`], so `as_str` is always valid UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token([u8; TOKEN_LEN]);

impl Token {
    /// Build a token from digit values `0..=9`.
    ///
    /// Returns `None` if any value is out of range.
    #[inline]
    pub const fn from_digits(digits: [u8; TOKEN_LEN]) -> Option<Self> {
        let mut bytes = [0u8; TOKEN_LEN];
        let mut i = 0;
        while i < TOKEN_LEN {
            if digits[i] as usize >= TOKEN_ALPHABET.len() {
                return None;
            }
            bytes[i] = TOKEN_ALPHABET[digits[i] as usize];
            i += 1;
        }
        Some(Self(bytes))
    }

    /// Build a token from the low four decimal digits of `value`.
    #[inline]
    pub(crate) const fn from_low_digits(mut value: u64) -> Self {
        let mut bytes = [b'0'; TOKEN_LEN];
        let mut i = TOKEN_LEN;
        while i > 0 {
            i -= 1;
            bytes[i] = TOKEN_ALPHABET[(value % 10) as usize];
            value /= 10;
        }
        Self(bytes)
    }

    /// The token text, e.g. `"0427"`.
    #[inline]
    pub fn as_str(&self) -> &str {
        // Bytes are always drawn from TOKEN_ALPHABET.
        std::str::from_utf8(&self.0).unwrap_or("????")
    }

    /// The raw ASCII bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; TOKEN_LEN] {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`Token`] from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenParseError {
    /// Input was not exactly [`TOKEN_LEN`] characters.
    WrongLength {
        /// Length of the rejected input.
        len: usize,
    },
    /// Input contained a character outside [`TOKEN_ALPHABET`].
    InvalidCharacter {
        /// Zero-based index of the offending character.
        position: usize,
    },
}

impl fmt::Display for TokenParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongLength { len } => {
                write!(f, "token must be {} characters, got {}", TOKEN_LEN, len)
            }
            Self::InvalidCharacter { position } => {
                write!(f, "token character at position {} is not a digit", position)
            }
        }
    }
}

impl std::error::Error for TokenParseError {}

impl FromStr for Token {
    type Err = TokenParseError;

    /// Parses both the bare form (`"0427"`) and the marked form (`"e0427"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix(TOKEN_MARKER).unwrap_or(s);
        let bytes = s.as_bytes();
        if bytes.len() != TOKEN_LEN {
            return Err(TokenParseError::WrongLength { len: bytes.len() });
        }

        let mut out = [0u8; TOKEN_LEN];
        for (position, (&b, slot)) in bytes.iter().zip(out.iter_mut()).enumerate() {
            if !TOKEN_ALPHABET.contains(&b) {
                return Err(TokenParseError::InvalidCharacter { position });
            }
            *slot = b;
        }
        Ok(Self(out))
    }
}

// ============================================================================
// Code Radix
// ============================================================================

/// How numeric codes are written in compact renderings.
///
/// Hexadecimal is the default: codes stay short and don't read like
/// ordinary quantities. Enable the `decimal_codes` feature to flip the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeRadix {
    /// `0x1f`
    Hex,
    /// `31`
    Decimal,
}

impl Default for CodeRadix {
    #[inline]
    fn default() -> Self {
        if cfg!(feature = "decimal_codes") {
            Self::Decimal
        } else {
            Self::Hex
        }
    }
}

// ============================================================================
// Error Code
// ============================================================================

/// Identity of a structured error.
///
/// Computed once at construction and never regenerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Randomly generated per occurrence.
    Token(Token),
    /// Supplied by the caller.
    Numeric(u32),
}

impl ErrorCode {
    /// Whether this code was generated rather than supplied.
    #[inline]
    pub const fn is_generated(&self) -> bool {
        matches!(self, Self::Token(_))
    }

    /// The token, if this code was generated.
    #[inline]
    pub const fn token(&self) -> Option<&Token> {
        match self {
            Self::Token(t) => Some(t),
            Self::Numeric(_) => None,
        }
    }

    /// The number, if this code was supplied.
    #[inline]
    pub const fn numeric(&self) -> Option<u32> {
        match self {
            Self::Token(_) => None,
            Self::Numeric(n) => Some(*n),
        }
    }

    /// Display adapter using an explicit radix for numeric codes.
    #[inline]
    pub const fn display(&self, radix: CodeRadix) -> CodeDisplay<'_> {
        CodeDisplay { code: self, radix }
    }
}

impl From<Token> for ErrorCode {
    fn from(token: Token) -> Self {
        Self::Token(token)
    }
}

impl From<u32> for ErrorCode {
    fn from(code: u32) -> Self {
        Self::Numeric(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display(CodeRadix::default()).fmt(f)
    }
}

/// Borrowed formatter returned by [`ErrorCode::display`].
#[derive(Debug, Clone, Copy)]
pub struct CodeDisplay<'a> {
    code: &'a ErrorCode,
    radix: CodeRadix,
}

impl fmt::Display for CodeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.radix) {
            // Tokens are already digit strings; the radix doesn't apply.
            (ErrorCode::Token(t), _) => write!(f, "{}{}", TOKEN_MARKER, t),
            (ErrorCode::Numeric(n), CodeRadix::Hex) => write!(f, "{:#x}", n),
            (ErrorCode::Numeric(n), CodeRadix::Decimal) => write!(f, "{}", n),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
