//! Identity generation for structured errors.
//!
//! Every [`XError`](crate::XError) gets its code from an [`Identity`]:
//!
//! - [`Identity::Generate`] draws a fresh token from the process generator.
//! - [`Identity::GenerateWith`] draws from an injected [`TokenSource`].
//! - [`Identity::Supplied`] stores a caller-chosen integer unchanged.
//!
//! # Process Generator
//!
//! The process generator is seeded once from the wall clock. Call
//! [`init_process_rng`] from `main` to pin the seeding to process start;
//! otherwise it is seeded lazily on first use. Either way it is seeded
//! exactly once.
//!
//! The generator is a splitmix64 stream over an atomic counter: every draw
//! is one `fetch_add` followed by a pure mix, so concurrent constructors
//! need no lock and never observe the same state twice.
//!
//! # Testing
//!
//! Inject a deterministic source instead of touching the global:
//!
//! ```rust
//! use xerror::{Identity, ProcessRng, TokenSource};
//!
//! let rng = ProcessRng::with_seed(7);
//! let a = rng.next_token();
//! let b = ProcessRng::with_seed(7).next_token();
//! assert_eq!(a, b);
//!
//! let _identity = Identity::GenerateWith(&rng);
//! ```

use crate::codes::{ErrorCode, TOKEN_LEN, Token};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// `10^TOKEN_LEN`: number of distinct tokens.
const TOKEN_SPACE: u64 = 10u64.pow(TOKEN_LEN as u32);

/// Largest multiple of `TOKEN_SPACE` representable in a u64.
///
/// Draws at or above this are rejected so every token is equally likely.
const UNBIASED_LIMIT: u64 = u64::MAX - (u64::MAX % TOKEN_SPACE);

/// Redraws allowed before a biased draw is accepted.
///
/// A fair 64-bit source lands in the biased tail with probability below
/// 2^-50, so the cap only ever triggers for broken or scripted sources.
pub const MAX_REJECTIONS: u32 = 16;

static PROCESS_RNG: OnceLock<ProcessRng> = OnceLock::new();

#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(GOLDEN_GAMMA);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

// ============================================================================
// Token Source
// ============================================================================

/// A source of random tokens.
///
/// Implementors only provide raw 64-bit draws; [`next_token`](Self::next_token)
/// turns them into uniformly distributed digit tokens.
pub trait TokenSource: Send + Sync {
    /// Next raw 64-bit value.
    fn next_u64(&self) -> u64;

    /// Next token, each digit independent and uniform over `0-9`.
    ///
    /// A source that keeps drawing from the biased tail is given up on after
    /// [`MAX_REJECTIONS`] draws and the last one is used as is.
    fn next_token(&self) -> Token {
        let mut draw = self.next_u64();
        for _ in 0..MAX_REJECTIONS {
            if draw < UNBIASED_LIMIT {
                break;
            }
            draw = self.next_u64();
        }
        Token::from_low_digits(draw % TOKEN_SPACE)
    }
}

impl<T: TokenSource + ?Sized> TokenSource for &T {
    #[inline]
    fn next_u64(&self) -> u64 {
        (**self).next_u64()
    }
}

// ============================================================================
// Process RNG
// ============================================================================

/// Lock-free splitmix64 generator.
///
/// Safe to share across threads by reference.
#[derive(Debug)]
pub struct ProcessRng {
    state: AtomicU64,
}

impl ProcessRng {
    /// Deterministic generator for a fixed seed.
    #[inline]
    pub const fn with_seed(seed: u64) -> Self {
        Self {
            state: AtomicU64::new(seed),
        }
    }

    /// Generator seeded from the current time.
    ///
    /// Nanoseconds since the epoch are mixed with a stack address so two
    /// generators created in the same clock tick still diverge.
    pub fn from_clock() -> Self {
        let now_nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0_u64, |d| d.as_nanos() as u64);
        let stack_hint = (&now_nanos as *const u64 as usize) as u64;
        Self::with_seed(splitmix64(now_nanos ^ stack_hint.rotate_left(17)))
    }
}

impl TokenSource for ProcessRng {
    #[inline]
    fn next_u64(&self) -> u64 {
        splitmix64(self.state.fetch_add(GOLDEN_GAMMA, Ordering::Relaxed))
    }
}

/// Seed the process generator from the clock.
///
/// Call once from process bootstrap. Returns `false` if the generator was
/// already initialised (by an earlier call or by a first construction).
pub fn init_process_rng() -> bool {
    PROCESS_RNG.set(ProcessRng::from_clock()).is_ok()
}

/// Seed the process generator with a fixed value.
///
/// Intended for reproducible runs. Same once-only rule as [`init_process_rng`].
pub fn init_process_rng_with_seed(seed: u64) -> bool {
    PROCESS_RNG.set(ProcessRng::with_seed(seed)).is_ok()
}

/// The process generator, seeding it from the clock if nobody has yet.
#[inline]
pub fn process_rng() -> &'static ProcessRng {
    PROCESS_RNG.get_or_init(ProcessRng::from_clock)
}

// ============================================================================
// Identity
// ============================================================================

/// How a new error obtains its code.
#[derive(Clone, Copy)]
pub enum Identity<'a> {
    /// Random token from the process generator.
    Generate,
    /// Random token from the given source.
    GenerateWith(&'a dyn TokenSource),
    /// Caller-supplied integer, stored unchanged.
    Supplied(u32),
}

impl Identity<'_> {
    /// Produce the code. Called exactly once per error.
    #[inline]
    pub(crate) fn resolve(self) -> ErrorCode {
        match self {
            Self::Generate => ErrorCode::Token(process_rng().next_token()),
            Self::GenerateWith(source) => ErrorCode::Token(source.next_token()),
            Self::Supplied(code) => ErrorCode::Numeric(code),
        }
    }
}

impl std::fmt::Debug for Identity<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generate => f.write_str("Generate"),
            Self::GenerateWith(_) => f.write_str("GenerateWith(..)"),
            Self::Supplied(code) => f.debug_tuple("Supplied").field(code).finish(),
        }
    }
}

impl From<u32> for Identity<'static> {
    fn from(code: u32) -> Self {
        Self::Supplied(code)
    }
}

// ============================================================================
// Tests
// ============================================================================
