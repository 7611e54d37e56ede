//! Lenient runtime templates for external messages.
//!
//! `format!` checks its arguments at compile time. Templates that only exist
//! at runtime (loaded from a message catalogue, passed through an API) can't
//! be checked, and an error-reporting path must not fail on a bad one. This
//! module substitutes what it can and marks the rest in-band:
//!
//! - `{}` takes the next argument.
//! - `{{` and `}}` are literal braces.
//! - A `{}` with no argument left renders as `%!(MISSING)`.
//! - Unused arguments are appended as `%!(EXTRA a, b)`.
//! - Any other `{...}` or lone brace is copied through untouched.
//!
//! ```rust
//! use xerror::template;
//!
//! assert_eq!(template::render("user {} not found", &[&42]), "user 42 not found");
//! assert_eq!(template::render("{} and {}", &[&1]), "1 and %!(MISSING)");
//! assert_eq!(template::render("done", &[&"x"]), "done%!(EXTRA x)");
//! ```

use std::fmt::{self, Display, Write};

/// Marker written for a placeholder that has no argument.
pub const MISSING_MARKER: &str = "%!(MISSING)";

/// Render `template` with `args`. Never fails.
pub fn render(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len() + args.len() * 8);
    // Writing into a String cannot fail.
    let _ = render_into(&mut out, template, args);
    out
}

/// Render into any `fmt::Write`, returning only the writer's own errors.
pub fn render_into(out: &mut impl Write, template: &str, args: &[&dyn Display]) -> fmt::Result {
    let mut remaining = args.iter();
    let mut chars = template.char_indices().peekable();
    let mut literal_start = 0;

    while let Some((idx, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);
        match (c, next) {
            ('{', Some('{')) | ('}', Some('}')) => {
                out.write_str(&template[literal_start..idx])?;
                out.write_char(c)?;
                chars.next();
                literal_start = idx + 2;
            }
            ('{', Some('}')) => {
                out.write_str(&template[literal_start..idx])?;
                match remaining.next() {
                    Some(arg) => write!(out, "{}", arg)?,
                    None => out.write_str(MISSING_MARKER)?,
                }
                chars.next();
                literal_start = idx + 2;
            }
            _ => {}
        }
    }
    out.write_str(&template[literal_start..])?;

    let mut extra = remaining.peekable();
    if extra.peek().is_some() {
        out.write_str("%!(EXTRA ")?;
        for (i, arg) in extra.enumerate() {
            if i > 0 {
                out.write_str(", ")?;
            }
            write!(out, "{}", arg)?;
        }
        out.write_char(')')?;
    }
    Ok(())
}
