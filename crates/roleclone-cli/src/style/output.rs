//! Status lines for command output.
//!
//! The `*_line` helpers return the styled text so commands can assemble
//! their whole output before writing it.

use super::colors::SemanticStyle;

/// `✓ msg`
pub fn success_line(msg: &str) -> String {
    format!("{} {}", "✓".success(), msg)
}

/// `⚠ msg`, used for policies that could not be replicated.
pub fn warn_line(msg: &str) -> String {
    format!("{} {}", "⚠".warning(), msg)
}

/// `→ msg`, dimmed.
pub fn hint_line(msg: &str) -> String {
    format!("{} {}", "→".muted(), msg.muted())
}

/// `✗ msg`
pub fn error_line(msg: &str) -> String {
    format!("{} {}", "✗".error(), msg)
}

/// Prints a fatal error to stderr.
pub fn print_error(msg: &str) {
    eprintln!("{}", error_line(msg));
}
