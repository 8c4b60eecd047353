//! Terminal styling for roleclone output.
//!
//! Colors are on by default and switched off by `--no-color`,
//! `[output] color = false` or a non-empty `NO_COLOR` variable.

use std::sync::atomic::{AtomicBool, Ordering};

pub mod colors;
pub mod output;
pub mod spinner;
pub mod table;

pub use output::*;
pub use spinner::*;
pub use table::*;

static NO_COLOR: AtomicBool = AtomicBool::new(false);

pub fn set_no_color(value: bool) {
    NO_COLOR.store(value, Ordering::SeqCst);
}

pub fn no_color() -> bool {
    NO_COLOR.load(Ordering::SeqCst)
}

/// True when `NO_COLOR` is set to a non-empty value.
pub fn no_color_requested_by_env() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}
