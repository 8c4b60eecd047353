//! Spinner shown on stderr while IAM calls are in flight.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICK: Duration = Duration::from_millis(120);

/// Creates a ticking spinner. indicatif hides it when stderr is not a
/// terminal.
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();

    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }

    pb.set_message(msg.to_string());
    pb.enable_steady_tick(TICK);

    pb
}

/// Runs `work` behind a spinner and clears the spinner once it returns.
pub fn with_spinner<T>(msg: &str, work: impl FnOnce() -> T) -> T {
    let pb = create_spinner(msg);
    let result = work();
    pb.finish_and_clear();
    result
}
