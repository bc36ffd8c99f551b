use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Print a success message: "ok: <message>"
pub fn ok(message: &str) {
    eprintln!("{} {}", style("ok:").green().bold(), message);
}

/// Print an error message: "error: <message>"
pub fn error(message: &str) {
    eprintln!("{} {}", style("error:").red().bold(), message);
}

/// Print a warning message: "warning: <message>"
pub fn warning(message: &str) {
    eprintln!("{} {}", style("warning:").yellow().bold(), message);
}

/// Print an indented info line (label: value).
pub fn info(label: &str, value: &str) {
    eprintln!("  {:<14}{}", style(label).bold(), value);
}

/// Spinner shown while a directory request is outstanding.
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
