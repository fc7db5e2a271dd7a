//! Progress indication and styled output for CLI commands.

use std::borrow::Cow;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar over a known number of items. Hidden when quiet.
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    pub fn new(total: u64, message: impl Into<Cow<'static, str>>, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(total)
        };
        if let Ok(bar_style) = ProgressStyle::with_template("{msg} [{bar:30.cyan/dim}] {pos}/{len}")
        {
            bar.set_style(bar_style.progress_chars("━╸━"));
        }
        bar.set_message(message);
        Self { bar }
    }

    pub fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// Print a success message to stderr.
pub fn success(message: &str) {
    eprintln!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), message);
}

/// Section title on stdout.
pub fn header(message: &str) {
    println!("{}", style(message).bold());
}

/// Dimmed text for inline use.
pub fn dim(text: &str) -> String {
    style(text).dim().to_string()
}
