//! Abstract sink for status messages and progress ticks. The scheduler and
//! its orchestrators hold no assumption about whether the sink is a TTY, a
//! log, or a no-op.

use std::io::Write;
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

/// Status-message and progress-tick sink. All methods are synchronous: a
/// progress callback runs on the calling worker and must not suspend.
pub trait ProgressReporter: Send + Sync {
    /// Emits a free-form status message.
    fn message(&self, text: &str);

    /// Prompts for and returns a line of input. Concrete non-interactive
    /// sinks (e.g. [`NullReporter`]) return an empty string.
    fn input(&self, prompt: &str) -> String;

    /// Begins a progress display for `total` units of work.
    fn start_progress(&self, total: u64);

    /// Advances the progress display by `delta` units.
    fn progress(&self, delta: u64);

    /// Ends the progress display.
    fn stop_progress(&self);
}

/// A no-op reporter: every call is silently discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn message(&self, _text: &str) {}
    fn input(&self, _prompt: &str) -> String {
        String::new()
    }
    fn start_progress(&self, _total: u64) {}
    fn progress(&self, _delta: u64) {}
    fn stop_progress(&self) {}
}

/// A reporter backed by a live terminal progress bar, for interactive CLI
/// use.
pub struct ConsoleReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }
}

impl ProgressReporter for ConsoleReporter {
    fn message(&self, text: &str) {
        let _ = writeln!(std::io::stdout(), "{text}");
    }

    fn input(&self, prompt: &str) -> String {
        print!("{prompt}");
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
        line.trim_end().to_string()
    }

    fn start_progress(&self, total: u64) {
        let bar = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} ({eta})",
        ) {
            bar.set_style(style);
        }
        *self.bar.lock().expect("progress bar mutex poisoned") = Some(bar);
    }

    fn progress(&self, delta: u64) {
        if let Some(bar) = self.bar.lock().expect("progress bar mutex poisoned").as_ref() {
            bar.inc(delta);
        }
    }

    fn stop_progress(&self) {
        if let Some(bar) = self.bar.lock().expect("progress bar mutex poisoned").take() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_reporter_never_panics() {
        let reporter = NullReporter;
        reporter.message("hi");
        reporter.start_progress(10);
        reporter.progress(1);
        reporter.stop_progress();
        assert_eq!(reporter.input("prompt"), "");
    }

    #[test]
    fn console_reporter_progress_without_start_is_a_no_op() {
        let reporter = ConsoleReporter::new();
        reporter.progress(1);
    }
}
