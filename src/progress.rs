use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Create a spinner for indeterminate operations
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Create a progress bar for the compile loop, drawn to stdout
pub fn compile_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::stdout());
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:20.cyan/dim}] {pos}/{len}")
            .unwrap()
            .progress_chars("━━─"),
    );
    pb
}

/// Integer percentage of `done` out of `total`, truncated
pub fn percentage(done: usize, total: usize) -> u64 {
    if total == 0 {
        return 100;
    }
    (done as u64 * 100) / total as u64
}

/// Live "Compiled N% with M errors" line, redrawn only when the percentage changes
pub struct ProgressReporter {
    bar: ProgressBar,
    last: Option<u64>,
}

impl ProgressReporter {
    pub fn new(total: usize, quiet: bool) -> Self {
        if quiet || total == 0 {
            return Self::hidden();
        }
        Self {
            bar: compile_progress_bar(total as u64),
            last: None,
        }
    }

    /// Reporter that never draws anything
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            last: None,
        }
    }

    /// Record progress; returns the new percentage when the status line changed
    pub fn report(&mut self, processed: usize, total: usize, errors: usize) -> Option<u64> {
        let pct = percentage(processed, total);
        if self.last == Some(pct) {
            return None;
        }
        self.last = Some(pct);
        self.bar.set_position(processed as u64);
        self.bar
            .set_message(format!("Compiled {}% with {} errors", pct, errors));
        Some(pct)
    }

    /// Print a warning to stderr, even while the status line is live
    pub fn warn(&self, msg: &str) {
        self.bar.suspend(|| eprintln!("{}", msg));
    }

    pub fn finish(self) {
        self.bar.finish();
    }
}
