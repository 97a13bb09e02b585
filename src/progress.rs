//! Progress reporting utilities using indicatif.
//!
//! Progress is observed, never required: the pipeline invokes an optional
//! [`ProgressCallback`] after each document completes, and correctness does
//! not depend on any callback being installed. The [`Progress`] struct is
//! the terminal implementation backed by indicatif.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress callback for the scan pipeline.
///
/// Implement this trait to receive progress updates during fingerprinting
/// and partitioning. All methods may be called from worker threads.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (e.g., "fingerprint", "partition")
    /// * `total` - Total number of items to process
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each document processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Current item number (1-based)
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when a document has been fingerprinted, providing its size.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Terminal progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn style(total: usize) -> ProgressStyle {
        if total == 0 {
            ProgressStyle::with_template("{spinner} {prefix} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
        } else {
            ProgressStyle::with_template(
                "{prefix:>12} [{bar:30}] {pos}/{len} ({eta}) {wide_msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ")
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }
        let bar = if total == 0 {
            let bar = self.multi.add(ProgressBar::new_spinner());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            self.multi.add(ProgressBar::new(total as u64))
        };
        bar.set_style(Self::style(total));
        bar.set_prefix(phase.to_string());
        *self.bar.lock().expect("progress bar lock poisoned") = Some(bar);
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }
        if let Some(bar) = self.bar.lock().expect("progress bar lock poisoned").as_ref() {
            bar.set_position(current as u64);
            bar.set_message(truncate_path(path));
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }
        if let Some(bar) = self
            .bar
            .lock()
            .expect("progress bar lock poisoned")
            .take()
        {
            bar.finish_with_message(format!("{phase} done"));
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }
        if let Some(bar) = self.bar.lock().expect("progress bar lock poisoned").as_ref() {
            bar.set_message(message.to_string());
        }
    }
}

/// Keep progress messages to a terminal-friendly width.
fn truncate_path(path: &str) -> String {
    const MAX: usize = 48;
    if path.chars().count() <= MAX {
        path.to_string()
    } else {
        let tail: String = path
            .chars()
            .rev()
            .take(MAX - 3)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("...{tail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_path() {
        assert_eq!(truncate_path("/a/b.pdf"), "/a/b.pdf");
    }

    #[test]
    fn test_truncate_long_path() {
        let long = format!("/scans/{}/page.pdf", "x".repeat(80));
        let truncated = truncate_path(&long);
        assert!(truncated.starts_with("..."));
        assert_eq!(truncated.chars().count(), 48);
        assert!(truncated.ends_with("page.pdf"));
    }

    #[test]
    fn test_quiet_progress_is_noop() {
        let progress = Progress::new(true);
        progress.on_phase_start("fingerprint", 10);
        progress.on_progress(1, "/a.pdf");
        progress.on_phase_end("fingerprint");
        assert!(progress.bar.lock().unwrap().is_none());
    }
}
