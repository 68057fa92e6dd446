use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use missing_link::ProgressReporter;
use std::sync::Mutex;
use std::time::Duration;

/// Spinner for scans and directory searches; totals are never known upfront.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn start_spinner(&self, message: String) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(80));
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.replace(pb) {
                old.finish_and_clear();
            }
        }
    }

    fn finish_spinner(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_scan_start(&self) {
        self.start_spinner("Scanning scene for missing files...".to_string());
    }

    fn on_scan_complete(&self, missing: usize, duration_secs: f64) {
        self.finish_spinner();
        eprintln!(
            "  {} Scan complete: {} missing in {:.2}s",
            "✓".green(),
            missing,
            duration_secs
        );
    }

    fn on_search_start(&self, root: &str) {
        self.start_spinner(format!("Searching {}...", root));
    }

    fn on_search_progress(&self, files_seen: usize, _current_path: &str) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_message(format!("Searching... {} files checked", files_seen));
            }
        }
    }

    fn on_search_complete(&self, files_seen: usize, duration_secs: f64) {
        self.finish_spinner();
        eprintln!(
            "  {} Search complete: {} files checked in {:.2}s",
            "✓".green(),
            files_seen,
            duration_secs
        );
    }
}
