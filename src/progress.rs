/// Trait for reporting progress of scans and directory searches.
///
/// CLI implements with an indicatif spinner; tests use `SilentReporter`.
/// All methods have default no-op implementations.
pub trait ProgressReporter {
    fn on_scan_start(&self) {}
    fn on_scan_complete(&self, _missing: usize, _duration_secs: f64) {}
    fn on_search_start(&self, _root: &str) {}
    fn on_search_progress(&self, _files_seen: usize, _current_path: &str) {}
    fn on_search_complete(&self, _files_seen: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
