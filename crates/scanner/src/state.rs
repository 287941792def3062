//! Per-root scan state owned by the master (`spec.md` §3).

use std::collections::BTreeMap;

/// Mutable counters the scanner master owns for one root's scan.
///
/// Invariant: `n_scanned <= n_to_scan` at all times; `n_scanned ==
/// n_to_scan` exactly when the queue is empty and no task is in flight
/// (`spec.md` §3).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanCounters {
    /// Total directories discovered so far, including the root.
    pub n_to_scan: u64,
    /// Directories whose scan has terminally resolved (done or given up).
    pub n_scanned: u64,
    /// Files discovered (including ignored ones).
    pub n_files: u64,
    /// Directories discovered (including ignored ones).
    pub n_directories: u64,
    /// Directories proved empty.
    pub n_empty_dirs: u64,
    /// Files skipped because they matched the ignore list.
    pub ignored_files: u64,
    /// Directories skipped (and not recursed into) because they matched
    /// the ignore list.
    pub ignored_dirs: u64,
    /// Total bytes across all non-ignored files, when size collection is
    /// enabled.
    pub total_size: u64,
    /// Directories that exhausted their retry budget, keyed by location,
    /// valued by the last error observed.
    pub gave_up: BTreeMap<String, String>,
    /// Set when a condition forces the overall scan to be reported as
    /// failed (distinct from individual give-ups, which only fail the
    /// scan when `ignore_failed_directories` is `false`).
    pub failed: bool,
}

impl ScanCounters {
    /// An extrapolated total file-count estimate, `n_files * n_to_scan /
    /// n_scanned`, or `0` before any directory has been scanned.
    #[must_use]
    pub fn estimated_total_files(&self) -> u64 {
        if self.n_scanned == 0 {
            0
        } else {
            self.n_files * self.n_to_scan / self.n_scanned
        }
    }

    /// Returns `true` once every discovered directory has terminally
    /// resolved.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.n_scanned >= self.n_to_scan
    }
}
