//! Typed shapes of the stats JSON document's required keys (`spec.md` §6).
//!
//! These are plain `Serialize`/`Deserialize` structs, not themselves tied
//! to [`crate::StatsDocument`] — a caller builds one, serializes it, and
//! hands it to [`crate::StatsDocument::update_section`] (or `update` for
//! the top-level document) so the deep-merge persistence stays in one
//! place.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Overall status of a scan, per `spec.md` §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    /// A scan has been started but has not yet reached a terminal state.
    Started,
    /// The scan completed, with or without individual root failures
    /// (subject to `ignore_failed_directories`).
    Done,
    /// The scan failed outright.
    Failed,
}

/// `scanner.type`/`scanner.version` sub-object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerInfo {
    /// Always `"xrootd"`, naming the transport this scanner targets.
    #[serde(rename = "type")]
    pub kind: String,
    /// This crate's package version, for provenance in the stats file.
    pub version: String,
}

impl Default for ScannerInfo {
    fn default() -> Self {
        Self {
            kind: "xrootd".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Live `scanning` sub-object, present only while a root scan is in
/// flight.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanningSection {
    /// Root currently being scanned.
    pub root: Option<String>,
    /// Unix timestamp of the most recent heartbeat.
    pub heartbeat: Option<i64>,
    /// RFC3339 rendering of [`ScanningSection::heartbeat`].
    pub heartbeat_utc: Option<String>,
}

/// Completed statistics for one scanned root, per `spec.md` §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootReport {
    /// The root path.
    pub root: String,
    /// Whether this root was expected to contain files (per an optional
    /// external root-file-counts input).
    pub expected: bool,
    /// Files discovered, including ignored ones.
    pub files: u64,
    /// Directories discovered, including ignored ones.
    pub directories: u64,
    /// Directories proved empty.
    pub empty_directories: u64,
    /// Directories skipped by the ignore list.
    pub directories_ignored: u64,
    /// Files skipped by the ignore list.
    pub files_ignored: u64,
    /// Wall-clock seconds spent scanning this root.
    pub elapsed_time: f64,
    /// Total size of discovered files, in GB (`None` when sizes were not
    /// collected, or the root failed).
    pub total_size_gb: Option<f64>,
    /// Whether this root's scan failed outright (prescan failure, or
    /// `ignore_failed_directories == false` with a non-empty `GaveUp`).
    pub root_failed: bool,
    /// Top-level error, if `root_failed`.
    pub error: Option<String>,
    /// Directories that exhausted their retry budget, keyed by location.
    pub failed_subdirectories: BTreeMap<String, String>,
}

/// The top-level stats document shape (`my_stats` in the original),
/// written under whatever key the caller chooses (`spec.md` §6's
/// `-S`/`stats_key` option, defaulting to `"scanner"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// RSE (storage endpoint) name.
    pub rse: String,
    /// Scanner identity (`type`, `version`).
    pub scanner: ScannerInfo,
    /// Configured worker-pool size.
    pub parallel_scanners: usize,
    /// Server address.
    pub server: String,
    /// Server-root prefix.
    pub server_root: String,
    /// Completed per-root reports, in scan order.
    pub roots: Vec<RootReport>,
    /// Unix timestamp the scan started.
    pub start_time: f64,
    /// Unix timestamp the scan ended, once terminal.
    pub end_time: Option<f64>,
    /// Wall-clock seconds, once terminal.
    pub elapsed: Option<f64>,
    /// Current overall status.
    pub status: ScanStatus,
    /// In-flight root, if any.
    pub scanning: Option<ScanningSection>,
}

impl ScanReport {
    /// Builds the initial `"started"` report before any root has
    /// completed.
    #[must_use]
    pub fn started(rse: impl Into<String>, server: impl Into<String>, server_root: impl Into<String>, parallel_scanners: usize, start_time: f64) -> Self {
        Self {
            rse: rse.into(),
            scanner: ScannerInfo::default(),
            parallel_scanners,
            server: server.into(),
            server_root: server_root.into(),
            roots: Vec::new(),
            start_time,
            end_time: None,
            elapsed: None,
            status: ScanStatus::Started,
            scanning: None,
        }
    }

    /// Appends a completed root report.
    pub fn push_root(&mut self, report: RootReport) {
        self.roots.push(report);
    }

    /// Marks the scan terminal, choosing `done` vs `failed` from whether
    /// any root failed and whether any files were found at all, mirroring
    /// the original's `total_files == 0` fallback-to-failed rule.
    pub fn finish(&mut self, end_time: f64, any_root_failed: bool) {
        let total_files: u64 = self.roots.iter().map(|r| r.files).sum();
        self.status = if any_root_failed || total_files == 0 { ScanStatus::Failed } else { ScanStatus::Done };
        self.end_time = Some(end_time);
        self.elapsed = Some(end_time - self.start_time);
        self.scanning = None;
    }
}
