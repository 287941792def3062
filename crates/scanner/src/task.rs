//! Scanner task: one directory listing, with adaptive recursive→flat
//! fallback and bounded retries.
//!
//! # Design
//!
//! A [`ScanTask`] is a value type carrying its own attempt budget —
//! re-queuing it (see [`crate::master::ScannerMaster`]) is publishing an
//! updated value, never mutating a shared object, per `spec.md` §9's
//! "task representation" design note. [`execute`] runs exactly one
//! attempt and returns a [`TaskOutcome`] that tells the caller whether to
//! deliver results, retry with the returned (budget-decremented) task, or
//! give up.

use std::collections::HashSet;
use std::time::Duration;

use listing::{CancelToken, FileEntry, ListingClient, Status};

use crate::path_converter::canonicalize;

/// A unit of scan work: list one directory, with its own attempt budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTask {
    /// Physical path to list, relative to the client's server root.
    pub location: String,
    /// Whether the most recently attempted listing was recursive.
    pub was_recursive: bool,
    /// Remaining recursive attempts, in `0..=3`.
    pub rec_attempts_left: u8,
    /// Remaining flat attempts, in `0..=3`.
    pub flat_attempts_left: u8,
    /// Set at construction from `¬recursive_requested`; never changes.
    pub forced_flat: bool,
    /// Whether this task's own location should be reported if found to
    /// be empty. `false` only for the task priming the scan root.
    pub report_empty_top: bool,
}

const MAX_ATTEMPTS_REC: u8 = 3;
const MAX_ATTEMPTS_FLAT: u8 = 3;

impl ScanTask {
    /// Creates a new task for `location`.
    ///
    /// `recursive_requested` sets the initial recursive attempt budget to
    /// 3 (and `forced_flat` to `false`); when `false` the task never
    /// attempts a recursive listing and the flat budget is its only
    /// budget, per `spec.md` §3's scanner-task-state invariants.
    #[must_use]
    pub fn new(location: impl Into<String>, recursive_requested: bool, report_empty_top: bool) -> Self {
        Self {
            location: canonicalize(&location.into()),
            was_recursive: false,
            rec_attempts_left: if recursive_requested { MAX_ATTEMPTS_REC } else { 0 },
            flat_attempts_left: MAX_ATTEMPTS_FLAT,
            forced_flat: !recursive_requested,
            report_empty_top,
        }
    }

    /// Returns whether the next attempt would be recursive (`Some(true)`),
    /// flat (`Some(false)`), or whether both budgets are exhausted
    /// (`None`, meaning the task belongs in `GaveUp`).
    #[must_use]
    pub fn next_mode(&self) -> Option<bool> {
        if !self.forced_flat && self.rec_attempts_left > 0 {
            Some(true)
        } else if self.flat_attempts_left > 0 {
            Some(false)
        } else {
            None
        }
    }

    /// Total attempts this task may still make, i.e. `rec_attempts_left +
    /// flat_attempts_left`.
    #[must_use]
    pub fn remaining_budget(&self) -> u8 {
        self.rec_attempts_left + self.flat_attempts_left
    }
}

/// Outcome of one [`execute`] attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The listing succeeded; here are the results.
    Done {
        /// The task's location.
        location: String,
        /// Directory names discovered, relative to the task's location.
        dirs: Vec<String>,
        /// Files discovered, relative to the task's location.
        files: Vec<FileEntry>,
        /// Directories beneath the task's location proved empty by this
        /// listing (see `spec.md` §3's empty-directory-set rule).
        empty_dirs: Vec<String>,
        /// Whether this attempt was recursive.
        was_recursive: bool,
    },
    /// The listing failed but budget remains; re-enqueue the returned
    /// (budget-decremented) task.
    Retry(ScanTask),
    /// Both attempt budgets are exhausted, or the task was cancelled.
    GaveUp {
        /// The task's location.
        location: String,
        /// Human-readable reason for the give-up.
        reason: String,
    },
}

/// Runs one listing attempt for `task` against `client`.
///
/// `compute_empty_dirs` gates the §3 empty-directory-set computation;
/// when it is `false` [`TaskOutcome::Done::empty_dirs`] is always empty.
#[must_use]
pub fn execute(mut task: ScanTask, client: &dyn ListingClient, timeout: Duration, include_sizes: bool, compute_empty_dirs: bool, cancel: &CancelToken) -> TaskOutcome {
    let Some(recursive) = task.next_mode() else {
        return TaskOutcome::GaveUp {
            location: task.location,
            reason: "no attempt budget remaining".to_string(),
        };
    };
    task.was_recursive = recursive;

    let result = client.ls(&task.location, recursive, include_sizes, timeout, cancel);

    match result.status {
        Status::Ok => {
            let empty_dirs = if compute_empty_dirs {
                empty_dir_set(&task.location, &result.dirs, &result.files, recursive, task.report_empty_top)
            } else {
                Vec::new()
            };
            TaskOutcome::Done {
                location: task.location,
                dirs: result.dirs,
                files: result.files,
                empty_dirs,
                was_recursive: recursive,
            }
        }
        Status::TimedOut | Status::Failed => {
            if result.reason.as_deref() == Some("killed") {
                return TaskOutcome::GaveUp {
                    location: task.location,
                    reason: "killed".to_string(),
                };
            }
            if recursive {
                task.rec_attempts_left -= 1;
            } else {
                task.flat_attempts_left -= 1;
            }
            if task.next_mode().is_some() {
                TaskOutcome::Retry(task)
            } else {
                TaskOutcome::GaveUp {
                    location: task.location,
                    reason: result.reason.unwrap_or_else(|| "listing failed".to_string()),
                }
            }
        }
    }
}

/// Computes the set of directories beneath `location` that a listing
/// proved contain no files at any depth, per `spec.md` §3.
///
/// `dirs`/`files` are paths relative to `location` as returned by
/// [`listing::ListingClient::ls`] (bare names for a flat listing, full
/// relative paths for a recursive one). `report_empty_top` controls
/// whether `location` itself is included when it qualifies.
fn empty_dir_set(location: &str, dirs: &[String], files: &[FileEntry], recursive: bool, report_empty_top: bool) -> Vec<String> {
    let join = |rel: &str| -> String { canonicalize(&format!("{}/{rel}", location.trim_end_matches('/'))) };

    // A flat listing only proves its immediate children exist, never that
    // any of them is empty — that requires having seen their own contents,
    // which only a recursive listing provides.
    let mut empty: HashSet<String> = if recursive {
        dirs.iter().map(|d| join(d)).collect()
    } else {
        HashSet::new()
    };
    if recursive {
        for file in files {
            let mut dirpath = parent_of(&join(&file.name));
            loop {
                if dirpath.is_empty() || dirpath == "/" {
                    break;
                }
                if empty.remove(&dirpath) {
                    dirpath = parent_of(&dirpath);
                } else {
                    break;
                }
            }
        }
    }

    if (recursive || dirs.is_empty()) && files.is_empty() {
        empty.insert(location.to_string());
    }

    if !report_empty_top {
        empty.remove(location);
    }

    empty.into_iter().collect()
}

fn parent_of(path: &str) -> String {
    match path.rsplit_once('/') {
        None => String::new(),
        Some(("", _)) => "/".to_string(),
        Some((prefix, _)) => prefix.to_string(),
    }
}
