/// Outcome of a single `ls` call against a storage endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The directory was listed successfully.
    Ok,
    /// The call did not complete within the configured timeout.
    TimedOut,
    /// The endpoint reported a failure other than a timeout (missing
    /// directory, permission denied, connection reset, ...).
    Failed,
}

/// A single file found while listing a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// File name, relative to the listed directory (no path separators).
    pub name: String,
    /// File size in bytes, present only when the caller asked for sizes.
    pub size: Option<u64>,
}

/// Result of listing one directory.
///
/// A non-[`Status::Ok`] result is not an error in the [`Result`] sense —
/// it's the normal, expected outcome of talking to storage over a
/// network, and the scanner's attempt-budget state machine decides how to
/// react to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListResult {
    /// Outcome of the call.
    pub status: Status,
    /// Human-readable detail when `status` is not [`Status::Ok`].
    pub reason: Option<String>,
    /// Subdirectory names found directly under the listed path.
    pub dirs: Vec<String>,
    /// Files found directly under the listed path. When the call was
    /// recursive, this also includes files found in subdirectories,
    /// reported with paths relative to the listed path.
    pub files: Vec<FileEntry>,
}

impl ListResult {
    /// Builds a successful result.
    #[must_use]
    pub fn ok(dirs: Vec<String>, files: Vec<FileEntry>) -> Self {
        Self {
            status: Status::Ok,
            reason: None,
            dirs,
            files,
        }
    }

    /// Builds a timed-out result.
    #[must_use]
    pub fn timed_out(reason: impl Into<String>) -> Self {
        Self {
            status: Status::TimedOut,
            reason: Some(reason.into()),
            dirs: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Builds a failed result.
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: Status::Failed,
            reason: Some(reason.into()),
            dirs: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Returns `true` if `status` is [`Status::Ok`].
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self.status, Status::Ok)
    }
}
