use std::io;
use std::path::PathBuf;

/// Errors raised while creating, opening, writing, or reading a
/// partitioned list.
#[derive(Debug, thiserror::Error)]
pub enum PartListError {
    /// A partition file could not be created for writing.
    #[error("failed to create partition file {path}: {source}")]
    Create {
        /// Partition file that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A partition file could not be opened for reading.
    #[error("failed to open partition file {path}: {source}")]
    Open {
        /// Partition file that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// No files matched `<prefix>.*` when opening a list for reading.
    #[error("no partition files found matching prefix {prefix}.*")]
    NoPartitions {
        /// Prefix that was searched.
        prefix: PathBuf,
    },
    /// Writing an item to a partition file failed.
    #[error("failed to write to partition file {path}: {source}")]
    Write {
        /// Partition file the write targeted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Reading an item from a partition file failed.
    #[error("failed to read partition file {path}: {source}")]
    Read {
        /// Partition file the read targeted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Flushing or closing a partition file failed.
    #[error("failed to close partition file {path}: {source}")]
    Close {
        /// Partition file that failed to close cleanly.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}
