//! Output sinks the scanner master writes discovered paths to.
//!
//! # Design
//!
//! The master doesn't know or care whether its file listing lands in a
//! partitioned list ([`partlist`], C1) or its empty-directory list in a
//! single flat (optionally gzip) text file — it writes through
//! [`FileSink`]/[`EmptyDirSink`] trait objects so tests can swap in an
//! in-memory sink with no filesystem at all.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use flate2::write::GzEncoder;
use flate2::Compression;
use partlist::PartitionedListWriter;

/// Destination for discovered file paths.
pub trait FileSink: Send + Sync {
    /// Appends `logical_path` to the listing.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message on I/O failure.
    fn emit(&self, logical_path: &str) -> Result<(), String>;
}

/// Destination for discovered empty-directory paths.
pub trait EmptyDirSink: Send + Sync {
    /// Appends `logical_path` to the empty-directory list.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message on I/O failure.
    fn emit(&self, logical_path: &str) -> Result<(), String>;
}

impl FileSink for Mutex<PartitionedListWriter> {
    fn emit(&self, logical_path: &str) -> Result<(), String> {
        self.lock().expect("file sink mutex poisoned").add(logical_path).map_err(|e| e.to_string())
    }
}

/// Single flat text file, one path per line, optionally gzip-compressed.
///
/// Matches `spec.md` §6's empty-directory-list output format (unlike the
/// file listing, this is never partitioned).
pub struct EmptyDirFile {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
}

impl EmptyDirFile {
    /// Creates (truncating) the empty-directory output file at `path`,
    /// compressing with gzip when `compressed` is `true`.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if the file cannot be created.
    pub fn create(path: impl AsRef<Path>, compressed: bool) -> io::Result<Self> {
        let file = File::create(path)?;
        let writer: Box<dyn Write + Send> = if compressed {
            Box::new(GzEncoder::new(file, Compression::default()))
        } else {
            Box::new(file)
        };
        Ok(Self {
            writer: Mutex::new(BufWriter::new(writer)),
        })
    }

    /// Flushes and closes the underlying file.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if the final flush fails.
    pub fn close(&self) -> io::Result<()> {
        self.writer.lock().expect("empty-dir sink mutex poisoned").flush()
    }
}

impl EmptyDirSink for EmptyDirFile {
    fn emit(&self, logical_path: &str) -> Result<(), String> {
        let mut writer = self.writer.lock().expect("empty-dir sink mutex poisoned");
        writeln!(writer, "{logical_path}").map_err(|e| e.to_string())
    }
}

/// In-memory [`FileSink`]/[`EmptyDirSink`] used by scanner master tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    items: Mutex<Vec<String>>,
}

impl RecordingSink {
    /// Builds an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every path emitted so far, in emission order.
    #[must_use]
    pub fn items(&self) -> Vec<String> {
        self.items.lock().unwrap().clone()
    }
}

impl FileSink for RecordingSink {
    fn emit(&self, logical_path: &str) -> Result<(), String> {
        self.items.lock().unwrap().push(logical_path.to_string());
        Ok(())
    }
}

impl EmptyDirSink for RecordingSink {
    fn emit(&self, logical_path: &str) -> Result<(), String> {
        self.items.lock().unwrap().push(logical_path.to_string());
        Ok(())
    }
}

/// Time-stamped progress persistence (C8).
///
/// Implemented by the `stats` crate's JSON stats document; kept as a
/// trait here so the scanner master never depends on `stats` (or any
/// concrete serialization format) directly.
pub trait HeartbeatSink: Send + Sync {
    /// Records that the scan is still making progress at the current
    /// time.
    fn record_heartbeat(&self);
}

/// [`HeartbeatSink`] that only counts how many times it was called — used
/// by scanner master tests that care about heartbeat cadence but not
/// persistence format.
#[derive(Debug, Default)]
pub struct CountingHeartbeatSink {
    count: Mutex<u64>,
}

impl CountingHeartbeatSink {
    /// Builds a sink with a zero count.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times [`HeartbeatSink::record_heartbeat`] was called.
    #[must_use]
    pub fn count(&self) -> u64 {
        *self.count.lock().unwrap()
    }
}

impl HeartbeatSink for CountingHeartbeatSink {
    fn record_heartbeat(&self) {
        *self.count.lock().unwrap() += 1;
    }
}
