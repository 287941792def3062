#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! JSON statistics document: deep-merge updates and heartbeat persistence
//! (C8, `spec.md` §4.6/§6).
//!
//! # Overview
//!
//! [`StatsDocument`] is the general-purpose deep-merging JSON file this
//! crate is built around, grounded in `stats.py`'s `Stats` class. The
//! [`report`] module gives the stats file's required top-level shape
//! (`spec.md` §6) typed structs to serialize; [`ScanHeartbeat`] adapts a
//! `StatsDocument` to the scanner crate's `HeartbeatSink` interface so the
//! master can persist progress without depending on this crate directly.
//!
//! ```
//! use stats::{RootReport, ScanReport, StatsDocument};
//! use std::collections::BTreeMap;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = tempfile::tempdir()?;
//! let mut document = StatsDocument::new(dir.path().join("stats.json"));
//!
//! let mut report = ScanReport::started("example-rse", "xrootd.example.org", "/store", 4, 1_700_000_000.0);
//! report.push_root(RootReport {
//!     root: "/store/mc".to_string(),
//!     expected: true,
//!     files: 12,
//!     directories: 3,
//!     empty_directories: 0,
//!     directories_ignored: 0,
//!     files_ignored: 0,
//!     elapsed_time: 4.2,
//!     total_size_gb: Some(0.05),
//!     root_failed: false,
//!     error: None,
//!     failed_subdirectories: BTreeMap::new(),
//! });
//! report.finish(1_700_000_010.0, false);
//!
//! document.update_section("scanner", report)?;
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod error;
pub mod heartbeat;
pub mod report;

pub use document::StatsDocument;
pub use error::StatsError;
pub use heartbeat::ScanHeartbeat;
pub use report::{RootReport, ScanReport, ScannerInfo, ScanStatus, ScanningSection};
