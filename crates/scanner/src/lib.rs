#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Concurrent namespace crawler: prescan, per-directory attempt-budget
//! retries, and a message-passing worker-pool master.
//!
//! # Overview
//!
//! This crate implements four of the eight components `spec.md` §2
//! names:
//!
//! - [`prescan`] — C4, validates reachability of configured roots before
//!   a full scan begins.
//! - [`task`] — C5, one directory listing with adaptive recursive→flat
//!   fallback and bounded retries.
//! - [`master`] — C6, the bounded worker pool and task queue that drives
//!   a scan to completion.
//! - [`path_converter`] — C7, the pure physical→logical path mapping.
//!
//! The remote transport itself (C3) lives in the sibling `listing` crate
//! as the [`listing::ListingClient`] trait this crate is generic over;
//! the output sinks this crate writes through are defined in [`sink`].

pub mod error;
pub mod master;
pub mod path_converter;
pub mod prescan;
pub mod sink;
pub mod state;
pub mod task;

pub use error::ScannerError;
pub use master::{MasterConfig, ScanOutcome, ScannerMaster, HEARTBEAT_INTERVAL};
pub use path_converter::PathConverter;
pub use prescan::{prescan_roots, GoodRoot};
pub use sink::{CountingHeartbeatSink, EmptyDirFile, EmptyDirSink, FileSink, HeartbeatSink, RecordingSink};
pub use state::ScanCounters;
pub use task::{execute, ScanTask, TaskOutcome};
