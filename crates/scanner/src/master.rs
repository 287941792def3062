//! Scanner master (C6): owns the bounded worker pool and task queue,
//! aggregates counters, emits heartbeats and progress, and terminates on
//! queue exhaustion.
//!
//! # Design
//!
//! Implements the message-passing aggregator `spec.md` §9 calls out as
//! preferred "in languages with cheap channels": a fixed-size pool of
//! worker threads pulls [`ScanTask`]s off an unbounded `crossbeam-channel`
//! and posts [`TaskOutcome`]s back to a single-consumer channel the master
//! itself drains in its own loop, so every counter mutation, `GaveUp`
//! insertion, and sink write happens on exactly one thread with no lock
//! needed for master state. Worker concurrency is bounded by thread count
//! (`max_scanners`), not channel capacity.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use listing::{CancelToken, ListingClient};

use crate::path_converter::{canonicalize, PathConverter};
use crate::sink::{EmptyDirSink, FileSink, HeartbeatSink};
use crate::state::ScanCounters;
use crate::task::{execute, ScanTask, TaskOutcome};

/// Interval at which the master persists a heartbeat, per `spec.md` §4.6.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for one root's scan, independent of transport or sinks.
#[derive(Debug, Clone)]
pub struct MasterConfig {
    /// Size of the worker pool; at most this many `ls` calls run at once.
    pub max_scanners: usize,
    /// Timeout passed to every `ls` call.
    pub timeout: Duration,
    /// Whether to request file sizes.
    pub include_sizes: bool,
    /// Minimum depth (from the scan root) at which a directory may be
    /// listed recursively.
    pub recursive_threshold: u32,
    /// Stop discovering new directory tasks once `n_files` reaches this
    /// bound (debugging knob, per `spec.md` §4.6/original `-M`).
    pub max_files: Option<u64>,
    /// Logical paths (and their subtrees) to skip.
    pub ignore_list: Vec<String>,
    /// Whether to compute the empty-directory set.
    pub compute_empty_dirs: bool,
    /// Whether to render an interactive progress bar.
    pub display_progress: bool,
}

/// Final result of running a [`ScannerMaster`] to completion.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Final counters for the root.
    pub counters: ScanCounters,
    /// Whether the scan was cancelled before the queue drained.
    pub cancelled: bool,
}

/// Owns the worker pool and task queue for one root's scan.
pub struct ScannerMaster<C: ListingClient + 'static> {
    client: Arc<C>,
    path_converter: PathConverter,
    physical_root: String,
    logical_root: String,
    config: MasterConfig,
    file_sink: Arc<dyn FileSink>,
    empty_dir_sink: Option<Arc<dyn EmptyDirSink>>,
    heartbeat_sink: Option<Arc<dyn HeartbeatSink>>,
    cancel: CancelToken,
}

impl<C: ListingClient + 'static> ScannerMaster<C> {
    /// Builds a master for one root.
    #[must_use]
    pub fn new(
        client: Arc<C>,
        path_converter: PathConverter,
        root: impl Into<String>,
        config: MasterConfig,
        file_sink: Arc<dyn FileSink>,
        empty_dir_sink: Option<Arc<dyn EmptyDirSink>>,
        heartbeat_sink: Option<Arc<dyn HeartbeatSink>>,
    ) -> Self {
        let physical_root = canonicalize(&root.into());
        let logical_root = path_converter.logical(&physical_root);
        Self {
            client,
            path_converter,
            physical_root,
            logical_root,
            config,
            file_sink,
            empty_dir_sink,
            heartbeat_sink,
            cancel: CancelToken::new(),
        }
    }

    /// Returns a cloneable handle the caller can use to request
    /// cancellation of an in-flight scan (`spec.md` §5's shutdown path).
    #[must_use]
    pub fn cancel_handle(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Runs the scan to completion: primes the queue with the root,
    /// drains it, and returns the final counters.
    #[must_use]
    pub fn run(self) -> ScanOutcome {
        let worker_count = self.config.max_scanners.max(1);
        let (work_tx, work_rx) = crossbeam_channel::unbounded::<ScanTask>();
        let (completion_tx, completion_rx) = crossbeam_channel::unbounded::<TaskOutcome>();

        let mut handles = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let work_rx = work_rx.clone();
            let completion_tx = completion_tx.clone();
            let client = Arc::clone(&self.client);
            let cancel = self.cancel.clone();
            let timeout = self.config.timeout;
            let include_sizes = self.config.include_sizes;
            let compute_empty_dirs = self.config.compute_empty_dirs;
            handles.push(std::thread::spawn(move || {
                while let Ok(task) = work_rx.recv() {
                    let outcome = execute(task, client.as_ref(), timeout, include_sizes, compute_empty_dirs, &cancel);
                    if completion_tx.send(outcome).is_err() {
                        break;
                    }
                }
            }));
        }
        drop(completion_tx);
        drop(work_rx);

        let progress = self.config.display_progress.then(build_progress_bar);

        let mut counters = ScanCounters::default();
        let mut pending: u64 = 0;

        let root_recursive = self.config.recursive_threshold == 0;
        let root_task = ScanTask::new(self.physical_root.clone(), root_recursive, false);
        counters.n_to_scan = 1;
        pending += 1;
        work_tx.send(root_task).expect("worker pool alive at scan start");

        let ticker = crossbeam_channel::tick(HEARTBEAT_INTERVAL);
        let mut last_heartbeat = Instant::now();

        while pending > 0 {
            crossbeam_channel::select! {
                recv(completion_rx) -> outcome => {
                    let outcome = outcome.expect("worker pool alive while tasks are pending");
                    self.handle_outcome(outcome, &mut counters, &mut pending, &work_tx, progress.as_ref());
                }
                recv(ticker) -> _ => {
                    if let Some(sink) = self.heartbeat_sink.as_deref() {
                        if last_heartbeat.elapsed() >= HEARTBEAT_INTERVAL {
                            sink.record_heartbeat();
                            last_heartbeat = Instant::now();
                        }
                    }
                }
            }
            if self.cancel.is_cancelled() {
                counters.failed = true;
                break;
            }
        }

        drop(work_tx);
        for handle in handles {
            let _ = handle.join();
        }
        if let Some(bar) = &progress {
            bar.finish_and_clear();
        }

        ScanOutcome {
            counters,
            cancelled: self.cancel.is_cancelled(),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn handle_outcome(&self, outcome: TaskOutcome, counters: &mut ScanCounters, pending: &mut u64, work_tx: &crossbeam_channel::Sender<ScanTask>, progress: Option<&ProgressBar>) {
        match outcome {
            TaskOutcome::Retry(task) => {
                let _ = work_tx.send(task);
            }
            TaskOutcome::GaveUp { location, reason } => {
                *pending -= 1;
                counters.n_scanned += 1;
                counters.gave_up.insert(location, reason);
                report_progress(progress, counters);
            }
            TaskOutcome::Done {
                location,
                mut dirs,
                mut files,
                empty_dirs,
                was_recursive,
            } => {
                if was_recursive && dirs.is_empty() && files.is_empty() {
                    let confirm = self.client.ls(&location, false, self.config.include_sizes, self.config.timeout, &self.cancel);
                    if !confirm.is_ok() || !confirm.dirs.is_empty() || !confirm.files.is_empty() {
                        let reason = if confirm.is_ok() {
                            format!("recursive scan returned empty for non-empty location {location}, dirs: {}, files: {}", confirm.dirs.len(), confirm.files.len())
                        } else {
                            confirm.reason.unwrap_or_else(|| "confirmatory flat listing failed".to_string())
                        };
                        *pending -= 1;
                        counters.n_scanned += 1;
                        counters.gave_up.insert(location, reason);
                        report_progress(progress, counters);
                        return;
                    }
                    dirs = confirm.dirs;
                    files = confirm.files;
                }

                *pending -= 1;
                counters.n_scanned += 1;

                for dir in &dirs {
                    counters.n_directories += 1;
                    let abs = join(&location, dir);
                    let logpath = self.path_converter.logical(&abs);
                    if is_ignored(&self.config.ignore_list, &logpath) {
                        counters.ignored_dirs += 1;
                        continue;
                    }
                    if !was_recursive {
                        let within_budget = self.config.max_files.is_none_or(|max| counters.n_files < max);
                        if within_budget {
                            let depth = relative_depth(&self.logical_root, &logpath);
                            let allow_recursive = depth >= self.config.recursive_threshold;
                            let task = ScanTask::new(abs, allow_recursive, true);
                            counters.n_to_scan += 1;
                            *pending += 1;
                            let _ = work_tx.send(task);
                        }
                    }
                }

                for file in &files {
                    counters.n_files += 1;
                    let abs = join(&location, &file.name);
                    let logpath = self.path_converter.logical(&abs);
                    if is_ignored(&self.config.ignore_list, &logpath) {
                        counters.ignored_files += 1;
                        continue;
                    }
                    if let Err(err) = self.file_sink.emit(&logpath) {
                        tracing::error!(error = %err, path = %logpath, "failed to write discovered file");
                        counters.failed = true;
                    } else if let Some(size) = file.size {
                        counters.total_size += size;
                    }
                }

                if !empty_dirs.is_empty() {
                    counters.n_empty_dirs += empty_dirs.len() as u64;
                    if let Some(sink) = self.empty_dir_sink.as_deref() {
                        for abs in &empty_dirs {
                            let logpath = self.path_converter.logical(abs);
                            if logpath == self.logical_root {
                                continue;
                            }
                            if let Err(err) = sink.emit(&logpath) {
                                tracing::error!(error = %err, path = %logpath, "failed to write empty directory");
                                counters.failed = true;
                            }
                        }
                    }
                }

                report_progress(progress, counters);
            }
        }
    }
}

fn join(location: &str, rel: &str) -> String {
    canonicalize(&format!("{}/{rel}", location.trim_end_matches('/')))
}

fn relative_depth(logical_root: &str, logpath: &str) -> u32 {
    let rel = logpath.strip_prefix(logical_root).unwrap_or(logpath);
    rel.split('/').filter(|s| !s.is_empty()).count() as u32
}

/// Returns `true` if `logpath` matches `ignore_list`: an exact match, or
/// a path beneath one of its entries (`spec.md` §4.6).
fn is_ignored(ignore_list: &[String], logpath: &str) -> bool {
    ignore_list.iter().any(|entry| logpath == entry || logpath.starts_with(&format!("{entry}/")))
}

fn build_progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(1);
    if let Ok(style) = ProgressStyle::with_template("{spinner} {pos}/{len} dirs ({msg})") {
        bar.set_style(style);
    }
    bar
}

fn report_progress(progress: Option<&ProgressBar>, counters: &ScanCounters) {
    let Some(bar) = progress else { return };
    bar.set_length(counters.n_to_scan);
    bar.set_position(counters.n_scanned);
    bar.set_message(format!(
        "files={} dirs={} empty={} est={}",
        counters.n_files,
        counters.n_directories,
        counters.n_empty_dirs,
        counters.estimated_total_files()
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;
    use listing::{MockDir, MockListingClient, Scripted};

    fn base_config() -> MasterConfig {
        MasterConfig {
            max_scanners: 2,
            timeout: Duration::from_secs(1),
            include_sizes: true,
            recursive_threshold: 0,
            max_files: None,
            ignore_list: Vec::new(),
            compute_empty_dirs: true,
            display_progress: false,
        }
    }

    fn small_tree() -> MockListingClient {
        let mut client = MockListingClient::new();
        client.insert(
            "/store",
            MockDir {
                dirs: vec!["a".to_string(), "b".to_string()],
                files: vec![],
            },
        );
        client.insert(
            "/store/a",
            MockDir {
                dirs: vec![],
                files: vec![("x.root".to_string(), 100), ("y.root".to_string(), 200)],
            },
        );
        client.insert(
            "/store/b",
            MockDir {
                dirs: vec!["empty".to_string()],
                files: vec![],
            },
        );
        client.insert("/store/b/empty", MockDir::default());
        client
    }

    #[test]
    fn full_scan_discovers_all_files_and_empty_dirs() {
        let client = Arc::new(small_tree());
        let path_converter = PathConverter::new("", "", "", "/store");
        let file_sink = Arc::new(RecordingSink::new());
        let empty_dir_sink = Arc::new(RecordingSink::new());

        let master = ScannerMaster::new(
            Arc::clone(&client),
            path_converter,
            "/store",
            base_config(),
            Arc::clone(&file_sink) as Arc<dyn FileSink>,
            Some(Arc::clone(&empty_dir_sink) as Arc<dyn EmptyDirSink>),
            None,
        );

        let outcome = master.run();
        assert!(!outcome.cancelled);
        assert!(outcome.counters.gave_up.is_empty());
        assert_eq!(outcome.counters.n_files, 2);
        assert_eq!(outcome.counters.n_directories, 3);
        assert_eq!(outcome.counters.total_size, 300);

        let mut files = file_sink.items();
        files.sort();
        assert_eq!(files, vec!["/store/a/x.root".to_string(), "/store/a/y.root".to_string()]);

        let mut empty_dirs = empty_dir_sink.items();
        empty_dirs.sort();
        assert_eq!(empty_dirs, vec!["/store/b".to_string(), "/store/b/empty".to_string()]);
    }

    #[test]
    fn ignored_subtree_is_never_recursed_into() {
        let client = Arc::new(small_tree());
        let path_converter = PathConverter::new("", "", "", "/store");
        let file_sink = Arc::new(RecordingSink::new());

        let mut config = base_config();
        config.ignore_list = vec!["/store/a".to_string()];

        let master = ScannerMaster::new(Arc::clone(&client), path_converter, "/store", config, Arc::clone(&file_sink) as Arc<dyn FileSink>, None, None);

        let outcome = master.run();
        assert_eq!(outcome.counters.ignored_dirs, 1);
        assert!(file_sink.items().is_empty());
        // /store/a itself was never listed because it was ignored before being enqueued.
        assert!(!client.calls().iter().any(|(path, _)| path == "/store/a"));
    }

    #[test]
    fn recursive_zero_guard_is_quiet_when_confirmatory_agrees() {
        // Both the recursive call and the confirmatory flat call see a
        // genuinely empty root: the guard must not fire a false give-up.
        let mut client = MockListingClient::new();
        client.insert("/store", MockDir::default());
        let client = Arc::new(client);
        let path_converter = PathConverter::new("", "", "", "/store");

        let master = ScannerMaster::new(client, path_converter, "/store", base_config(), Arc::new(RecordingSink::new()) as Arc<dyn FileSink>, None, None);
        let outcome = master.run();
        assert!(outcome.counters.gave_up.is_empty());
    }

    #[test]
    fn s5_recursive_zero_guard_gives_up_when_confirmatory_finds_children() {
        // The real tree has a child, but the first (recursive) call is
        // scripted to under-report as empty; the confirmatory flat call
        // sees the real, non-empty tree and the guard must fire.
        let mut client = MockListingClient::new();
        client.insert(
            "/store",
            MockDir {
                dirs: vec!["a".to_string(), "b".to_string()],
                files: vec![],
            },
        );
        client.insert("/store/a", MockDir::default());
        client.insert("/store/b", MockDir::default());
        client.script("/store", Scripted::Ok { dirs: vec![], files: vec![] });
        let client = Arc::new(client);
        let path_converter = PathConverter::new("", "", "", "/store");

        let master = ScannerMaster::new(client, path_converter, "/store", base_config(), Arc::new(RecordingSink::new()) as Arc<dyn FileSink>, None, None);
        let outcome = master.run();
        assert_eq!(outcome.counters.gave_up.len(), 1);
        let reason = outcome.counters.gave_up.get("/store").expect("root recorded as gave up");
        assert!(reason.contains("dirs: 2"));
        assert!(reason.contains("files: 0"));
    }

    #[test]
    fn max_files_stops_new_directory_discovery() {
        // A single worker makes task completion order deterministic: the
        // root's own file count is folded into `n_files` before its child
        // `/store/a` is dispatched, and `/store/a`'s file count is folded in
        // before its own child `/store/a/b` would be considered.
        let mut client = MockListingClient::new();
        client.insert(
            "/store",
            MockDir {
                dirs: vec!["a".to_string()],
                files: vec![("root_file".to_string(), 1)],
            },
        );
        client.insert(
            "/store/a",
            MockDir {
                dirs: vec!["b".to_string()],
                files: vec![("file_a".to_string(), 1)],
            },
        );
        client.insert("/store/a/b", MockDir::default());
        let client = Arc::new(client);
        let path_converter = PathConverter::new("", "", "", "/store");

        let mut config = base_config();
        config.max_scanners = 1;
        config.max_files = Some(1);
        config.recursive_threshold = 5; // force flat listings so children are discovered as separate tasks

        let master = ScannerMaster::new(client, path_converter, "/store", config, Arc::new(RecordingSink::new()) as Arc<dyn FileSink>, None, None);
        let outcome = master.run();
        // /store and /store/a are both scanned; /store/a/b is never discovered
        // because n_files already reached the cap by the time /store/a's
        // directory list was processed.
        assert_eq!(outcome.counters.n_to_scan, 2);
        assert_eq!(outcome.counters.n_files, 2);
    }
}
