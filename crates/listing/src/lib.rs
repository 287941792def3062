#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Remote storage-listing client abstraction.
//!
//! # Design
//!
//! The scanner crate needs to `ls` a directory on a remote, xrootd-style
//! namespace without caring whether the transport is xrootd, a redirector
//! fan-out, or (in every test in this workspace) a deterministic in-memory
//! tree. [`ListingClient`] is the seam: the scanner is generic over it, the
//! concrete xrootd wire protocol client is out of scope for this workspace
//! (exactly as a YAML config loader or a JSON stats serializer would be if
//! they required an external service), and [`MockListingClient`] gives
//! every scanner/master test a fully deterministic namespace to crawl.
//! [`LocalFsClient`] is the one concrete client shipped with the binary,
//! for storage endpoints mounted directly on the scanning host.
//!
//! # Invariants
//!
//! - Paths passed to and returned from [`ListingClient::ls`] are absolute
//!   (`/`-prefixed) and relative to the client's own server-root prefix —
//!   the caller is responsible for any further path conversion (see the
//!   `scanner` crate's path converter).
//! - [`ListingClient::ls`] never panics on a missing or permission-denied
//!   path; it reports the failure through [`listing::ListResult`](ListResult)
//!   instead, since a non-OK listing is the scanner's normal, expected way
//!   of discovering a retriable failure.
//! - A single [`ListingClient`] implementation must be safe to call
//!   concurrently from multiple scanner workers.

mod error;
mod fs_client;
mod types;

pub use error::ListingError;
pub use fs_client::LocalFsClient;
pub use types::{FileEntry, ListResult, Status};

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Cooperative cancellation signal passed into [`ListingClient::ls`].
///
/// The scanner master clones this into every in-flight task so that a
/// shutdown can abort a hung `ls` call without the client needing its own
/// out-of-band cancellation channel. Checking the flag is the client
/// implementation's responsibility; [`MockListingClient`] honors it so
/// cancellation tests don't need a real network call to exercise it.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a fresh, not-yet-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` if [`CancelToken::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Abstract client for listing directories on a remote storage namespace.
///
/// Mirrors `spec.md` §4.3's `ls(path, recursive, sizes, timeout)` capability
/// contract. Implementations are expected to be cheap to clone (an `Arc`
/// around shared connection state is the usual shape) since the scanner
/// hands a clone to every worker thread.
pub trait ListingClient: Send + Sync {
    /// Lists `path`, optionally recursively and optionally with file sizes,
    /// aborting if `timeout` elapses or `cancel` is set.
    ///
    /// Never returns an `Err` for a listing failure — that's reported as
    /// [`Status::TimedOut`] or [`Status::Failed`] inside the returned
    /// [`ListResult`]. An `Err` here is reserved for conditions the caller
    /// cannot retry around (e.g. the client itself was never prescanned).
    fn ls(&self, path: &str, recursive: bool, want_sizes: bool, timeout: Duration, cancel: &CancelToken) -> ListResult;

    /// Performs the one-time handshake that discovers peer servers for
    /// `root`, populating [`ListingClient::servers`] for subsequent calls.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError`] if no reachable server could be found.
    fn prescan(&self, root: &str) -> Result<(), ListingError>;

    /// Servers discovered by the most recent [`ListingClient::prescan`]
    /// call, or empty if `prescan` has not been called yet.
    fn servers(&self) -> Vec<String>;
}

/// A directory entry in a [`MockListingClient`]'s namespace tree.
#[derive(Debug, Clone, Default)]
pub struct MockDir {
    /// Subdirectory names directly under this directory.
    pub dirs: Vec<String>,
    /// Files directly under this directory, as `(name, size)`.
    pub files: Vec<(String, u64)>,
}

/// Scripted response for one `ls` call in [`MockListingClient`].
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Respond as if the real tree were listed (recursive or flat per the
    /// caller's request).
    FromTree,
    /// Respond with a timeout, regardless of what the tree contains.
    TimeOut,
    /// Respond with a failure, regardless of what the tree contains.
    Fail(String),
    /// Respond with a specific, literal success result, ignoring the
    /// tree entirely — used to simulate an upstream redirector that
    /// under-reports a recursive listing (`spec.md` §4.5/S5).
    Ok {
        /// Directory names to report, verbatim.
        dirs: Vec<String>,
        /// File names to report, verbatim (no sizes).
        files: Vec<String>,
    },
}

/// Deterministic in-memory [`ListingClient`] used by every test in this
/// workspace that needs to drive the scanner without a real xrootd
/// endpoint.
///
/// The namespace is a fixed tree of [`MockDir`]s keyed by absolute path.
/// Callers can additionally script a queue of canned responses per path
/// (consumed in order) to simulate transient failures, timeouts, or the
/// recursive-zero-guard scenario from `spec.md` §4.5/S5.
#[derive(Debug, Default)]
pub struct MockListingClient {
    tree: BTreeMap<String, MockDir>,
    scripts: Mutex<BTreeMap<String, Vec<Scripted>>>,
    servers: Mutex<Vec<String>>,
    calls: Mutex<Vec<(String, bool)>>,
}

impl MockListingClient {
    /// Builds a client over an empty tree; use [`MockListingClient::insert`]
    /// to populate it.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or replaces) the directory entry at `path`.
    pub fn insert(&mut self, path: impl Into<String>, dir: MockDir) {
        self.tree.insert(path.into(), dir);
    }

    /// Queues a scripted response to be returned the next time `path` is
    /// listed, before falling back to [`Scripted::FromTree`] behavior.
    pub fn script(&self, path: impl Into<String>, response: Scripted) {
        self.scripts.lock().unwrap().entry(path.into()).or_default().push(response);
    }

    /// Returns every `(path, recursive)` pair passed to [`ListingClient::ls`]
    /// so far, in call order — used by tests asserting on scan shape
    /// (e.g. that a directory below the recursion threshold is always
    /// listed flat).
    #[must_use]
    pub fn calls(&self) -> Vec<(String, bool)> {
        self.calls.lock().unwrap().clone()
    }

    fn list_from_tree(&self, path: &str, recursive: bool, want_sizes: bool) -> ListResult {
        let Some(root) = self.tree.get(path) else {
            return ListResult::failed(format!("no such directory: {path}"));
        };

        if !recursive {
            let dirs = root.dirs.clone();
            let files = root
                .files
                .iter()
                .map(|(name, size)| FileEntry {
                    name: name.clone(),
                    size: want_sizes.then_some(*size),
                })
                .collect();
            return ListResult::ok(dirs, files);
        }

        let mut dirs = Vec::new();
        let mut files = Vec::new();
        let mut stack = vec![(path.to_string(), String::new())];
        while let Some((abs, rel_prefix)) = stack.pop() {
            let Some(entry) = self.tree.get(&abs) else {
                continue;
            };
            for d in &entry.dirs {
                let rel = if rel_prefix.is_empty() { d.clone() } else { format!("{rel_prefix}/{d}") };
                dirs.push(rel.clone());
                let child_abs = format!("{}/{d}", abs.trim_end_matches('/'));
                stack.push((child_abs, rel));
            }
            for (name, size) in &entry.files {
                let rel = if rel_prefix.is_empty() { name.clone() } else { format!("{rel_prefix}/{name}") };
                files.push(FileEntry {
                    name: rel,
                    size: want_sizes.then_some(*size),
                });
            }
        }
        ListResult::ok(dirs, files)
    }
}

impl ListingClient for MockListingClient {
    fn ls(&self, path: &str, recursive: bool, want_sizes: bool, _timeout: Duration, cancel: &CancelToken) -> ListResult {
        self.calls.lock().unwrap().push((path.to_string(), recursive));
        if cancel.is_cancelled() {
            return ListResult::failed("killed");
        }
        let scripted = self.scripts.lock().unwrap().get_mut(path).and_then(|queue| (!queue.is_empty()).then(|| queue.remove(0)));
        match scripted {
            Some(Scripted::FromTree) | None => self.list_from_tree(path, recursive, want_sizes),
            Some(Scripted::TimeOut) => ListResult::timed_out("mock timeout"),
            Some(Scripted::Fail(reason)) => ListResult::failed(reason),
            Some(Scripted::Ok { dirs, files }) => ListResult::ok(dirs, files.into_iter().map(|name| FileEntry { name, size: None }).collect()),
        }
    }

    fn prescan(&self, root: &str) -> Result<(), ListingError> {
        if self.tree.contains_key(root) {
            *self.servers.lock().unwrap() = vec!["mock-server".to_string()];
            Ok(())
        } else {
            Err(ListingError::PrescanFailed {
                root: root.to_string(),
                reason: "root not present in mock tree".to_string(),
            })
        }
    }

    fn servers(&self) -> Vec<String> {
        self.servers.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> MockListingClient {
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
    fn flat_listing_returns_direct_children_only() {
        let client = sample_tree();
        let result = client.ls("/store", false, false, Duration::from_secs(1), &CancelToken::new());
        assert!(result.is_ok());
        assert_eq!(result.dirs, vec!["a".to_string(), "b".to_string()]);
        assert!(result.files.is_empty());
    }

    #[test]
    fn recursive_listing_walks_whole_subtree() {
        let client = sample_tree();
        let result = client.ls("/store", true, true, Duration::from_secs(1), &CancelToken::new());
        assert!(result.is_ok());
        let mut file_names: Vec<_> = result.files.iter().map(|f| f.name.clone()).collect();
        file_names.sort();
        assert_eq!(file_names, vec!["a/x.root".to_string(), "a/y.root".to_string()]);
        assert!(result.files.iter().all(|f| f.size.is_some()));
    }

    #[test]
    fn scripted_responses_are_consumed_in_order() {
        let client = sample_tree();
        client.script("/store/a", Scripted::TimeOut);
        client.script("/store/a", Scripted::Fail("server error".to_string()));

        let first = client.ls("/store/a", false, false, Duration::from_secs(1), &CancelToken::new());
        assert_eq!(first.status, Status::TimedOut);

        let second = client.ls("/store/a", false, false, Duration::from_secs(1), &CancelToken::new());
        assert_eq!(second.status, Status::Failed);
        assert_eq!(second.reason.as_deref(), Some("server error"));

        let third = client.ls("/store/a", false, false, Duration::from_secs(1), &CancelToken::new());
        assert!(third.is_ok());
    }

    #[test]
    fn cancelled_token_fails_immediately() {
        let client = sample_tree();
        let token = CancelToken::new();
        token.cancel();
        let result = client.ls("/store", false, false, Duration::from_secs(1), &token);
        assert_eq!(result.status, Status::Failed);
        assert_eq!(result.reason.as_deref(), Some("killed"));
    }

    #[test]
    fn prescan_fails_for_unknown_root() {
        let client = sample_tree();
        assert!(client.prescan("/nope").is_err());
        assert!(client.servers().is_empty());
    }

    #[test]
    fn prescan_succeeds_and_populates_servers() {
        let client = sample_tree();
        client.prescan("/store").unwrap();
        assert_eq!(client.servers(), vec!["mock-server".to_string()]);
    }

    #[test]
    fn calls_are_recorded_in_order() {
        let client = sample_tree();
        client.ls("/store", false, false, Duration::from_secs(1), &CancelToken::new());
        client.ls("/store/a", true, false, Duration::from_secs(1), &CancelToken::new());
        assert_eq!(
            client.calls(),
            vec![("/store".to_string(), false), ("/store/a".to_string(), true)]
        );
    }
}
