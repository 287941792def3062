//! Prescanner (C4): validate that each configured root is reachable and
//! discover usable sub-servers before the full scan begins.
//!
//! # Design
//!
//! Runs one [`listing::ListingClient::prescan`] + non-recursive `ls` per
//! root through a bounded worker pool of `max_scanners` threads —
//! intentionally the same worker-count knob the full scan master uses,
//! since a prescan's per-root checks are the same shape of blocking I/O
//! work. Failures here are data, not an error: [`prescan_roots`] always
//! returns, partitioning roots into good and failed.

use std::sync::Arc;
use std::time::Duration;

use listing::{CancelToken, ListingClient};

/// One root that prescanned successfully.
#[derive(Debug, Clone)]
pub struct GoodRoot {
    /// The root path.
    pub root: String,
    /// Servers the client discovered for this root.
    pub servers: Vec<String>,
}

/// Runs the prescan step over every root in `roots`, using up to
/// `max_scanners` worker threads.
///
/// Returns `(good, failed)` where `failed` pairs each unreachable root
/// with a human-readable reason, matching `spec.md` §4.4's
/// `(good_roots, failed_roots)` contract.
pub fn prescan_roots<C: ListingClient + 'static>(client: Arc<C>, roots: &[String], timeout: Duration, max_scanners: usize) -> (Vec<GoodRoot>, Vec<(String, String)>) {
    if roots.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let (work_tx, work_rx) = crossbeam_channel::unbounded::<String>();
    let (result_tx, result_rx) = crossbeam_channel::unbounded::<(String, Result<Vec<String>, String>)>();

    for root in roots {
        work_tx.send(root.clone()).expect("prescan work channel receiver alive");
    }
    drop(work_tx);

    let worker_count = max_scanners.max(1).min(roots.len());
    let mut handles = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        let work_rx = work_rx.clone();
        let result_tx = result_tx.clone();
        let client = Arc::clone(&client);
        handles.push(std::thread::spawn(move || {
            while let Ok(root) = work_rx.recv() {
                let outcome = prescan_one(client.as_ref(), &root, timeout);
                let _ = result_tx.send((root, outcome));
            }
        }));
    }
    drop(result_tx);

    let mut good = Vec::new();
    let mut failed = Vec::new();
    while let Ok((root, outcome)) = result_rx.recv() {
        match outcome {
            Ok(servers) => good.push(GoodRoot { root, servers }),
            Err(reason) => failed.push((root, reason)),
        }
    }

    for handle in handles {
        let _ = handle.join();
    }

    good.sort_by(|a, b| a.root.cmp(&b.root));
    failed.sort_by(|a, b| a.0.cmp(&b.0));
    (good, failed)
}

fn prescan_one<C: ListingClient>(client: &C, root: &str, timeout: Duration) -> Result<Vec<String>, String> {
    if let Err(err) = client.prescan(root) {
        return Err(format!("Exception: {err}"));
    }
    let cancel = CancelToken::new();
    let result = client.ls(root, false, false, timeout, &cancel);
    if result.is_ok() {
        Ok(client.servers())
    } else {
        Err(result.reason.unwrap_or_else(|| "prescan ls failed".to_string()))
    }
}
