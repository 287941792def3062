//! [`ListingClient`] backed directly by [`std::fs`], for storage endpoints
//! that are POSIX-mounted on the machine running the scan (the common
//! deployment shape when the namespace sits behind a FUSE/NFS/CephFS
//! mount rather than a bare xrootd redirector).
//!
//! The genuine xrootd wire protocol client this complements is out of
//! scope for this workspace (`spec.md` §1); this is the one concrete,
//! fully self-contained [`ListingClient`] the binary ships with.

use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::ListingError;
use crate::types::{FileEntry, ListResult};
use crate::{CancelToken, ListingClient};

/// Lists directories under a local filesystem mount.
///
/// `server_root` is recorded for parity with remote clients but never
/// itself consulted by [`LocalFsClient::ls`] — every path the scanner
/// passes in is already an absolute filesystem path (the path converter's
/// `remove_prefix`/`add_prefix` knobs handle any logical-vs-physical
/// translation upstream of this client).
#[derive(Debug)]
pub struct LocalFsClient {
    server_root: String,
    servers: Mutex<Vec<String>>,
}

impl LocalFsClient {
    /// Builds a client rooted at `server_root` (e.g. `/mnt/storage`).
    #[must_use]
    pub fn new(server_root: impl Into<String>) -> Self {
        Self {
            server_root: server_root.into(),
            servers: Mutex::new(Vec::new()),
        }
    }

    fn walk_recursive(path: &Path, want_sizes: bool, deadline: Instant, cancel: &CancelToken) -> Result<(Vec<String>, Vec<FileEntry>), ListResult> {
        let mut dirs = Vec::new();
        let mut files = Vec::new();
        let mut stack = vec![(path.to_path_buf(), String::new())];
        while let Some((dir, rel_prefix)) = stack.pop() {
            if cancel.is_cancelled() {
                return Err(ListResult::failed("killed"));
            }
            if Instant::now() >= deadline {
                return Err(ListResult::timed_out(format!("listing {} did not complete in time", path.display())));
            }
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) => return Err(ListResult::failed(err.to_string())),
            };
            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => return Err(ListResult::failed(err.to_string())),
                };
                let name = entry.file_name().to_string_lossy().into_owned();
                let rel = if rel_prefix.is_empty() { name.clone() } else { format!("{rel_prefix}/{name}") };
                let file_type = match entry.file_type() {
                    Ok(ft) => ft,
                    Err(err) => return Err(ListResult::failed(err.to_string())),
                };
                if file_type.is_dir() {
                    dirs.push(rel.clone());
                    stack.push((entry.path(), rel));
                } else if file_type.is_file() {
                    let size = if want_sizes {
                        entry.metadata().ok().map(|m| m.len())
                    } else {
                        None
                    };
                    files.push(FileEntry { name: rel, size });
                }
            }
        }
        Ok((dirs, files))
    }

    fn ls_flat(path: &Path, want_sizes: bool) -> ListResult {
        let entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(err) => return ListResult::failed(err.to_string()),
        };
        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => return ListResult::failed(err.to_string()),
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            let file_type = match entry.file_type() {
                Ok(ft) => ft,
                Err(err) => return ListResult::failed(err.to_string()),
            };
            if file_type.is_dir() {
                dirs.push(name);
            } else if file_type.is_file() {
                let size = if want_sizes { entry.metadata().ok().map(|m| m.len()) } else { None };
                files.push(FileEntry { name, size });
            }
        }
        ListResult::ok(dirs, files)
    }
}

impl ListingClient for LocalFsClient {
    fn ls(&self, path: &str, recursive: bool, want_sizes: bool, timeout: Duration, cancel: &CancelToken) -> ListResult {
        let fs_path = Path::new(path);
        if !recursive {
            return Self::ls_flat(fs_path, want_sizes);
        }
        let deadline = Instant::now() + timeout;
        match Self::walk_recursive(fs_path, want_sizes, deadline, cancel) {
            Ok((dirs, files)) => ListResult::ok(dirs, files),
            Err(result) => result,
        }
    }

    fn prescan(&self, root: &str) -> Result<(), ListingError> {
        match fs::metadata(root) {
            Ok(meta) if meta.is_dir() => {
                *self.servers.lock().expect("server list mutex poisoned") = vec![self.server_root.clone()];
                Ok(())
            }
            Ok(_) => Err(ListingError::PrescanFailed {
                root: root.to_string(),
                reason: "root is not a directory".to_string(),
            }),
            Err(err) => Err(ListingError::PrescanFailed {
                root: root.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    fn servers(&self) -> Vec<String> {
        self.servers.lock().expect("server list mutex poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{create_dir_all, write};
    use tempfile::tempdir;

    #[test]
    fn flat_listing_returns_direct_children_only() {
        let dir = tempdir().unwrap();
        create_dir_all(dir.path().join("sub")).unwrap();
        write(dir.path().join("a.root"), b"12345").unwrap();

        let client = LocalFsClient::new(dir.path().to_string_lossy().into_owned());
        let result = client.ls(dir.path().to_str().unwrap(), false, true, Duration::from_secs(1), &CancelToken::new());
        assert!(result.is_ok());
        assert_eq!(result.dirs, vec!["sub".to_string()]);
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].size, Some(5));
    }

    #[test]
    fn recursive_listing_walks_whole_subtree() {
        let dir = tempdir().unwrap();
        create_dir_all(dir.path().join("a/b")).unwrap();
        write(dir.path().join("a/b/x.root"), b"hello").unwrap();

        let client = LocalFsClient::new(dir.path().to_string_lossy().into_owned());
        let result = client.ls(dir.path().to_str().unwrap(), true, false, Duration::from_secs(1), &CancelToken::new());
        assert!(result.is_ok());
        assert!(result.dirs.iter().any(|d| d == "a"));
        assert!(result.dirs.iter().any(|d| d == "a/b"));
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].name, "a/b/x.root");
        assert!(result.files[0].size.is_none());
    }

    #[test]
    fn missing_directory_fails() {
        let dir = tempdir().unwrap();
        let client = LocalFsClient::new(dir.path().to_string_lossy().into_owned());
        let missing = dir.path().join("nope");
        let result = client.ls(missing.to_str().unwrap(), false, false, Duration::from_secs(1), &CancelToken::new());
        assert!(!result.is_ok());
    }

    #[test]
    fn prescan_succeeds_for_existing_directory() {
        let dir = tempdir().unwrap();
        let client = LocalFsClient::new(dir.path().to_string_lossy().into_owned());
        client.prescan(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(client.servers(), vec![dir.path().to_string_lossy().into_owned()]);
    }

    #[test]
    fn prescan_fails_for_missing_directory() {
        let dir = tempdir().unwrap();
        let client = LocalFsClient::new(dir.path().to_string_lossy().into_owned());
        let missing = dir.path().join("nope");
        assert!(client.prescan(missing.to_str().unwrap()).is_err());
    }

    #[test]
    fn cancelled_token_fails_recursive_walk() {
        let dir = tempdir().unwrap();
        create_dir_all(dir.path().join("a")).unwrap();
        let client = LocalFsClient::new(dir.path().to_string_lossy().into_owned());
        let token = CancelToken::new();
        token.cancel();
        let result = client.ls(dir.path().to_str().unwrap(), true, false, Duration::from_secs(1), &token);
        assert!(!result.is_ok());
    }
}
