//! Pure mapping between physical storage paths and logical (catalog) paths.
//!
//! # Design
//!
//! Every path a [`listing::ListingClient`] returns is physical: rooted at
//! the client's own server-root prefix, not necessarily the namespace the
//! catalog uses to name files. [`PathConverter`] applies the two knobs
//! `spec.md` §4.7 exposes — `remove_prefix` and `add_prefix` — and nothing
//! else; `server_root` and `root` are retained for provenance (logging,
//! and the depth calculation the scanner master does relative to the
//! logical root) but do not themselves enter the formula.

/// Converts physical listing paths to logical catalog paths.
#[derive(Debug, Clone)]
pub struct PathConverter {
    server_root: String,
    remove_prefix: String,
    add_prefix: String,
    root: String,
}

impl PathConverter {
    /// Builds a converter for one scan root.
    ///
    /// `server_root` and `root` are not used by [`PathConverter::logical`]
    /// itself (for CMS and most RSEs `remove_prefix`/`add_prefix` are a
    /// no-op pair); they are retained so callers can recover provenance
    /// without threading the original config through separately.
    #[must_use]
    pub fn new(server_root: impl Into<String>, remove_prefix: impl Into<String>, add_prefix: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            server_root: server_root.into(),
            remove_prefix: remove_prefix.into(),
            add_prefix: add_prefix.into(),
            root: root.into(),
        }
    }

    /// The server-root prefix this converter was built with.
    #[must_use]
    pub fn server_root(&self) -> &str {
        &self.server_root
    }

    /// The scan root this converter was built with.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Converts a physical path (already past the server-root prefix) to
    /// its logical form: `canonicalize(add_prefix ++ strip_prefix(canonicalize(path), remove_prefix))`.
    ///
    /// # Panics
    ///
    /// Panics if `path` does not start with `/` — every path this crate
    /// hands to a [`PathConverter`] comes from a [`listing::ListingClient`]
    /// or from this crate's own canonicalization, both of which guarantee
    /// a leading slash.
    #[must_use]
    pub fn logical(&self, path: &str) -> String {
        assert!(path.starts_with('/'), "expected input path to start with /: {path}");
        let canon = canonicalize(path);
        let stripped = if !self.remove_prefix.is_empty() && canon.starts_with(self.remove_prefix.as_str()) {
            &canon[self.remove_prefix.len()..]
        } else {
            canon.as_str()
        };
        canonicalize(&format!("{}{}", self.add_prefix, stripped))
    }
}

/// Collapses repeated `/` and drops a trailing `/` unless the path is
/// exactly `/`.
#[must_use]
pub fn canonicalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_slash = false;
    for ch in path.chars() {
        if ch == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        out.push(ch);
    }
    if out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}
