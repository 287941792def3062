//! Typed per-RSE scan settings, grounded in `config.py`'s
//! `RSEConfiguration`.

use serde::{Deserialize, Serialize};

/// One configured scan root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootConfig {
    /// Physical path to start scanning from.
    pub path: String,
}

fn default_server_root() -> String {
    "/".to_string()
}

fn default_timeout() -> u64 {
    300
}

fn default_nworkers() -> usize {
    8
}

fn default_true() -> bool {
    true
}

fn default_recursion_threshold() -> u32 {
    1
}

/// The `scanner` sub-section of a per-RSE configuration entry.
///
/// Field defaults mirror `RSEConfiguration.__init__`'s `cfg.get(key,
/// default)` calls exactly, including the perhaps-surprising
/// `recursion_threshold` default of `1` (not `0`) and `include_sizes`/
/// `is_redirector` both defaulting to `true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Remote server address (host, or xrootd redirector URL).
    pub server: String,
    /// Prefix common to every path the client returns, stripped before
    /// roots are interpreted (default `"/"`).
    #[serde(default = "default_server_root")]
    pub server_root: String,
    /// Per-`ls`-call timeout, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Physical-path prefix to strip before computing the logical path.
    #[serde(default)]
    pub remove_prefix: String,
    /// Logical-path prefix to prepend after stripping `remove_prefix`.
    #[serde(default)]
    pub add_prefix: String,
    /// Worker-pool size (`max_scanners`).
    #[serde(default = "default_nworkers")]
    pub nworkers: usize,
    /// Whether to request file sizes during listings.
    #[serde(default = "default_true")]
    pub include_sizes: bool,
    /// Minimum depth at which a directory may be listed recursively.
    #[serde(default = "default_recursion_threshold")]
    pub recursion_threshold: u32,
    /// Whether the configured server is a redirector capable of
    /// discovering sub-servers during prescan.
    #[serde(default = "default_true")]
    pub is_redirector: bool,
    /// Scan roots.
    #[serde(default)]
    pub roots: Vec<RootConfig>,
}

fn default_npartitions() -> usize {
    8
}

/// One RSE's full configuration entry, after defaults (`"*"`) have been
/// merged in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RseConfig {
    /// RSE name (storage endpoint identifier); not itself part of the
    /// YAML document, filled in from the document's key.
    #[serde(skip)]
    pub rse: String,
    /// Number of partitions for the output file listing.
    #[serde(default = "default_npartitions")]
    pub npartitions: usize,
    /// Logical paths (and subtrees) to skip during scanning.
    #[serde(default)]
    pub ignore_list: Vec<String>,
    /// Scanner-specific settings.
    pub scanner: ScanSettings,
}

impl RseConfig {
    /// Returns the configured root paths.
    #[must_use]
    pub fn root_paths(&self) -> Vec<String> {
        self.scanner.roots.iter().map(|r| r.path.clone()).collect()
    }
}
