#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Verbosity configuration bridging the CLI's `-v`/`-q` flags to a
//! [`tracing`] subscriber.
//!
//! # Design
//!
//! [`VerbosityConfig`] captures the handful of knobs the CLI exposes
//! (repeated `-v`, `--quiet`, and an optional raw `RUST_LOG`-style override)
//! and turns them into an [`tracing_subscriber::EnvFilter`] directive
//! string. [`install`] builds the subscriber and installs it as the global
//! default exactly once per process; calling it a second time is a no-op
//! rather than a panic, since tests and the prescan/scan/compare
//! subcommands of a single CLI invocation may each want to ensure logging
//! is ready without coordinating who calls first.
//!
//! # Examples
//!
//! ```
//! use logging::VerbosityConfig;
//!
//! let quiet = VerbosityConfig::from_flags(0, true);
//! assert_eq!(quiet.directive(), "ns_reconcile=error");
//!
//! let verbose = VerbosityConfig::from_flags(2, false);
//! assert_eq!(verbose.directive(), "ns_reconcile=trace");
//! ```

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Verbosity level requested on the command line.
///
/// Each level below has a fixed target: `-q` silences everything but
/// errors, no flags gets warnings and informational progress, `-v` adds
/// per-directory scan detail, and `-vv` or higher adds retry/backoff and
/// queue-internals detail useful when diagnosing a stuck scan.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VerbosityConfig {
    level: u8,
    quiet: bool,
}

impl VerbosityConfig {
    /// Builds a configuration from the CLI's repeated `-v` count and the
    /// `--quiet` flag. `quiet` takes priority over any `-v` count.
    #[must_use]
    pub const fn from_flags(verbose_count: u8, quiet: bool) -> Self {
        Self {
            level: verbose_count,
            quiet,
        }
    }

    /// Returns the `tracing_subscriber::EnvFilter` directive string this
    /// configuration maps to.
    #[must_use]
    pub fn directive(&self) -> String {
        let level = if self.quiet {
            "error"
        } else {
            match self.level {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        };
        format!("ns_reconcile={level}")
    }
}

/// Installs a global [`tracing`] subscriber configured from `config`.
///
/// Safe to call more than once (from multiple subcommands in the same
/// process, or from test setup); only the first call takes effect.
pub fn install(config: VerbosityConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_new(config.directive()).unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::VerbosityConfig;

    #[test]
    fn quiet_overrides_verbose_count() {
        let config = VerbosityConfig::from_flags(3, true);
        assert_eq!(config.directive(), "ns_reconcile=error");
    }

    #[test]
    fn default_level_is_info() {
        let config = VerbosityConfig::from_flags(0, false);
        assert_eq!(config.directive(), "ns_reconcile=info");
    }

    #[test]
    fn level_one_is_debug() {
        assert_eq!(VerbosityConfig::from_flags(1, false).directive(), "ns_reconcile=debug");
    }

    #[test]
    fn level_two_and_above_is_trace() {
        assert_eq!(VerbosityConfig::from_flags(2, false).directive(), "ns_reconcile=trace");
        assert_eq!(VerbosityConfig::from_flags(5, false).directive(), "ns_reconcile=trace");
    }
}
