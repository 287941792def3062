#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Command-line front-end for `ns-reconcile`: argument parsing and
//! subcommand orchestration.
//!
//! # Overview
//!
//! This crate is the thin layer `spec.md` §1 calls out of scope for the
//! core (configuration loading, statistics serialization, and the
//! command-line surface itself): it wires the typed `config`, `scanner`,
//! `listing`, `partlist`, `compare`, and `stats` crates together behind
//! two subcommands, `scan` and `compare`, mirroring the original's
//! `xrootd_scanner.py` single-purpose script split along the same two
//! responsibilities (`spec.md` §6).
//!
//! # Invariants
//!
//! - [`run`] never panics on malformed input it does not control
//!   (missing files, bad YAML/JSON, inconsistent partitioning); every
//!   failure path returns a process exit code through [`CliError::exit_code`].
//! - Exit codes follow `spec.md` §6 exactly: `0` on success, `1` if any
//!   expected root failed or a scan/comparison aborted, `2` on
//!   misconfiguration.

mod compare;
mod error;
mod scan;

pub use compare::CompareArgs;
pub use error::CliError;
pub use scan::ScanArgs;

use std::ffi::OsString;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// Top-level `ns-reconcile` argument parser.
#[derive(Debug, Parser)]
#[command(name = "ns-reconcile", version, about = "Namespace scanner and three-way catalog reconciler")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase logging verbosity (repeatable: `-v`, `-vv`).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all but error-level logging.
    #[arg(short = 'q', long = "quiet", global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prescan and scan a configured RSE, writing the file listing and
    /// (optionally) the empty-directory list and stats JSON.
    Scan(ScanArgs),
    /// Run the three-way comparator over three partitioned-list prefixes
    /// and write `dark`/`missing` output lists.
    Compare(CompareArgs),
}

/// Parses `args` and runs the requested subcommand, returning the
/// process exit code per `spec.md` §6.
///
/// `args` is typically [`std::env::args_os`]; accepting any iterator of
/// [`OsString`]-convertible items keeps this testable without spawning a
/// real process.
#[must_use]
pub fn run<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return exit_code(if err.exit_code() == 0 { 0 } else { 2 });
        }
    };

    logging::install(logging::VerbosityConfig::from_flags(cli.verbose, cli.quiet));

    let outcome = match &cli.command {
        Command::Scan(args) => scan::run_scan(args),
        Command::Compare(args) => compare::run_compare(args),
    };

    match outcome {
        Ok(()) => exit_code(0),
        Err(err) => {
            tracing::error!(error = %err, "ns-reconcile failed");
            exit_code(err.exit_code())
        }
    }
}

fn exit_code(code: u8) -> ExitCode {
    ExitCode::from(code)
}

#[cfg(test)]
mod tests {
    use super::run;
    use std::process::ExitCode;

    #[test]
    fn missing_subcommand_is_misconfiguration() {
        let exit = run(["ns-reconcile"]);
        assert_eq!(exit, ExitCode::from(2));
    }

    #[test]
    fn unknown_subcommand_is_misconfiguration() {
        let exit = run(["ns-reconcile", "frobnicate"]);
        assert_eq!(exit, ExitCode::from(2));
    }

    #[test]
    fn version_flag_reports_success() {
        let exit = run(["ns-reconcile", "--version"]);
        assert_eq!(exit, ExitCode::SUCCESS);
    }

    #[test]
    fn scan_without_config_is_misconfiguration() {
        let exit = run(["ns-reconcile", "scan", "--rse", "EXAMPLE"]);
        assert_eq!(exit, ExitCode::from(2));
    }

    #[test]
    fn compare_missing_inputs_is_a_runtime_failure() {
        let exit = run(["ns-reconcile", "compare", "/nonexistent/a", "/nonexistent/r", "/nonexistent/b"]);
        assert_eq!(exit, ExitCode::from(1));
    }
}
