//! `compare` subcommand: three-way comparison over partitioned-list
//! prefixes (`spec.md` §4.2/§6).

use std::fs;
use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::error::CliError;

/// Which output stream(s) to compute, mirroring [`compare::Stream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StreamArg {
    /// Compute both `dark` and `missing`.
    Both,
    /// Compute only `dark`.
    Dark,
    /// Compute only `missing`.
    Missing,
}

impl From<StreamArg> for compare::Stream {
    fn from(value: StreamArg) -> Self {
        match value {
            StreamArg::Both => Self::Both,
            StreamArg::Dark => Self::DarkOnly,
            StreamArg::Missing => Self::MissingOnly,
        }
    }
}

/// Arguments for the `compare` subcommand.
#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Prefix of the post-scan catalog dump's partitioned list (`A`).
    pub catalog_after: PathBuf,
    /// Prefix of the site scan's partitioned list (`R`).
    pub scan_result: PathBuf,
    /// Prefix of the pre-scan catalog dump's partitioned list (`B`).
    pub catalog_before: PathBuf,

    /// Which output stream(s) to compute.
    #[arg(long, value_enum, default_value_t = StreamArg::Both)]
    pub stream: StreamArg,

    /// Writes every `dark` item, one per line, to this file.
    #[arg(long, value_name = "PATH")]
    pub dark_output: Option<PathBuf>,

    /// Writes every `missing` item, one per line, to this file.
    #[arg(long, value_name = "PATH")]
    pub missing_output: Option<PathBuf>,
}

/// Runs the `compare` subcommand.
///
/// # Errors
///
/// Returns [`CliError::PartList`] if any of the three prefixes cannot be
/// opened, [`CliError::Compare`] if the three lists don't share a
/// partition count, and [`CliError::CompareOutput`] if an output file
/// cannot be written.
pub fn run_compare(args: &CompareArgs) -> Result<(), CliError> {
    let a = partlist::PartitionedList::open(&args.catalog_after)?;
    let r = partlist::PartitionedList::open(&args.scan_result)?;
    let b = partlist::PartitionedList::open(&args.catalog_before)?;

    let result = compare::compare_lists(&a, &r, &b, args.stream.into())?;

    tracing::info!(dark = result.dark.len(), missing = result.missing.len(), "three-way comparison complete");

    if let Some(path) = &args.dark_output {
        write_lines(path, &result.dark)?;
    }
    if let Some(path) = &args.missing_output {
        write_lines(path, &result.missing)?;
    }
    Ok(())
}

fn write_lines(path: &PathBuf, items: &[String]) -> Result<(), CliError> {
    let mut contents = String::new();
    for item in items {
        contents.push_str(item);
        contents.push('\n');
    }
    fs::write(path, contents).map_err(|source| CliError::CompareOutput { path: path.clone(), source })
}
