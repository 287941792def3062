use std::path::PathBuf;

/// Errors that terminate a subcommand before or during a run.
///
/// [`CliError::exit_code`] is the single place that maps an error onto
/// `spec.md` §6's exit-code contract: `2` for anything that should have
/// been caught before a scan or comparison began, `1` for anything that
/// only becomes visible once the work is underway.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The configuration document could not be loaded or the requested
    /// RSE is missing/malformed.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    /// `-n`/`--npartitions` was greater than one but no `-o`/`--output`
    /// prefix was given, mirroring the original's `sys.exit(2)` guard.
    #[error("output prefix is required when npartitions > 1")]
    OutputPrefixRequired,
    /// The root-file-counts JSON document could not be read or parsed.
    #[error("failed to read root file counts {path}: {source}")]
    RootFileCounts {
        /// Path to the file that failed to load.
        path: PathBuf,
        /// Underlying I/O or JSON-parsing error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Creating or writing the output partitioned list failed.
    #[error("failed to create output list: {0}")]
    PartList(#[from] partlist::PartListError),
    /// Creating the empty-directory output file failed.
    #[error("failed to create empty-directory output: {0}")]
    EmptyDirOutput(#[source] std::io::Error),
    /// The statistics file could not be written.
    #[error("failed to write stats file: {0}")]
    Stats(#[from] stats::StatsError),
    /// At least one root that was expected to contain files failed to
    /// scan, or the scan was aborted partway through.
    #[error("scan failed: {0}")]
    ScanFailed(String),
    /// The three-way comparison itself failed (inconsistent partitioning,
    /// or an I/O error reading one of the input lists).
    #[error("comparison failed: {0}")]
    Compare(#[from] compare::CompareError),
    /// Writing a comparison output list failed.
    #[error("failed to write comparison output {path}: {source}")]
    CompareOutput {
        /// Output file that failed to write.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    /// Maps this error onto the process exit code `spec.md` §6 assigns
    /// to it.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::OutputPrefixRequired | Self::RootFileCounts { .. } => 2,
            Self::PartList(_) | Self::EmptyDirOutput(_) | Self::Stats(_) | Self::ScanFailed(_) | Self::Compare(_) | Self::CompareOutput { .. } => 1,
        }
    }
}
