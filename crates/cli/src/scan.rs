//! `scan` subcommand: prescan + scan orchestration for one configured
//! RSE (`spec.md` §2's data-flow, §6's CLI surface).

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clap::Args;

use listing::LocalFsClient;
use scanner::path_converter::canonicalize;
use scanner::{EmptyDirFile, EmptyDirSink, FileSink, HeartbeatSink, MasterConfig, PathConverter, RecordingSink, ScannerMaster};
use stats::{RootReport, ScanHeartbeat, ScanReport, StatsDocument};

use crate::error::CliError;

/// Arguments for the `scan` subcommand.
///
/// Flag names are long-form translations of the original `xrootd_scanner.py`
/// `getopt` surface (`-c`, `-o`, `-t`, `-m`, `-R`, `-n`, `-k`, `-q`, `-x`,
/// `-M`, `-s`, `-e`, `-E`, `-r`, `-z`), per `spec.md` §6.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// RSE (storage endpoint) name to scan; must have an entry in
    /// `--config`.
    #[arg(long)]
    pub rse: String,

    /// Path to the catalog-endpoint YAML configuration document.
    #[arg(short = 'c', long = "config")]
    pub config: PathBuf,

    /// Output prefix for the partitioned file listing. Required when the
    /// effective partition count is greater than one.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Overrides the configured per-`ls`-call timeout, in seconds.
    #[arg(short = 't', long = "timeout")]
    pub timeout: Option<u64>,

    /// Overrides the configured worker-pool size.
    #[arg(short = 'm', long = "workers")]
    pub workers: Option<usize>,

    /// Overrides the configured recursive threshold.
    #[arg(short = 'R', long = "recursion-threshold")]
    pub recursion_threshold: Option<u32>,

    /// Overrides the configured output partition count.
    #[arg(short = 'n', long = "npartitions")]
    pub npartitions: Option<usize>,

    /// Compresses partitioned and empty-directory output with gzip.
    #[arg(short = 'z', long = "compressed")]
    pub compressed: bool,

    /// A non-empty `GaveUp` map does not by itself fail the scan.
    #[arg(short = 'k', long = "ignore-failed-directories")]
    pub ignore_failed_directories: bool,

    /// Suppresses interactive progress display.
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Does not request file sizes, overriding the configured default.
    #[arg(short = 'x', long = "no-sizes")]
    pub no_sizes: bool,

    /// Stops discovering new directory tasks once this many files have
    /// been found.
    #[arg(short = 'M', long = "max-files")]
    pub max_files: Option<u64>,

    /// Path to the JSON statistics file, merged on every checkpoint.
    #[arg(short = 's', long = "stats-file")]
    pub stats_file: Option<PathBuf>,

    /// Top-level key under which this scan's statistics are written.
    #[arg(short = 'S', long = "stats-key", default_value = "scanner")]
    pub stats_key: String,

    /// Path (or the literal `count-only`) for the empty-directory list.
    #[arg(short = 'e', long = "empty-dirs-output")]
    pub empty_dirs_output: Option<String>,

    /// Only computes the empty-directory list on every Nth day, sampled
    /// by `adler32(rse) % modulo`, so a fleet of RSEs spreads the extra
    /// work across days rather than paying it every scan.
    #[arg(short = 'E', long = "empty-dirs-sample-modulo")]
    pub empty_dirs_sample_modulo: Option<u32>,

    /// Path to a JSON object mapping root path to an expected file count;
    /// a root failing prescan only fails the overall scan when its
    /// expected count is greater than zero.
    #[arg(short = 'r', long = "root-file-counts")]
    pub root_file_counts: Option<PathBuf>,
}

fn unix_time_now() -> f64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs_f64()
}

fn day_number() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() / (24 * 3600)
}

/// Runs the `scan` subcommand end to end: loads configuration, prescans
/// every configured root, scans the survivors, and writes the file
/// listing, optional empty-directory list, and optional stats file.
///
/// # Errors
///
/// Returns [`CliError::Config`] for a missing/malformed configuration,
/// [`CliError::OutputPrefixRequired`] when `npartitions > 1` with no
/// `--output`, [`CliError::PartList`]/[`CliError::EmptyDirOutput`] on
/// output-file creation failure, and [`CliError::ScanFailed`] if any
/// expected root failed or the scan otherwise aborted.
pub fn run_scan(args: &ScanArgs) -> Result<(), CliError> {
    let config = config::CatalogConfig::load(&args.config)?;
    let rse = config.rse(&args.rse)?.clone();

    let max_scanners = args.workers.unwrap_or(rse.scanner.nworkers).max(1);
    let timeout = Duration::from_secs(args.timeout.unwrap_or(rse.scanner.timeout));
    let recursive_threshold = args.recursion_threshold.unwrap_or(rse.scanner.recursion_threshold);
    let nparts = args.npartitions.unwrap_or(rse.npartitions).max(1);
    let include_sizes = rse.scanner.include_sizes && !args.no_sizes;

    if nparts > 1 && args.output.is_none() {
        return Err(CliError::OutputPrefixRequired);
    }
    let output = args.output.clone().unwrap_or_else(|| PathBuf::from("out.list"));

    let root_file_counts = load_root_file_counts(args.root_file_counts.as_deref())?;

    let empty_dirs_count_only = args.empty_dirs_output.as_deref() == Some("count-only");
    let mut compute_empty_dirs = empty_dirs_count_only || args.empty_dirs_output.is_some();
    if compute_empty_dirs {
        if let Some(modulo) = args.empty_dirs_sample_modulo.filter(|m| *m != 0) {
            let rse_hash = checksums::adler32(rse.rse.as_bytes());
            compute_empty_dirs = (day_number() % u64::from(modulo)) == u64::from(rse_hash % modulo);
        }
    }

    let start_time = unix_time_now();
    let mut report = ScanReport::started(rse.rse.clone(), rse.scanner.server.clone(), rse.scanner.server_root.clone(), max_scanners, start_time);

    let mut report_doc = args.stats_file.as_ref().map(|path| StatsDocument::new(path.as_path()));
    if let Some(doc) = &mut report_doc {
        doc.update_section(&args.stats_key, &report)?;
    }

    let writer = partlist::PartitionedList::create(nparts as u32, &output, args.compressed)?;
    let writer = Arc::new(Mutex::new(writer));
    let file_sink: Arc<dyn FileSink> = Arc::clone(&writer) as Arc<dyn FileSink>;

    let empty_dir_file: Option<Arc<EmptyDirFile>> = if compute_empty_dirs && !empty_dirs_count_only {
        match &args.empty_dirs_output {
            Some(path) => Some(Arc::new(EmptyDirFile::create(path.as_str(), args.compressed).map_err(CliError::EmptyDirOutput)?)),
            None => None,
        }
    } else {
        None
    };
    let empty_dir_counter: Option<Arc<RecordingSink>> = (compute_empty_dirs && empty_dirs_count_only).then(|| Arc::new(RecordingSink::new()));
    let empty_dir_sink: Option<Arc<dyn EmptyDirSink>> = empty_dir_file
        .clone()
        .map(|s| s as Arc<dyn EmptyDirSink>)
        .or_else(|| empty_dir_counter.clone().map(|s| s as Arc<dyn EmptyDirSink>));

    let heartbeat_sink: Option<Arc<dyn HeartbeatSink>> = args
        .stats_file
        .as_ref()
        .map(|path| Arc::new(ScanHeartbeat::new(StatsDocument::new(path.as_path()), args.stats_key.clone())) as Arc<dyn HeartbeatSink>);

    let client = Arc::new(LocalFsClient::new(rse.scanner.server_root.clone()));
    let roots: Vec<String> = rse
        .root_paths()
        .iter()
        .map(|path| canonicalize(&resolve_root(path, &rse.scanner.server_root)))
        .collect();

    let (good_roots, failed_roots) = scanner::prescan_roots(Arc::clone(&client), &roots, timeout, max_scanners);

    let mut scan_failed = false;
    for (root, error) in &failed_roots {
        let expected = root_file_counts.get(root).copied().unwrap_or(0) > 0;
        report.push_root(RootReport {
            root: root.clone(),
            expected,
            files: 0,
            directories: 0,
            empty_directories: 0,
            directories_ignored: 0,
            files_ignored: 0,
            elapsed_time: 0.0,
            total_size_gb: None,
            root_failed: true,
            error: Some(error.clone()),
            failed_subdirectories: BTreeMap::new(),
        });
        scan_failed = scan_failed || expected;
    }

    // Simplifies the original's ambiguously-scoped `all_roots_failed`: every
    // configured root either failed prescan or never existed at all.
    let all_roots_failed = good_roots.is_empty();

    if !scan_failed {
        for good_root in &good_roots {
            tracing::info!(root = %good_root.root, "scanning root");
            let expected = root_file_counts.get(&good_root.root).copied().unwrap_or(0) > 0;

            let path_converter = PathConverter::new(rse.scanner.server_root.clone(), rse.scanner.remove_prefix.clone(), rse.scanner.add_prefix.clone(), good_root.root.clone());
            let master_config = MasterConfig {
                max_scanners,
                timeout,
                include_sizes,
                recursive_threshold,
                max_files: args.max_files,
                ignore_list: rse.ignore_list.clone(),
                compute_empty_dirs,
                display_progress: !args.quiet,
            };
            let master = ScannerMaster::new(Arc::clone(&client), path_converter, good_root.root.clone(), master_config, Arc::clone(&file_sink), empty_dir_sink.clone(), heartbeat_sink.clone());

            let root_start = Instant::now();
            let outcome = master.run();
            let elapsed = root_start.elapsed().as_secs_f64();

            let root_failed = outcome.counters.failed || (!args.ignore_failed_directories && !outcome.counters.gave_up.is_empty());
            report.push_root(RootReport {
                root: good_root.root.clone(),
                expected,
                files: outcome.counters.n_files,
                directories: outcome.counters.n_directories,
                empty_directories: outcome.counters.n_empty_dirs,
                directories_ignored: outcome.counters.ignored_dirs,
                files_ignored: outcome.counters.ignored_files,
                elapsed_time: elapsed,
                total_size_gb: include_sizes.then_some(outcome.counters.total_size as f64 / 1_073_741_824.0),
                root_failed,
                error: root_failed.then(|| format!("gave up on {} director{}", outcome.counters.gave_up.len(), if outcome.counters.gave_up.len() == 1 { "y" } else { "ies" })),
                failed_subdirectories: outcome.counters.gave_up,
            });

            if let Some(doc) = &mut report_doc {
                doc.update_section(&args.stats_key, &report)?;
            }

            if root_failed && expected {
                scan_failed = true;
                break;
            }
        }
    }

    drop(file_sink);
    writer.lock().expect("output list mutex poisoned").close()?;

    if let Some(file) = &empty_dir_file {
        file.close().map_err(CliError::EmptyDirOutput)?;
    }
    if let Some(counter) = &empty_dir_counter {
        tracing::info!(count = counter.items().len(), "empty directories found (count-only)");
    }

    report.finish(unix_time_now(), scan_failed || all_roots_failed);
    if let Some(doc) = &mut report_doc {
        doc.update_section(&args.stats_key, &report)?;
    }

    if scan_failed || all_roots_failed {
        return Err(CliError::ScanFailed(format!("{} of {} roots failed", report.roots.iter().filter(|r| r.root_failed).count(), report.roots.len())));
    }
    Ok(())
}

fn resolve_root(path: &str, server_root: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{}/{path}", server_root.trim_end_matches('/'))
    }
}

fn load_root_file_counts(path: Option<&std::path::Path>) -> Result<BTreeMap<String, u64>, CliError> {
    let Some(path) = path else {
        return Ok(BTreeMap::new());
    };
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::RootFileCounts {
        path: path.to_path_buf(),
        source: Box::new(source),
    })?;
    serde_json::from_str(&contents).map_err(|source| CliError::RootFileCounts {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}
