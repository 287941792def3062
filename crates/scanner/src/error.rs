/// Fatal errors raised while running a scan.
///
/// Per-directory give-ups are not represented here — they are data
/// (recorded in [`crate::ScanCounters::gave_up`]), not an unwound error, per
/// `spec.md` §7. This type is reserved for conditions that abort the
/// scan outright: a sink that can no longer be written to.
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    /// Writing a discovered file to the output sink failed.
    #[error("writing file listing failed: {0}")]
    FileSink(String),
    /// Writing an empty-directory path to the output sink failed.
    #[error("writing empty-directory listing failed: {0}")]
    EmptyDirSink(String),
}
