/// Errors raised while reading or writing a statistics document.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// The document file could not be read or written.
    #[error("stats file I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The on-disk document, or a value being merged into it, was not
    /// valid JSON.
    #[error("stats file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
