use partlist::PartListError;

/// Errors raised while performing a three-way comparison.
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    /// The three input lists were not built with the same partition count,
    /// so their partitions cannot be paired up and compared one-for-one.
    #[error("inconsistent partition counts: r has {r}, a has {a}, b has {b}")]
    InconsistentPartitioning {
        /// Partition count of the site-scan-result list.
        r: u32,
        /// Partition count of the post-scan catalog dump.
        a: u32,
        /// Partition count of the pre-scan catalog dump.
        b: u32,
    },
    /// Reading an item from one of the three input lists failed.
    #[error("failed to read input list: {0}")]
    List(#[from] PartListError),
}
