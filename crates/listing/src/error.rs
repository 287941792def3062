/// Errors raised while establishing a connection to a storage endpoint.
///
/// Listing a single directory does not use this type — a timed-out or
/// failed `ls` is reported as data in [`crate::ListResult`] so the scanner
/// can retry it, rather than unwound as an error. This type is reserved
/// for the one-time, per-root handshake done by
/// [`crate::ListingClient::prescan`].
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    /// No reachable server could be found for the configured endpoint.
    #[error("no reachable server found for root {root}")]
    NoServerAvailable {
        /// Scan root that could not be prescanned.
        root: String,
    },
    /// The prescan handshake itself failed.
    #[error("prescan of root {root} failed: {reason}")]
    PrescanFailed {
        /// Scan root that could not be prescanned.
        root: String,
        /// Human-readable reason reported by the endpoint.
        reason: String,
    },
}
