//! Error types for the protocol layer.
//!
//! Each crate in matchkit defines its own error enum. A `ProtocolError`
//! means the application asked for something malformed before any
//! provider was involved.

/// Errors that can occur when building protocol values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The peer bounds of a match request are out of range.
    ///
    /// A request needs `1 <= min_peers <= max_peers <= MAX_PEERS`.
    #[error("invalid peer bounds: min {min}, max {max}")]
    InvalidPeerBounds { min: usize, max: usize },

    /// The request is invalid for some other reason (e.g. an empty
    /// explicit recipient list).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
