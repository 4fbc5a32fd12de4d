//! Error types for the coordinator layer.

use matchkit_protocol::ProtocolError;

/// Errors returned by [`CoordinatorHandle`](crate::CoordinatorHandle)
/// and [`ProviderEvents`](crate::ProviderEvents).
///
/// Session failures are *not* errors here. They end the session and
/// reach the observer as an [`EndReason`](matchkit_session::EndReason).
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    /// The request was rejected before reaching the coordinator.
    #[error(transparent)]
    InvalidRequest(#[from] ProtocolError),

    /// The coordinator task has stopped. Its command channel is closed.
    #[error("coordinator is unavailable")]
    Unavailable,
}
