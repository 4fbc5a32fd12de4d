//! Error types for the session layer.

use matchkit_protocol::SessionId;

/// Errors that can occur while driving session components.
///
/// These indicate a caller tried to break one of the components' rules,
/// not that the provider failed. Provider failures end a session and are
/// described by [`EndReason`](crate::EndReason) instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// A roster batch for this session is already outstanding.
    /// Exactly one lookup request is issued per session.
    #[error("roster resolution already in flight for session {0}")]
    ResolutionInFlight(SessionId),

    /// The roster for this session was already populated.
    /// Rosters are written once and then read-only.
    #[error("roster already resolved for session {0}")]
    AlreadyResolved(SessionId),
}
