//! Unified error type for matchkit.

use matchkit_coordinator::CoordinatorError;
use matchkit_protocol::ProtocolError;
use matchkit_provider::ProviderError;
use matchkit_session::SessionError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `matchkit` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum MatchkitError {
    /// An invalid request or recipient.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A failure reported by the session provider.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Misuse of a session component (resolver, tracker).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The coordinator rejected a request or has stopped.
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchkit_protocol::SessionId;

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidPeerBounds { min: 3, max: 2 };
        let top: MatchkitError = err.into();
        assert!(matches!(top, MatchkitError::Protocol(_)));
        assert!(top.to_string().contains('3'));
    }

    #[test]
    fn test_from_provider_error() {
        let err = ProviderError::LookupFailed("offline".into());
        let top: MatchkitError = err.into();
        assert!(matches!(top, MatchkitError::Provider(_)));
        assert!(top.to_string().contains("offline"));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::ResolutionInFlight(SessionId(4));
        let top: MatchkitError = err.into();
        assert!(matches!(top, MatchkitError::Session(_)));
    }

    #[test]
    fn test_from_coordinator_error() {
        let top: MatchkitError = CoordinatorError::Unavailable.into();
        assert!(matches!(top, MatchkitError::Coordinator(_)));
    }

    #[test]
    fn test_question_mark_converts() {
        fn request() -> Result<(), MatchkitError> {
            matchkit_protocol::MatchRequest::new(0, 2)?;
            Ok(())
        }
        assert!(matches!(request(), Err(MatchkitError::Protocol(_))));
    }
}
