//! Session provider abstraction for matchkit.
//!
//! The provider is the external service that actually finds opponents,
//! looks up who they are, and moves bytes between devices. matchkit never
//! implements any of that; it consumes it through two seams:
//!
//! - [`SessionProvider`]: request/response calls the coordinator makes
//!   (search, resolve identities, send data). Each returns a future the
//!   coordinator runs on its own task, so no call ever blocks the
//!   coordinator.
//! - [`ProviderEvent`]: the callback stream the provider pushes back
//!   (connectivity changes, inbound data, failures). The provider's glue
//!   code feeds these into the coordinator's event sink.

#![allow(async_fn_in_trait)]

mod error;

pub use error::ProviderError;

use std::future::Future;

use matchkit_protocol::{
    Candidate, Channel, Identity, InviteId, MatchRequest, PeerHandle,
    Recipient, SessionId,
};

/// The request/response half of a session provider.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → the coordinator keeps the provider in an
///   `Arc` and calls it from spawned tasks.
/// - Every returned future is `Send` for the same reason.
///
/// Methods with default bodies are optional capabilities; a provider that
/// can't accept invites or authenticate simply leaves them alone.
pub trait SessionProvider: Send + Sync + 'static {
    /// Starts matchmaking and resolves once a candidate session exists.
    ///
    /// Resolves to [`ProviderError::Cancelled`] if the user dismisses the
    /// search, or another error if no session could be assembled.
    fn begin_match_search(
        &self,
        request: &MatchRequest,
    ) -> impl Future<Output = Result<Candidate, ProviderError>> + Send;

    /// Looks up identities for a whole batch of handles in one request.
    fn resolve_identities(
        &self,
        handles: Vec<PeerHandle>,
    ) -> impl Future<Output = Result<Vec<Identity>, ProviderError>> + Send;

    /// Delivers `bytes` to the recipients of the given session.
    fn send_data(
        &self,
        session_id: SessionId,
        recipient: Recipient,
        bytes: Vec<u8>,
        channel: Channel,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Joins the match behind an accepted invitation.
    fn accept_invite(
        &self,
        invite: InviteId,
    ) -> impl Future<Output = Result<Candidate, ProviderError>> + Send {
        async move {
            Err(ProviderError::Unavailable(format!(
                "invites not supported (got {invite})"
            )))
        }
    }

    /// Tells the provider the session is complete and it can stop
    /// looking for more players.
    fn finish_matchmaking(
        &self,
        _session_id: SessionId,
    ) -> impl Future<Output = ()> + Send {
        async {}
    }

    /// Authenticates the local user. `Ok(true)` means authenticated.
    fn authenticate_local_user(
        &self,
    ) -> impl Future<Output = Result<bool, ProviderError>> + Send {
        async {
            Err(ProviderError::Unavailable(
                "authentication not supported".into(),
            ))
        }
    }
}

/// The callback half of a session provider.
///
/// Each variant that belongs to a session carries the provider's
/// [`SessionId`], so the coordinator can drop events from a session it
/// has already abandoned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// A peer connected to or dropped out of a session.
    ConnectivityChanged {
        session_id: SessionId,
        peer: PeerHandle,
        connected: bool,
    },

    /// A peer sent us application bytes.
    DataReceived {
        session_id: SessionId,
        peer: PeerHandle,
        bytes: Vec<u8>,
    },

    /// The session failed as a whole.
    ProviderError {
        session_id: SessionId,
        error: ProviderError,
    },

    /// The local user accepted an invitation from another player.
    InviteAccepted { invite: InviteId },

    /// The local user's authentication state changed.
    AuthenticationChanged { authenticated: bool },
}

impl ProviderEvent {
    /// Returns the session the event refers to, if it refers to one.
    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            Self::ConnectivityChanged { session_id, .. }
            | Self::DataReceived { session_id, .. }
            | Self::ProviderError { session_id, .. } => Some(*session_id),
            Self::InviteAccepted { .. }
            | Self::AuthenticationChanged { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A provider that only implements the required methods.
    struct BareProvider;

    impl SessionProvider for BareProvider {
        async fn begin_match_search(
            &self,
            _request: &MatchRequest,
        ) -> Result<Candidate, ProviderError> {
            Err(ProviderError::SearchFailed("nobody online".into()))
        }

        async fn resolve_identities(
            &self,
            handles: Vec<PeerHandle>,
        ) -> Result<Vec<Identity>, ProviderError> {
            Ok(handles
                .into_iter()
                .map(|h| Identity::new(h, h.to_string()))
                .collect())
        }

        async fn send_data(
            &self,
            _session_id: SessionId,
            _recipient: Recipient,
            _bytes: Vec<u8>,
            _channel: Channel,
        ) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    #[test]
    fn test_event_session_id_for_session_events() {
        let ev = ProviderEvent::ConnectivityChanged {
            session_id: SessionId(1),
            peer: PeerHandle(2),
            connected: true,
        };
        assert_eq!(ev.session_id(), Some(SessionId(1)));

        let ev = ProviderEvent::ProviderError {
            session_id: SessionId(3),
            error: ProviderError::SessionFailed("x".into()),
        };
        assert_eq!(ev.session_id(), Some(SessionId(3)));
    }

    #[test]
    fn test_event_session_id_none_for_global_events() {
        let ev = ProviderEvent::InviteAccepted { invite: InviteId(9) };
        assert_eq!(ev.session_id(), None);
        let ev = ProviderEvent::AuthenticationChanged {
            authenticated: true,
        };
        assert_eq!(ev.session_id(), None);
    }

    #[test]
    fn test_error_is_cancelled() {
        assert!(ProviderError::Cancelled.is_cancelled());
        assert!(!ProviderError::SearchFailed("x".into()).is_cancelled());
    }

    #[tokio::test]
    async fn test_default_capabilities_report_unavailable() {
        let provider = BareProvider;
        assert!(matches!(
            provider.accept_invite(InviteId(1)).await,
            Err(ProviderError::Unavailable(_))
        ));
        assert!(matches!(
            provider.authenticate_local_user().await,
            Err(ProviderError::Unavailable(_))
        ));
        provider.finish_matchmaking(SessionId(1)).await;
    }

    #[tokio::test]
    async fn test_required_methods_resolve() {
        let provider = BareProvider;
        let ids = provider
            .resolve_identities(vec![PeerHandle(1), PeerHandle(2)])
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);
        let req = MatchRequest::new(2, 2).unwrap();
        assert!(provider.begin_match_search(&req).await.is_err());
    }
}
