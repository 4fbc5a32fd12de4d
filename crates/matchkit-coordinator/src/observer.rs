//! The `SessionObserver` trait: how the application hears about its
//! session.
//!
//! Exactly one observer is bound per search. Starting another search
//! replaces it; the old observer simply stops hearing anything.

use matchkit_protocol::{PeerHandle, SearchTicket, SessionId};
use matchkit_session::{EndReason, Roster, SessionState};
use tokio::sync::mpsc;

/// A point-in-time copy of the coordinator's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    /// The search attempt currently owning the coordinator, if any.
    pub ticket: Option<SearchTicket>,
    /// The provider's id for the current session, once a candidate exists.
    pub session_id: Option<SessionId>,
    /// Peers still expected to connect, once a candidate exists.
    pub expected_additional_peers: Option<usize>,
    /// The resolved roster. `None` until resolution succeeds.
    pub roster: Option<Roster>,
}

/// Receives lifecycle callbacks for one search.
///
/// Called from the coordinator task, one call at a time and in order.
/// Implementations must not block; hand work off to another task or
/// channel if it is slow.
///
/// Each session produces at most one `on_session_started` and at most one
/// `on_session_ended`.
pub trait SessionObserver: Send + 'static {
    /// The roster is resolved and every expected peer is connected.
    fn on_session_started(&self, session: &SessionSnapshot);

    /// A peer sent application bytes. Forwarded verbatim.
    fn on_data_received(&self, peer: PeerHandle, bytes: &[u8]);

    /// The session is over.
    fn on_session_ended(&self, reason: &EndReason);
}

/// Observer callbacks as values, for applications that prefer a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Started(SessionSnapshot),
    Data { peer: PeerHandle, bytes: Vec<u8> },
    Ended(EndReason),
}

/// Lets an `mpsc::UnboundedSender<SessionEvent>` act as an observer.
///
/// If the receiver is gone the events are dropped.
impl SessionObserver for mpsc::UnboundedSender<SessionEvent> {
    fn on_session_started(&self, session: &SessionSnapshot) {
        let _ = self.send(SessionEvent::Started(session.clone()));
    }

    fn on_data_received(&self, peer: PeerHandle, bytes: &[u8]) {
        let _ = self.send(SessionEvent::Data {
            peer,
            bytes: bytes.to_vec(),
        });
    }

    fn on_session_ended(&self, reason: &EndReason) {
        let _ = self.send(SessionEvent::Ended(reason.clone()));
    }
}
