//! Lifecycle vocabulary: the states a match session moves through and
//! why it ended.

use std::fmt;

use matchkit_protocol::PeerHandle;
use matchkit_provider::ProviderError;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The lifecycle state of the coordinator's one session.
///
/// ```text
///   Idle ──(search)──→ Searching ──(candidate)──→ Assembling ──(ready)──→ Active
///    ↑                    │                           │                    │
///    └──(cancel, fail)────┘             Failed ←──────┴──(provider error)──┤
///                                                     │                    │
///                                                     └──(disconnect)──→ Ended
/// ```
///
/// - **Idle**: nothing in flight. A failed or cancelled search lands
///   here too.
/// - **Searching**: the provider is looking for peers.
/// - **Assembling**: a candidate exists; waiting on the roster and on
///   peers that haven't connected yet.
/// - **Active**: roster resolved and every expected peer connected. Data
///   flows.
/// - **Ended**: the session finished (disconnect, close, lookup failure).
/// - **Failed**: the provider reported a fatal error.
///
/// `Ended` and `Failed` are terminal; only a new search leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Searching,
    Assembling,
    Active,
    Ended,
    Failed,
}

impl SessionState {
    /// Returns `true` for `Ended` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended | Self::Failed)
    }

    /// Returns `true` while a session identity exists (`Assembling` or
    /// `Active`).
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Assembling | Self::Active)
    }

    /// Returns `true` if a new search may start without tearing anything
    /// down.
    pub fn is_idle_eligible(&self) -> bool {
        matches!(self, Self::Idle) || self.is_terminal()
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Searching => write!(f, "Searching"),
            Self::Assembling => write!(f, "Assembling"),
            Self::Active => write!(f, "Active"),
            Self::Ended => write!(f, "Ended"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// EndReason
// ---------------------------------------------------------------------------

/// Why a session ended. Handed to the observer with `on_session_ended`.
///
/// Stale events never produce an `EndReason`; they are dropped before
/// they reach any state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// The provider couldn't assemble a session. The coordinator goes
    /// back to `Idle`.
    SearchFailed(ProviderError),

    /// The roster lookup failed. Not retried.
    ResolutionFailed(ProviderError),

    /// A peer left. Expected at the end of every match.
    PeerDisconnected(PeerHandle),

    /// The provider reported the session as failed.
    ProviderError(ProviderError),

    /// The application closed the session.
    Closed,

    /// A configured bounded wait elapsed.
    TimedOut,
}

impl EndReason {
    /// The state the coordinator lands in for this reason.
    pub fn terminal_state(&self) -> SessionState {
        match self {
            Self::SearchFailed(_) => SessionState::Idle,
            Self::ProviderError(_) => SessionState::Failed,
            Self::ResolutionFailed(_)
            | Self::PeerDisconnected(_)
            | Self::Closed
            | Self::TimedOut => SessionState::Ended,
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SearchFailed(e) => write!(f, "search failed ({e})"),
            Self::ResolutionFailed(e) => {
                write!(f, "roster resolution failed ({e})")
            }
            Self::PeerDisconnected(peer) => {
                write!(f, "{peer} disconnected")
            }
            Self::ProviderError(e) => write!(f, "provider error ({e})"),
            Self::Closed => write!(f, "closed"),
            Self::TimedOut => write!(f, "timed out"),
        }
    }
}
