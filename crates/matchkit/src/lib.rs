//! # matchkit
//!
//! Match session coordination for peer-to-peer games.
//!
//! matchkit sits between a game and an external session provider (the
//! service that finds opponents and moves bytes between devices). The
//! game asks for a match and gets three callbacks back: the session
//! started, a peer sent data, the session ended. In between, matchkit
//! resolves who the peers are, waits for every expected peer to connect,
//! and drops any late callback that belongs to a session it already left.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use matchkit::prelude::*;
//!
//! // Implement SessionProvider for your platform, then:
//! // let handle = CoordinatorBuilder::new()
//! //     .spawn_with(|events| MyProvider::new(events));
//! // let (observer, mut events) = tokio::sync::mpsc::unbounded_channel();
//! // handle.find_match(2, 2, observer)?;
//! ```

mod builder;
mod error;
pub mod telemetry;

pub use builder::CoordinatorBuilder;
pub use error::MatchkitError;

pub use matchkit_coordinator as coordinator;
pub use matchkit_protocol as protocol;
pub use matchkit_provider as provider;
pub use matchkit_session as session;

/// Everything a game needs to drive a match session.
pub mod prelude {
    pub use crate::{CoordinatorBuilder, MatchkitError};

    pub use matchkit_coordinator::{
        CoordinatorConfig, CoordinatorError, CoordinatorHandle, ProviderEvents,
        SessionCoordinator, SessionEvent, SessionObserver, SessionSnapshot,
    };
    pub use matchkit_protocol::{
        Candidate, Channel, Identity, InviteId, MatchRequest, PeerHandle,
        ProtocolError, Recipient, SearchTicket, SessionId,
    };
    pub use matchkit_provider::{ProviderError, ProviderEvent, SessionProvider};
    pub use matchkit_session::{
        AuthState, EndReason, IdentityGate, Roster, SessionState,
    };
}
