//! Core protocol types for matchkit.
//!
//! Every identifier in this module is a "newtype wrapper" around a `u64`.
//! The provider hands them out; matchkit only compares them. That is the
//! whole point: a `SessionId` from an abandoned session must never be
//! mistaken for the current one, and the type system keeps a `PeerHandle`
//! from being passed where a `SessionId` is expected.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque identity of one assembled match session.
///
/// Supplied by the provider when a search yields a candidate. The
/// coordinator stores exactly one "current" `SessionId` and compares every
/// inbound callback against it.
///
/// `#[serde(transparent)]` serializes `SessionId(42)` as plain `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl SessionId {
    /// Draws a fresh random, non-zero session id.
    ///
    /// Providers that don't get ids from a backend (loopback and test
    /// providers) use this so two sessions never collide by accident.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        Self(rng.random_range(1..=u64::MAX))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

/// Opaque identifier for a remote participant.
///
/// Not owned by matchkit. Only used as a lookup key into the roster and
/// as a delivery target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct PeerHandle(pub u64);

impl fmt::Display for PeerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

/// Identifier of a pending invitation to join someone else's match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InviteId(pub u64);

impl fmt::Display for InviteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I-{}", self.0)
    }
}

/// Local identity of one search attempt.
///
/// Issued by the coordinator (never by the provider) each time a search
/// or invite acceptance starts. A search that completes after a newer one
/// was issued carries an old ticket and is discarded; its `SessionId`
/// can't be used for that check because the coordinator has never seen it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct SearchTicket(pub u64);

impl SearchTicket {
    /// Returns the ticket issued after this one.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SearchTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Records returned by the provider
// ---------------------------------------------------------------------------

/// Resolved display identity for a peer handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// The handle this identity was resolved for.
    pub handle: PeerHandle,
    /// Short public nickname.
    pub alias: String,
    /// Longer name suitable for UI. Often the same as `alias`.
    pub display_name: String,
}

impl Identity {
    /// Builds an identity whose display name equals its alias.
    pub fn new(handle: PeerHandle, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        Self {
            handle,
            display_name: alias.clone(),
            alias,
        }
    }
}

/// A candidate session assembled by the provider.
///
/// `peers` are the handles known at the moment the match was found.
/// `expected_additional_peers` counts the peers that still have to report
/// connected before the session is complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub session_id: SessionId,
    pub peers: Vec<PeerHandle>,
    pub expected_additional_peers: usize,
}

// ---------------------------------------------------------------------------
// MatchRequest
// ---------------------------------------------------------------------------

/// Parameters of a matchmaking search.
///
/// Built through [`MatchRequest::new`], which enforces the peer bounds.
/// `player_group` and `player_attributes` are provider-side hints (e.g.
/// "only match players on the same map"); matchkit forwards them untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRequest {
    min_peers: usize,
    max_peers: usize,
    /// 0 means "any group".
    pub player_group: u32,
    /// Bit mask of roles the local player wants to fill. 0 means none.
    pub player_attributes: u32,
}

impl MatchRequest {
    /// Upper bound on peers in one match.
    pub const MAX_PEERS: usize = 16;

    /// Creates a request for a match of `min_peers..=max_peers` players.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidPeerBounds`] unless
    /// `1 <= min_peers <= max_peers <= MAX_PEERS`.
    pub fn new(
        min_peers: usize,
        max_peers: usize,
    ) -> Result<Self, ProtocolError> {
        if min_peers == 0
            || min_peers > max_peers
            || max_peers > Self::MAX_PEERS
        {
            return Err(ProtocolError::InvalidPeerBounds {
                min: min_peers,
                max: max_peers,
            });
        }
        Ok(Self {
            min_peers,
            max_peers,
            player_group: 0,
            player_attributes: 0,
        })
    }

    /// Restricts matching to players in the same group.
    pub fn with_group(mut self, group: u32) -> Self {
        self.player_group = group;
        self
    }

    /// Sets the role mask of the local player.
    pub fn with_attributes(mut self, attributes: u32) -> Self {
        self.player_attributes = attributes;
        self
    }

    pub fn min_peers(&self) -> usize {
        self.min_peers
    }

    pub fn max_peers(&self) -> usize {
        self.max_peers
    }
}

// ---------------------------------------------------------------------------
// Recipient & Channel: where and how outbound data goes
// ---------------------------------------------------------------------------

/// Who should receive an outbound payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Broadcast to every peer in the session.
    All,

    /// Send to one peer.
    Peer(PeerHandle),

    /// Send to an explicit, non-empty subset of peers.
    Peers(Vec<PeerHandle>),
}

impl Recipient {
    /// Builds a [`Recipient::Peers`] target.
    ///
    /// # Errors
    /// An empty list would silently send nothing, so it's rejected.
    pub fn peers(
        peers: impl IntoIterator<Item = PeerHandle>,
    ) -> Result<Self, ProtocolError> {
        let peers: Vec<PeerHandle> = peers.into_iter().collect();
        if peers.is_empty() {
            return Err(ProtocolError::InvalidRequest(
                "recipient list is empty".into(),
            ));
        }
        Ok(Self::Peers(peers))
    }

    /// Returns `true` if `peer` is addressed by this recipient.
    pub fn includes(&self, peer: PeerHandle) -> bool {
        match self {
            Self::All => true,
            Self::Peer(p) => *p == peer,
            Self::Peers(list) => list.contains(&peer),
        }
    }
}

/// Delivery mode for outbound data.
///
/// Position updates sent many times a second can afford loss; a "game
/// over" message cannot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "PascalCase")]
pub enum Channel {
    /// Delivered in order, retransmitted until received.
    #[default]
    Reliable,

    /// Sent once. May be lost or reordered.
    Unreliable,
}
