//! Per-peer connectivity counting.
//!
//! The provider reports a candidate session together with how many more
//! peers it still expects. Each of those peers later sends a "connected"
//! signal. The session is assembled once the count reaches zero.
//!
//! Providers are allowed to repeat themselves, so the tracker remembers
//! which peers it already counted.

use std::collections::HashSet;

use matchkit_protocol::PeerHandle;

/// What a "peer connected" signal did to the outstanding count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// The peer was counted; `remaining` peers are still expected.
    Counted { remaining: usize },

    /// This peer was already counted. Nothing changed.
    Duplicate,

    /// The count was already zero. Nothing changed.
    AlreadySatisfied,
}

/// Counts down `expected_additional_peers` for one session.
#[derive(Debug, Clone)]
pub struct ConnectivityTracker {
    remaining: usize,
    counted: HashSet<PeerHandle>,
}

impl ConnectivityTracker {
    /// Starts tracking with the provider-reported count.
    pub fn new(expected_additional_peers: usize) -> Self {
        Self {
            remaining: expected_additional_peers,
            counted: HashSet::new(),
        }
    }

    /// Applies a "peer connected" signal.
    ///
    /// Decrements by one, floored at zero. A peer is counted at most once.
    pub fn peer_connected(&mut self, peer: PeerHandle) -> ConnectOutcome {
        if self.counted.contains(&peer) {
            return ConnectOutcome::Duplicate;
        }
        if self.remaining == 0 {
            return ConnectOutcome::AlreadySatisfied;
        }
        self.counted.insert(peer);
        self.remaining -= 1;
        ConnectOutcome::Counted {
            remaining: self.remaining,
        }
    }

    /// Applies a "peer disconnected" signal. Returns `true` if the peer
    /// had been counted as connected.
    ///
    /// The outstanding count is left alone: a departure ends the session
    /// whatever the count, so the peer is never expected again.
    pub fn peer_disconnected(&mut self, peer: PeerHandle) -> bool {
        self.counted.remove(&peer)
    }

    /// Peers still expected to connect.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// `true` once every expected peer has connected.
    pub fn is_satisfied(&self) -> bool {
        self.remaining == 0
    }
}
