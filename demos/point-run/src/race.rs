use std::collections::BTreeMap;

use matchkit::prelude::PeerHandle;
use serde::{Deserialize, Serialize};

/// Steps from the start line to the finish.
pub const TRACK_LEN: u32 = 12;

/// What runners tell each other. JSON on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RaceMessage {
    Hello { name: String },
    Advance { position: u32 },
    Finished { winner: PeerHandle },
}

impl RaceMessage {
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Each runner's view of the race.
#[derive(Debug)]
pub struct Race {
    track_len: u32,
    positions: BTreeMap<PeerHandle, u32>,
    winner: Option<PeerHandle>,
}

impl Race {
    pub fn new(track_len: u32) -> Self {
        Self {
            track_len,
            positions: BTreeMap::new(),
            winner: None,
        }
    }

    /// Records a runner's position. Positions never move backwards, since
    /// updates may arrive out of order.
    ///
    /// Returns the winner if this update decided the race.
    pub fn advance(
        &mut self,
        runner: PeerHandle,
        position: u32,
    ) -> Option<PeerHandle> {
        let current = self.positions.entry(runner).or_insert(0);
        *current = (*current).max(position);

        if self.winner.is_none() && *current >= self.track_len {
            self.winner = Some(runner);
            return self.winner;
        }
        None
    }

    /// Accepts a winner announced by another runner. The first winner
    /// recorded stands.
    pub fn finish(&mut self, winner: PeerHandle) {
        self.winner.get_or_insert(winner);
    }

    pub fn winner(&self) -> Option<PeerHandle> {
        self.winner
    }

    pub fn position(&self, runner: PeerHandle) -> u32 {
        self.positions.get(&runner).copied().unwrap_or(0)
    }
}
