//! An in-process session provider: every runner joins one hub, and the
//! hub pairs the first two searches into a session.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use matchkit::prelude::*;
use tokio::sync::oneshot;

struct Member {
    alias: String,
    events: ProviderEvents,
}

struct Waiting {
    peer: PeerHandle,
    reply: oneshot::Sender<Candidate>,
}

#[derive(Default)]
struct HubState {
    members: HashMap<PeerHandle, Member>,
    waiting: Option<Waiting>,
}

/// Shared meeting point for loopback providers.
#[derive(Clone, Default)]
pub struct LoopbackHub {
    state: Arc<Mutex<HubState>>,
}

impl LoopbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a runner and returns its provider.
    pub fn join(
        &self,
        peer: PeerHandle,
        alias: impl Into<String>,
        events: ProviderEvents,
    ) -> LoopbackProvider {
        if let Ok(mut state) = self.state.lock() {
            state.members.insert(
                peer,
                Member {
                    alias: alias.into(),
                    events,
                },
            );
        }
        LoopbackProvider {
            hub: self.clone(),
            me: peer,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HubState>, ProviderError> {
        self.state
            .lock()
            .map_err(|_| ProviderError::Unavailable("hub poisoned".into()))
    }
}

/// One runner's view of the hub.
pub struct LoopbackProvider {
    hub: LoopbackHub,
    me: PeerHandle,
}

impl SessionProvider for LoopbackProvider {
    async fn begin_match_search(
        &self,
        _request: &MatchRequest,
    ) -> Result<Candidate, ProviderError> {
        let rx = {
            let mut state = self.hub.lock()?;
            if let Some(waiting) = state.waiting.take() {
                if waiting.peer != self.me {
                    let mut peers = vec![waiting.peer, self.me];
                    peers.sort();
                    let candidate = Candidate {
                        session_id: SessionId::generate(),
                        peers,
                        expected_additional_peers: 0,
                    };
                    if waiting.reply.send(candidate.clone()).is_ok() {
                        tracing::info!(
                            session_id = %candidate.session_id,
                            "loopback paired runners"
                        );
                        return Ok(candidate);
                    }
                }
            }

            let (reply, rx) = oneshot::channel();
            state.waiting = Some(Waiting {
                peer: self.me,
                reply,
            });
            rx
        };

        rx.await.map_err(|_| ProviderError::Cancelled)
    }

    async fn resolve_identities(
        &self,
        handles: Vec<PeerHandle>,
    ) -> Result<Vec<Identity>, ProviderError> {
        let state = self.hub.lock()?;
        Ok(handles
            .into_iter()
            .filter_map(|h| {
                state
                    .members
                    .get(&h)
                    .map(|m| Identity::new(h, m.alias.clone()))
            })
            .collect())
    }

    async fn send_data(
        &self,
        session_id: SessionId,
        recipient: Recipient,
        bytes: Vec<u8>,
        _channel: Channel,
    ) -> Result<(), ProviderError> {
        let targets: Vec<ProviderEvents> = {
            let state = self.hub.lock()?;
            state
                .members
                .iter()
                .filter(|(peer, _)| **peer != self.me && recipient.includes(**peer))
                .map(|(_, m)| m.events.clone())
                .collect()
        };

        for events in targets {
            events
                .data_received(session_id, self.me, bytes.clone())
                .map_err(|e| ProviderError::SendFailed(e.to_string()))?;
        }
        Ok(())
    }

    async fn authenticate_local_user(&self) -> Result<bool, ProviderError> {
        Ok(self.hub.lock()?.members.contains_key(&self.me))
    }
}
