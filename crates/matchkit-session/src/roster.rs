//! Roster resolution: turning peer handles into identities.
//!
//! The provider hands out opaque [`PeerHandle`]s. Showing a name on screen
//! needs an [`Identity`], and looking those up is a network round trip.
//! [`RosterResolver`] makes sure that round trip happens once per session:
//! one batched request for the whole handle set, never one call per peer.
//!
//! The resolver doesn't make the call itself. [`RosterResolver::begin`]
//! returns a [`ResolveRequest`] describing the batch; the coordinator runs
//! it against the provider and feeds the answer to
//! [`RosterResolver::complete`], which either builds the whole [`Roster`]
//! or reports failure. A partially filled roster never exists.

use std::collections::{BTreeMap, HashSet};

use matchkit_protocol::{Identity, PeerHandle, SessionId};
use matchkit_provider::ProviderError;

use crate::SessionError;

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Resolved mapping of peer handles to identities for one session.
///
/// Built once by the resolver, then read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    entries: BTreeMap<PeerHandle, Identity>,
}

impl Roster {
    /// An empty roster. A valid, successful result.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: &PeerHandle) -> Option<&Identity> {
        self.entries.get(handle)
    }

    pub fn contains(&self, handle: &PeerHandle) -> bool {
        self.entries.contains_key(handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Handles in ascending order.
    pub fn handles(&self) -> impl Iterator<Item = PeerHandle> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PeerHandle, &Identity)> {
        self.entries.iter()
    }
}

impl FromIterator<Identity> for Roster {
    fn from_iter<I: IntoIterator<Item = Identity>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|id| (id.handle, id)).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// RosterResolver
// ---------------------------------------------------------------------------

/// One batched identity lookup the caller should issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    pub session_id: SessionId,
    /// Deduplicated, in first-seen order.
    pub handles: Vec<PeerHandle>,
}

/// What a completed lookup amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterOutcome {
    /// Every requested handle was looked up. The roster is final.
    Resolved(Roster),

    /// The lookup failed. Fatal for the session; never retried here.
    Failed(ProviderError),

    /// The answer belongs to a batch that is no longer outstanding.
    Stale,
}

/// Tracks the single outstanding roster lookup.
#[derive(Debug, Default)]
pub struct RosterResolver {
    pending: Option<ResolveRequest>,
    resolved: Option<SessionId>,
}

impl RosterResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepares the batched lookup for `session_id`.
    ///
    /// A pending batch for a *different* session is dropped; its answer
    /// will come back as [`RosterOutcome::Stale`].
    ///
    /// # Errors
    /// - [`SessionError::ResolutionInFlight`]: a batch for this session is
    ///   already outstanding
    /// - [`SessionError::AlreadyResolved`]: this session's roster exists
    pub fn begin(
        &mut self,
        session_id: SessionId,
        handles: impl IntoIterator<Item = PeerHandle>,
    ) -> Result<ResolveRequest, SessionError> {
        if self.resolved == Some(session_id) {
            return Err(SessionError::AlreadyResolved(session_id));
        }
        match &self.pending {
            Some(p) if p.session_id == session_id => {
                return Err(SessionError::ResolutionInFlight(session_id));
            }
            Some(p) => {
                tracing::debug!(
                    superseded = %p.session_id,
                    %session_id,
                    "dropping outstanding roster batch"
                );
            }
            None => {}
        }

        let mut seen = HashSet::new();
        let handles: Vec<PeerHandle> =
            handles.into_iter().filter(|h| seen.insert(*h)).collect();

        let request = ResolveRequest {
            session_id,
            handles,
        };
        self.pending = Some(request.clone());
        self.resolved = None;
        tracing::debug!(
            %session_id,
            peers = request.handles.len(),
            "roster batch issued"
        );
        Ok(request)
    }

    /// Applies the provider's answer for `session_id`.
    ///
    /// Identities for handles that were never requested are ignored. An
    /// empty answer to an empty request is a success, not a failure.
    pub fn complete(
        &mut self,
        session_id: SessionId,
        result: Result<Vec<Identity>, ProviderError>,
    ) -> RosterOutcome {
        let request = match self.pending.take() {
            Some(p) if p.session_id == session_id => p,
            other => {
                // Not ours. Put back whatever was pending.
                self.pending = other;
                return RosterOutcome::Stale;
            }
        };

        match result {
            Ok(identities) => {
                let requested: HashSet<PeerHandle> =
                    request.handles.iter().copied().collect();
                let roster: Roster = identities
                    .into_iter()
                    .filter(|id| {
                        let known = requested.contains(&id.handle);
                        if !known {
                            tracing::debug!(
                                %session_id,
                                peer = %id.handle,
                                "ignoring identity that was not requested"
                            );
                        }
                        known
                    })
                    .collect();
                if roster.len() < requested.len() {
                    tracing::debug!(
                        %session_id,
                        requested = requested.len(),
                        resolved = roster.len(),
                        "provider resolved fewer identities than requested"
                    );
                }
                self.resolved = Some(session_id);
                RosterOutcome::Resolved(roster)
            }
            Err(e) => RosterOutcome::Failed(e),
        }
    }

    /// Forgets any outstanding batch and any resolved session.
    pub fn cancel(&mut self) {
        if let Some(p) = self.pending.take() {
            tracing::debug!(
                session_id = %p.session_id,
                "roster batch abandoned"
            );
        }
        self.resolved = None;
    }

    /// Returns `true` if a batch for `session_id` is outstanding.
    pub fn is_pending(&self, session_id: SessionId) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| p.session_id == session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(id: u64) -> SessionId {
        SessionId(id)
    }

    fn peer(id: u64) -> PeerHandle {
        PeerHandle(id)
    }

    fn identities(ids: &[u64]) -> Vec<Identity> {
        ids.iter()
            .map(|&i| Identity::new(peer(i), format!("player{i}")))
            .collect()
    }

    // =====================================================================
    // begin()
    // =====================================================================

    #[test]
    fn test_begin_dedups_handles_in_order() {
        let mut resolver = RosterResolver::new();

        let req = resolver
            .begin(sid(1), [peer(3), peer(1), peer(3), peer(2)])
            .unwrap();

        assert_eq!(req.session_id, sid(1));
        assert_eq!(req.handles, vec![peer(3), peer(1), peer(2)]);
        assert!(resolver.is_pending(sid(1)));
    }

    #[test]
    fn test_begin_twice_same_session_returns_in_flight() {
        let mut resolver = RosterResolver::new();
        resolver.begin(sid(1), [peer(1)]).unwrap();

        assert_eq!(
            resolver.begin(sid(1), [peer(1)]),
            Err(SessionError::ResolutionInFlight(sid(1)))
        );
    }

    #[test]
    fn test_begin_after_resolved_returns_already_resolved() {
        let mut resolver = RosterResolver::new();
        resolver.begin(sid(1), [peer(1)]).unwrap();
        resolver.complete(sid(1), Ok(identities(&[1])));

        assert_eq!(
            resolver.begin(sid(1), [peer(1)]),
            Err(SessionError::AlreadyResolved(sid(1)))
        );
    }

    #[test]
    fn test_begin_new_session_supersedes_pending() {
        let mut resolver = RosterResolver::new();
        resolver.begin(sid(1), [peer(1)]).unwrap();

        resolver.begin(sid(2), [peer(2)]).unwrap();

        assert!(!resolver.is_pending(sid(1)));
        assert!(resolver.is_pending(sid(2)));
        // The first batch's answer is now stale.
        assert_eq!(
            resolver.complete(sid(1), Ok(identities(&[1]))),
            RosterOutcome::Stale
        );
        assert!(resolver.is_pending(sid(2)));
    }

    // =====================================================================
    // complete()
    // =====================================================================

    #[test]
    fn test_complete_success_builds_full_roster() {
        let mut resolver = RosterResolver::new();
        resolver.begin(sid(1), [peer(1), peer(2)]).unwrap();

        let outcome = resolver.complete(sid(1), Ok(identities(&[2, 1])));

        let RosterOutcome::Resolved(roster) = outcome else {
            panic!("expected Resolved, got {outcome:?}");
        };
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.get(&peer(1)).unwrap().alias, "player1");
        assert_eq!(
            roster.handles().collect::<Vec<_>>(),
            vec![peer(1), peer(2)]
        );
        assert!(!resolver.is_pending(sid(1)));
    }

    #[test]
    fn test_complete_empty_request_empty_result_is_success() {
        let mut resolver = RosterResolver::new();
        resolver.begin(sid(1), []).unwrap();

        let outcome = resolver.complete(sid(1), Ok(Vec::new()));

        assert_eq!(outcome, RosterOutcome::Resolved(Roster::empty()));
    }

    #[test]
    fn test_complete_error_reports_failure() {
        let mut resolver = RosterResolver::new();
        resolver.begin(sid(1), [peer(1)]).unwrap();

        let err = ProviderError::LookupFailed("timeout".into());
        let outcome = resolver.complete(sid(1), Err(err.clone()));

        assert_eq!(outcome, RosterOutcome::Failed(err));
        assert!(!resolver.is_pending(sid(1)));
    }

    #[test]
    fn test_complete_ignores_unrequested_identities() {
        let mut resolver = RosterResolver::new();
        resolver.begin(sid(1), [peer(1)]).unwrap();

        let outcome = resolver.complete(sid(1), Ok(identities(&[1, 9])));

        let RosterOutcome::Resolved(roster) = outcome else {
            panic!("expected Resolved");
        };
        assert!(roster.contains(&peer(1)));
        assert!(!roster.contains(&peer(9)));
    }

    #[test]
    fn test_complete_without_pending_is_stale() {
        let mut resolver = RosterResolver::new();
        assert_eq!(
            resolver.complete(sid(1), Ok(Vec::new())),
            RosterOutcome::Stale
        );
    }

    #[test]
    fn test_cancel_makes_answer_stale() {
        let mut resolver = RosterResolver::new();
        resolver.begin(sid(1), [peer(1)]).unwrap();

        resolver.cancel();

        assert_eq!(
            resolver.complete(sid(1), Ok(identities(&[1]))),
            RosterOutcome::Stale
        );
        // And the session may be resolved again after a cancel.
        assert!(resolver.begin(sid(1), [peer(1)]).is_ok());
    }
}
