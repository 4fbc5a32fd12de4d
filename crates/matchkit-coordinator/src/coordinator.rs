//! Coordinator actor: a single Tokio task that owns the match session.
//!
//! Everything that can change the session arrives as a [`Command`] on one
//! unbounded channel: application requests from [`CoordinatorHandle`],
//! provider callbacks from [`ProviderEvents`], and the results of provider
//! calls the actor spawned earlier. The actor applies them one at a time,
//! so no two transitions ever interleave.
//!
//! Provider calls never run on the actor itself. Each one is spawned on
//! its own task, and its result is posted back as a command tagged with
//! the search ticket or session id it was issued for.
//!
//! A provider may report connectivity or data for a session before the
//! search that found it has returned. While `Searching`, session-tagged
//! events are held back and replayed once the candidate is known.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use matchkit_protocol::{
    Candidate, Channel, Identity, InviteId, MatchRequest, PeerHandle,
    Recipient, SearchTicket, SessionId,
};
use matchkit_provider::{ProviderError, ProviderEvent, SessionProvider};
use matchkit_session::{
    ConnectOutcome, ConnectivityTracker, EndReason, IdentityGate, Roster,
    RosterOutcome, RosterResolver, SessionState,
};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{self, Instant};

use crate::{
    CoordinatorConfig, CoordinatorError, SessionObserver, SessionSnapshot,
};

/// Most session-tagged events held back while `Searching`.
const EARLY_EVENT_LIMIT: usize = 256;

/// What a search attempt asks the provider for.
#[derive(Debug, Clone)]
pub(crate) enum SearchOrigin {
    Request(MatchRequest),
    Invite(InviteId),
}

/// Commands processed by the coordinator actor.
pub(crate) enum Command {
    /// Start a new search, replacing whatever was in flight.
    BeginSearch {
        ticket: SearchTicket,
        origin: SearchOrigin,
        observer: Box<dyn SessionObserver>,
    },

    /// Send bytes to peers of the active session (fire-and-forget).
    SendData {
        recipient: Recipient,
        bytes: Vec<u8>,
        channel: Channel,
    },

    /// End the current session with `EndReason::Closed`.
    Close,

    /// Drop everything and go back to `Idle` without notifying anyone.
    Reset,

    /// Ask the provider to authenticate the local user.
    Authenticate,

    /// Request a copy of the session state.
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },

    /// A callback from the provider's event stream.
    Provider(ProviderEvent),

    /// A spawned search (or invite acceptance) finished.
    SearchCompleted {
        ticket: SearchTicket,
        result: Result<Candidate, ProviderError>,
    },

    /// A spawned roster lookup finished.
    RosterResolved {
        session_id: SessionId,
        result: Result<Vec<Identity>, ProviderError>,
    },

    /// A spawned authentication finished.
    AuthenticationCompleted { result: Result<bool, ProviderError> },

    /// Stop the actor.
    Shutdown,
}

// ---------------------------------------------------------------------------
// SessionCoordinator: construction
// ---------------------------------------------------------------------------

/// An unstarted coordinator.
///
/// Construction is split in two so the provider's glue can get its
/// [`ProviderEvents`] sink before the provider itself is handed over:
///
/// ```rust,ignore
/// let coordinator = SessionCoordinator::new(CoordinatorConfig::default());
/// let provider = Arc::new(MyProvider::new(coordinator.events()));
/// let handle = coordinator.spawn(provider);
/// ```
pub struct SessionCoordinator {
    config: CoordinatorConfig,
    sender: mpsc::UnboundedSender<Command>,
    receiver: mpsc::UnboundedReceiver<Command>,
    gate: IdentityGate,
    invites: broadcast::Sender<InviteId>,
}

impl SessionCoordinator {
    /// Creates a coordinator that hasn't started running yet.
    pub fn new(config: CoordinatorConfig) -> Self {
        let config = config.validated();
        let (sender, receiver) = mpsc::unbounded_channel();
        let (invites, _) = broadcast::channel(config.invite_capacity);
        Self {
            config,
            sender,
            receiver,
            gate: IdentityGate::new(),
            invites,
        }
    }

    /// Returns the sink the provider pushes its callbacks into.
    pub fn events(&self) -> ProviderEvents {
        ProviderEvents {
            sender: self.sender.clone(),
        }
    }

    /// Spawns the actor task and returns a handle to it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<P: SessionProvider>(
        self,
        provider: Arc<P>,
    ) -> CoordinatorHandle {
        let actor = CoordinatorActor {
            provider,
            config: self.config,
            commands: self.receiver,
            loopback: self.sender.downgrade(),
            gate: self.gate.clone(),
            invites: self.invites.clone(),
            state: SessionState::Idle,
            ticket: None,
            session_id: None,
            observer: None,
            tracker: None,
            resolver: RosterResolver::new(),
            roster: None,
            deadline: None,
            early_events: VecDeque::new(),
        };

        tokio::spawn(actor.run());

        CoordinatorHandle {
            sender: self.sender,
            tickets: Arc::new(AtomicU64::new(0)),
            gate: self.gate,
            invites: self.invites,
        }
    }
}

// ---------------------------------------------------------------------------
// CoordinatorHandle: the application's side
// ---------------------------------------------------------------------------

/// Handle to a running coordinator.
///
/// Cheap to clone. Every method except [`snapshot`](Self::snapshot) only
/// enqueues a command and returns; results come back through the
/// observer.
#[derive(Clone)]
pub struct CoordinatorHandle {
    sender: mpsc::UnboundedSender<Command>,
    tickets: Arc<AtomicU64>,
    gate: IdentityGate,
    invites: broadcast::Sender<InviteId>,
}

impl CoordinatorHandle {
    /// Starts a search for a match of `min_peers..=max_peers` players.
    ///
    /// # Errors
    /// [`CoordinatorError::InvalidRequest`] if the bounds are invalid,
    /// [`CoordinatorError::Unavailable`] if the coordinator stopped.
    pub fn find_match(
        &self,
        min_peers: usize,
        max_peers: usize,
        observer: impl SessionObserver,
    ) -> Result<SearchTicket, CoordinatorError> {
        let request = MatchRequest::new(min_peers, max_peers)?;
        self.begin_search(request, observer)
    }

    /// Starts a search, replacing any search or session in flight.
    ///
    /// The previous observer is released without a callback, and every
    /// late callback from the previous attempt is discarded.
    pub fn begin_search(
        &self,
        request: MatchRequest,
        observer: impl SessionObserver,
    ) -> Result<SearchTicket, CoordinatorError> {
        self.start(SearchOrigin::Request(request), Box::new(observer))
    }

    /// Joins the match behind an accepted invitation.
    ///
    /// Behaves exactly like [`begin_search`](Self::begin_search) from the
    /// coordinator's point of view.
    pub fn accept_invite(
        &self,
        invite: InviteId,
        observer: impl SessionObserver,
    ) -> Result<SearchTicket, CoordinatorError> {
        self.start(SearchOrigin::Invite(invite), Box::new(observer))
    }

    fn start(
        &self,
        origin: SearchOrigin,
        observer: Box<dyn SessionObserver>,
    ) -> Result<SearchTicket, CoordinatorError> {
        let ticket =
            SearchTicket(self.tickets.fetch_add(1, Ordering::Relaxed) + 1);
        self.send(Command::BeginSearch {
            ticket,
            origin,
            observer,
        })?;
        Ok(ticket)
    }

    /// Sends bytes to peers of the active session.
    ///
    /// Dropped (with a debug log) if no session is active. Delivery
    /// failures are logged, never retried.
    pub fn send_data(
        &self,
        recipient: Recipient,
        bytes: impl Into<Vec<u8>>,
        channel: Channel,
    ) -> Result<(), CoordinatorError> {
        self.send(Command::SendData {
            recipient,
            bytes: bytes.into(),
            channel,
        })
    }

    /// Ends the current session. A live session ends with
    /// [`EndReason::Closed`]; a pending search is abandoned silently.
    pub fn close(&self) -> Result<(), CoordinatorError> {
        self.send(Command::Close)
    }

    /// Returns to `Idle` immediately, without notifying the observer.
    pub fn reset(&self) -> Result<(), CoordinatorError> {
        self.send(Command::Reset)
    }

    /// Asks the provider to authenticate the local user. The result lands
    /// in the identity gate.
    pub fn authenticate(&self) -> Result<(), CoordinatorError> {
        self.send(Command::Authenticate)
    }

    /// Returns a copy of the current session state.
    ///
    /// Reflects every command enqueued before this call.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, CoordinatorError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply })?;
        rx.await.map_err(|_| CoordinatorError::Unavailable)
    }

    pub fn is_authenticated(&self) -> bool {
        self.gate.is_authenticated()
    }

    /// The identity gate this coordinator updates.
    pub fn identity_gate(&self) -> &IdentityGate {
        &self.gate
    }

    /// Receives every invitation the local user accepts.
    pub fn subscribe_invites(&self) -> broadcast::Receiver<InviteId> {
        self.invites.subscribe()
    }

    /// A sink for provider callbacks, same as
    /// [`SessionCoordinator::events`].
    pub fn events(&self) -> ProviderEvents {
        ProviderEvents {
            sender: self.sender.clone(),
        }
    }

    /// Stops the coordinator. A live session ends with `Closed` first.
    pub fn shutdown(&self) -> Result<(), CoordinatorError> {
        self.send(Command::Shutdown)
    }

    fn send(&self, cmd: Command) -> Result<(), CoordinatorError> {
        self.sender
            .send(cmd)
            .map_err(|_| CoordinatorError::Unavailable)
    }
}

// ---------------------------------------------------------------------------
// ProviderEvents: the provider's side
// ---------------------------------------------------------------------------

/// Sink for the provider's callback stream.
///
/// Cheap to clone, never blocks, and safe to call from any thread,
/// including threads outside the Tokio runtime.
#[derive(Clone)]
pub struct ProviderEvents {
    sender: mpsc::UnboundedSender<Command>,
}

impl ProviderEvents {
    /// Pushes one provider event to the coordinator.
    pub fn emit(&self, event: ProviderEvent) -> Result<(), CoordinatorError> {
        self.sender
            .send(Command::Provider(event))
            .map_err(|_| CoordinatorError::Unavailable)
    }

    pub fn connectivity_changed(
        &self,
        session_id: SessionId,
        peer: PeerHandle,
        connected: bool,
    ) -> Result<(), CoordinatorError> {
        self.emit(ProviderEvent::ConnectivityChanged {
            session_id,
            peer,
            connected,
        })
    }

    pub fn data_received(
        &self,
        session_id: SessionId,
        peer: PeerHandle,
        bytes: impl Into<Vec<u8>>,
    ) -> Result<(), CoordinatorError> {
        self.emit(ProviderEvent::DataReceived {
            session_id,
            peer,
            bytes: bytes.into(),
        })
    }

    pub fn provider_error(
        &self,
        session_id: SessionId,
        error: ProviderError,
    ) -> Result<(), CoordinatorError> {
        self.emit(ProviderEvent::ProviderError { session_id, error })
    }
}

// ---------------------------------------------------------------------------
// CoordinatorActor
// ---------------------------------------------------------------------------

/// Why the actor loop woke up.
enum Wake {
    Command(Option<Command>),
    Deadline,
}

/// The internal coordinator state. Runs inside a Tokio task.
struct CoordinatorActor<P: SessionProvider> {
    provider: Arc<P>,
    config: CoordinatorConfig,
    commands: mpsc::UnboundedReceiver<Command>,
    /// Weak so spawned provider calls don't keep the actor alive.
    loopback: mpsc::WeakUnboundedSender<Command>,
    gate: IdentityGate,
    invites: broadcast::Sender<InviteId>,

    state: SessionState,
    /// The search attempt that owns the coordinator.
    ticket: Option<SearchTicket>,
    /// The current session. Every session-tagged event is compared
    /// against this before anything else happens.
    session_id: Option<SessionId>,
    observer: Option<Box<dyn SessionObserver>>,
    tracker: Option<ConnectivityTracker>,
    resolver: RosterResolver,
    roster: Option<Roster>,
    deadline: Option<Instant>,
    /// Session-tagged events that arrived before the candidate.
    early_events: VecDeque<ProviderEvent>,
}

impl<P: SessionProvider> CoordinatorActor<P> {
    /// Runs the actor loop until shutdown or until every handle is gone.
    async fn run(mut self) {
        tracing::info!("session coordinator started");

        loop {
            let wake = match self.deadline {
                Some(deadline) => tokio::select! {
                    cmd = self.commands.recv() => Wake::Command(cmd),
                    () = time::sleep_until(deadline) => Wake::Deadline,
                },
                None => Wake::Command(self.commands.recv().await),
            };

            match wake {
                Wake::Deadline => self.on_timeout(),
                Wake::Command(Some(Command::Shutdown)) => {
                    if self.state.is_live() {
                        self.end(EndReason::Closed);
                    }
                    break;
                }
                Wake::Command(Some(cmd)) => self.handle(cmd),
                Wake::Command(None) => break,
            }
        }

        tracing::info!("session coordinator stopped");
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::BeginSearch {
                ticket,
                origin,
                observer,
            } => self.begin_search(ticket, origin, observer),
            Command::SendData {
                recipient,
                bytes,
                channel,
            } => self.send_data(recipient, bytes, channel),
            Command::Close => self.close(),
            Command::Reset => {
                tracing::info!(state = %self.state, "coordinator reset");
                self.teardown();
                self.observer = None;
                self.state = SessionState::Idle;
            }
            Command::Authenticate => self.authenticate(),
            Command::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            Command::Provider(event) => self.on_provider_event(event),
            Command::SearchCompleted { ticket, result } => {
                self.on_search_completed(ticket, result);
            }
            Command::RosterResolved { session_id, result } => {
                self.on_roster_resolved(session_id, result);
            }
            Command::AuthenticationCompleted { result } => match result {
                Ok(authenticated) => {
                    self.gate.set_authenticated(authenticated);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "authentication failed");
                }
            },
            // Handled by `run`.
            Command::Shutdown => {}
        }
    }

    fn on_provider_event(&mut self, event: ProviderEvent) {
        if self.state == SessionState::Searching && event.session_id().is_some()
        {
            self.hold_early_event(event);
            return;
        }

        match event {
            ProviderEvent::ConnectivityChanged {
                session_id,
                peer,
                connected,
            } => self.on_connectivity_changed(session_id, peer, connected),
            ProviderEvent::DataReceived {
                session_id,
                peer,
                bytes,
            } => self.on_data_received(session_id, peer, &bytes),
            ProviderEvent::ProviderError { session_id, error } => {
                self.on_provider_error(session_id, error);
            }
            ProviderEvent::InviteAccepted { invite } => {
                self.on_invite_accepted(invite);
            }
            ProviderEvent::AuthenticationChanged { authenticated } => {
                self.gate.set_authenticated(authenticated);
            }
        }
    }

    // -- Search ------------------------------------------------------------

    fn begin_search(
        &mut self,
        ticket: SearchTicket,
        origin: SearchOrigin,
        observer: Box<dyn SessionObserver>,
    ) {
        if !self.state.is_idle_eligible() {
            tracing::info!(
                state = %self.state,
                superseded = ?self.ticket,
                "abandoning previous search"
            );
        }
        self.teardown();

        self.ticket = Some(ticket);
        self.observer = Some(observer);
        self.state = SessionState::Searching;
        self.deadline = deadline_after(self.config.search_timeout);
        tracing::info!(%ticket, ?origin, "search started");

        let provider = Arc::clone(&self.provider);
        let loopback = self.loopback.clone();
        tokio::spawn(async move {
            let result = match origin {
                SearchOrigin::Request(request) => {
                    provider.begin_match_search(&request).await
                }
                SearchOrigin::Invite(invite) => {
                    provider.accept_invite(invite).await
                }
            };
            if let Some(tx) = loopback.upgrade() {
                let _ = tx.send(Command::SearchCompleted { ticket, result });
            }
        });
    }

    fn on_search_completed(
        &mut self,
        ticket: SearchTicket,
        result: Result<Candidate, ProviderError>,
    ) {
        if self.ticket != Some(ticket) || self.state != SessionState::Searching
        {
            tracing::debug!(
                %ticket,
                current = ?self.ticket,
                state = %self.state,
                "discarding stale search result"
            );
            return;
        }

        match result {
            Ok(candidate) => self.on_candidate_found(candidate),
            Err(ProviderError::Cancelled) => {
                tracing::info!(%ticket, "search cancelled");
                self.teardown();
                self.observer = None;
                self.state = SessionState::Idle;
            }
            Err(e) => self.end(EndReason::SearchFailed(e)),
        }
    }

    fn on_candidate_found(&mut self, candidate: Candidate) {
        let Candidate {
            session_id,
            peers,
            expected_additional_peers,
        } = candidate;

        self.session_id = Some(session_id);
        self.tracker = Some(ConnectivityTracker::new(expected_additional_peers));
        self.state = SessionState::Assembling;
        self.deadline = deadline_after(self.config.assembly_timeout);
        tracing::info!(
            %session_id,
            peers = peers.len(),
            expected = expected_additional_peers,
            "candidate session found"
        );

        match self.resolver.begin(session_id, peers) {
            Ok(request) => {
                let provider = Arc::clone(&self.provider);
                let loopback = self.loopback.clone();
                tokio::spawn(async move {
                    let result =
                        provider.resolve_identities(request.handles).await;
                    if let Some(tx) = loopback.upgrade() {
                        let _ = tx.send(Command::RosterResolved {
                            session_id: request.session_id,
                            result,
                        });
                    }
                });
            }
            Err(e) => {
                tracing::warn!(%session_id, error = %e, "roster not requested");
            }
        }

        self.replay_early_events(session_id);
    }

    fn hold_early_event(&mut self, event: ProviderEvent) {
        if self.early_events.len() >= EARLY_EVENT_LIMIT {
            tracing::warn!(
                session_id = ?event.session_id(),
                "early event buffer full, dropping event"
            );
            return;
        }
        tracing::debug!(
            session_id = ?event.session_id(),
            "holding event until the candidate arrives"
        );
        self.early_events.push_back(event);
    }

    /// Applies held-back events for `session_id` in arrival order. Events
    /// for any other session are stale.
    fn replay_early_events(&mut self, session_id: SessionId) {
        let early = std::mem::take(&mut self.early_events);
        for event in early {
            if event.session_id() == Some(session_id) {
                self.on_provider_event(event);
            } else {
                tracing::debug!(
                    session_id = ?event.session_id(),
                    current = %session_id,
                    "discarding stale early event"
                );
            }
        }
    }

    // -- Session events ----------------------------------------------------

    /// The load-bearing guard: is this event about the current session?
    fn is_current(&self, session_id: SessionId, what: &'static str) -> bool {
        if self.session_id == Some(session_id) {
            return true;
        }
        tracing::debug!(
            %session_id,
            current = ?self.session_id,
            event = what,
            "discarding stale event"
        );
        false
    }

    fn on_roster_resolved(
        &mut self,
        session_id: SessionId,
        result: Result<Vec<Identity>, ProviderError>,
    ) {
        if !self.is_current(session_id, "roster_resolved") {
            return;
        }

        match self.resolver.complete(session_id, result) {
            RosterOutcome::Resolved(roster) => {
                tracing::info!(
                    %session_id,
                    peers = roster.len(),
                    "roster resolved"
                );
                self.roster = Some(roster);
                self.try_activate();
            }
            RosterOutcome::Failed(e) => {
                self.end(EndReason::ResolutionFailed(e));
            }
            RosterOutcome::Stale => {
                tracing::debug!(%session_id, "discarding stale roster");
            }
        }
    }

    fn on_connectivity_changed(
        &mut self,
        session_id: SessionId,
        peer: PeerHandle,
        connected: bool,
    ) {
        if !self.is_current(session_id, "connectivity_changed") {
            return;
        }
        let Some(tracker) = self.tracker.as_mut() else {
            return;
        };

        if !connected {
            let was_connected = tracker.peer_disconnected(peer);
            tracing::debug!(%session_id, %peer, was_connected, "peer left");
            if self.state.is_live() {
                self.end(EndReason::PeerDisconnected(peer));
            }
            return;
        }

        match tracker.peer_connected(peer) {
            ConnectOutcome::Counted { remaining } => {
                tracing::debug!(%session_id, %peer, remaining, "peer connected");
                self.try_activate();
            }
            ConnectOutcome::Duplicate => {
                tracing::debug!(%session_id, %peer, "duplicate connect ignored");
            }
            ConnectOutcome::AlreadySatisfied => {
                tracing::debug!(
                    %session_id,
                    %peer,
                    "connect ignored, no peers outstanding"
                );
            }
        }
    }

    fn on_data_received(
        &mut self,
        session_id: SessionId,
        peer: PeerHandle,
        bytes: &[u8],
    ) {
        if !self.is_current(session_id, "data_received") {
            return;
        }
        if let Some(observer) = &self.observer {
            observer.on_data_received(peer, bytes);
        }
    }

    fn on_provider_error(&mut self, session_id: SessionId, error: ProviderError) {
        if !self.is_current(session_id, "provider_error") {
            return;
        }
        self.end(EndReason::ProviderError(error));
    }

    fn on_invite_accepted(&mut self, invite: InviteId) {
        tracing::info!(%invite, "invite accepted");
        if self.invites.send(invite).is_err() {
            tracing::debug!(%invite, "no invite subscribers");
        }
    }

    fn on_timeout(&mut self) {
        self.deadline = None;
        match self.state {
            SessionState::Searching | SessionState::Assembling => {
                let roster_pending = self
                    .session_id
                    .is_some_and(|s| self.resolver.is_pending(s));
                tracing::info!(
                    state = %self.state,
                    roster_pending,
                    "bounded wait elapsed"
                );
                self.end(EndReason::TimedOut);
            }
            _ => {}
        }
    }

    // -- Application requests ----------------------------------------------

    fn send_data(&self, recipient: Recipient, bytes: Vec<u8>, channel: Channel) {
        let session_id = match (self.state, self.session_id) {
            (SessionState::Active, Some(session_id)) => session_id,
            _ => {
                tracing::debug!(
                    state = %self.state,
                    "dropping outbound data, no active session"
                );
                return;
            }
        };

        let provider = Arc::clone(&self.provider);
        tokio::spawn(async move {
            let len = bytes.len();
            if let Err(e) = provider
                .send_data(session_id, recipient, bytes, channel)
                .await
            {
                tracing::warn!(%session_id, len, error = %e, "send failed");
            }
        });
    }

    fn close(&mut self) {
        match self.state {
            SessionState::Assembling | SessionState::Active => {
                self.end(EndReason::Closed);
            }
            SessionState::Searching => {
                tracing::info!(ticket = ?self.ticket, "search closed");
                self.teardown();
                self.observer = None;
                self.state = SessionState::Idle;
            }
            _ => {}
        }
    }

    fn authenticate(&self) {
        let provider = Arc::clone(&self.provider);
        let loopback = self.loopback.clone();
        tokio::spawn(async move {
            let result = provider.authenticate_local_user().await;
            if let Some(tx) = loopback.upgrade() {
                let _ = tx.send(Command::AuthenticationCompleted { result });
            }
        });
    }

    // -- Transitions -------------------------------------------------------

    /// Moves `Assembling` to `Active` once the roster exists and every
    /// expected peer has connected. Fires `on_session_started` exactly once.
    fn try_activate(&mut self) {
        if self.state != SessionState::Assembling || self.roster.is_none() {
            return;
        }
        if !self.tracker.as_ref().is_some_and(|t| t.is_satisfied()) {
            return;
        }
        let Some(session_id) = self.session_id else {
            return;
        };

        self.state = SessionState::Active;
        self.deadline = None;
        tracing::info!(%session_id, "session started");

        let snapshot = self.snapshot();
        if let Some(observer) = &self.observer {
            observer.on_session_started(&snapshot);
        }

        let provider = Arc::clone(&self.provider);
        tokio::spawn(async move {
            provider.finish_matchmaking(session_id).await;
        });
    }

    /// Terminates the current attempt and notifies the observer once.
    fn end(&mut self, reason: EndReason) {
        let next = reason.terminal_state();
        match &reason {
            EndReason::PeerDisconnected(_) | EndReason::Closed => {
                tracing::info!(
                    session_id = ?self.session_id,
                    from = %self.state,
                    %reason,
                    "session ended"
                );
            }
            _ => {
                tracing::warn!(
                    session_id = ?self.session_id,
                    from = %self.state,
                    %reason,
                    "session ended"
                );
            }
        }

        self.teardown();
        self.state = next;
        if let Some(observer) = self.observer.take() {
            observer.on_session_ended(&reason);
        }
    }

    /// Clears session identity and in-flight work. Anything still in
    /// flight will come back stale.
    fn teardown(&mut self) {
        self.ticket = None;
        self.session_id = None;
        self.tracker = None;
        self.roster = None;
        self.resolver.cancel();
        self.deadline = None;
        self.early_events.clear();
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            ticket: self.ticket,
            session_id: self.session_id,
            expected_additional_peers: self
                .tracker
                .as_ref()
                .map(ConnectivityTracker::remaining),
            roster: self.roster.clone(),
        }
    }
}

fn deadline_after(timeout: Option<Duration>) -> Option<Instant> {
    timeout.map(|t| Instant::now() + t)
}
