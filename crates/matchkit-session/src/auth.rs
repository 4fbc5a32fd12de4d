//! Local-user authentication state.
//!
//! matchkit doesn't authenticate anyone. The provider does, and tells us
//! about it through [`ProviderEvent::AuthenticationChanged`]. The
//! [`IdentityGate`] just remembers the latest answer and lets interested
//! parties watch it change.
//!
//! Starting a search does *not* consult the gate. Whether an
//! unauthenticated user may search is the application's call.
//!
//! [`ProviderEvent::AuthenticationChanged`]: matchkit_provider::ProviderEvent::AuthenticationChanged

use tokio::sync::watch;

/// Whether the local user is signed in with the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    Authenticated,
    #[default]
    NotAuthenticated,
}

impl AuthState {
    pub fn from_flag(authenticated: bool) -> Self {
        if authenticated {
            Self::Authenticated
        } else {
            Self::NotAuthenticated
        }
    }

    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

/// Binary authentication state, updated only from provider notifications.
///
/// Backed by a `watch` channel: cloning the gate shares the same state,
/// and [`subscribe`](Self::subscribe) hands out receivers that wake up
/// whenever it flips.
#[derive(Debug, Clone)]
pub struct IdentityGate {
    state: watch::Sender<AuthState>,
}

impl IdentityGate {
    /// Creates a gate in the `NotAuthenticated` state.
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthState::NotAuthenticated);
        Self { state }
    }

    /// Records a provider notification. Returns `true` if the state changed.
    ///
    /// Repeated notifications with the same value are no-ops; they never
    /// toggle the state.
    pub fn set_authenticated(&self, authenticated: bool) -> bool {
        let next = AuthState::from_flag(authenticated);
        let changed = self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            tracing::info!(authenticated, "authentication changed");
        } else {
            tracing::debug!(authenticated, "authentication unchanged");
        }
        changed
    }

    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    /// Returns a receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}

impl Default for IdentityGate {
    fn default() -> Self {
        Self::new()
    }
}
