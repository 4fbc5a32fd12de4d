//! Coordinator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a coordinator instance.
///
/// Waits are unbounded by default: a search or assembly that the provider
/// never finishes stays in `Searching`/`Assembling` until the application
/// closes it. Set a timeout to end such sessions with
/// [`EndReason::TimedOut`](matchkit_session::EndReason::TimedOut).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Longest time to stay in `Searching`. `None` waits forever.
    pub search_timeout: Option<Duration>,

    /// Longest time to stay in `Assembling` (roster lookup plus peers
    /// connecting). `None` waits forever.
    pub assembly_timeout: Option<Duration>,

    /// How many accepted invites a lagging subscriber may fall behind.
    pub invite_capacity: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            search_timeout: None,
            assembly_timeout: None,
            invite_capacity: 16,
        }
    }
}

impl CoordinatorConfig {
    /// Returns a copy with `invite_capacity` forced to at least 1.
    ///
    /// `tokio::sync::broadcast` panics on a zero capacity.
    pub fn validated(mut self) -> Self {
        if self.invite_capacity == 0 {
            tracing::warn!("invite_capacity is 0, using 1");
            self.invite_capacity = 1;
        }
        self
    }
}
