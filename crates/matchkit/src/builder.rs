//! `CoordinatorBuilder`: fluent construction of a session coordinator.

use std::sync::Arc;
use std::time::Duration;

use matchkit_coordinator::{
    CoordinatorConfig, CoordinatorHandle, ProviderEvents, SessionCoordinator,
};
use matchkit_provider::SessionProvider;

/// Builder for configuring and starting a coordinator.
///
/// # Example
///
/// ```rust,ignore
/// use matchkit::prelude::*;
///
/// let handle = CoordinatorBuilder::new()
///     .search_timeout(Duration::from_secs(60))
///     .spawn_with(|events| MyProvider::new(events));
/// handle.find_match(2, 4, observer)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoordinatorBuilder {
    config: CoordinatorConfig,
}

impl CoordinatorBuilder {
    /// Creates a builder with default settings (no timeouts).
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration, e.g. one loaded from a file.
    pub fn from_config(config: CoordinatorConfig) -> Self {
        Self { config }
    }

    /// Bounds how long a search may run before the session times out.
    pub fn search_timeout(mut self, timeout: Duration) -> Self {
        self.config.search_timeout = Some(timeout);
        self
    }

    /// Bounds how long a candidate may take to become active.
    pub fn assembly_timeout(mut self, timeout: Duration) -> Self {
        self.config.assembly_timeout = Some(timeout);
        self
    }

    /// Sets how many accepted invites a slow subscriber may lag behind.
    pub fn invite_capacity(mut self, capacity: usize) -> Self {
        self.config.invite_capacity = capacity;
        self
    }

    /// The configuration built so far.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Creates the coordinator without starting it.
    pub fn build(self) -> SessionCoordinator {
        SessionCoordinator::new(self.config)
    }

    /// Creates the coordinator, hands its event sink to `make_provider`,
    /// and starts it with the provider that returns.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_with<P, F>(self, make_provider: F) -> CoordinatorHandle
    where
        P: SessionProvider,
        F: FnOnce(ProviderEvents) -> P,
    {
        let coordinator = self.build();
        let provider = make_provider(coordinator.events());
        coordinator.spawn(Arc::new(provider))
    }
}
