//! Match session lifecycle coordination for matchkit.
//!
//! The coordinator runs as one Tokio task (actor model) that owns the
//! current session: it starts searches, waits for the provider to
//! assemble a candidate, resolves the roster, counts peers in, relays
//! data, and tears everything down when a peer leaves or the provider
//! fails.
//!
//! Every provider callback is tagged with the session (or search ticket)
//! it belongs to. The actor compares that tag with its current one before
//! touching any state, so late callbacks from an abandoned session are
//! dropped instead of reaching the new observer.
//!
//! # Key types
//!
//! - [`SessionCoordinator`]: builds and spawns the actor
//! - [`CoordinatorHandle`]: what the application talks to
//! - [`ProviderEvents`]: where the provider's glue pushes callbacks
//! - [`SessionObserver`]: what the application implements to hear back
//! - [`CoordinatorConfig`]: optional bounded waits

mod config;
mod coordinator;
mod error;
mod observer;

pub use config::CoordinatorConfig;
pub use coordinator::{CoordinatorHandle, ProviderEvents, SessionCoordinator};
pub use error::CoordinatorError;
pub use observer::{SessionEvent, SessionObserver, SessionSnapshot};
