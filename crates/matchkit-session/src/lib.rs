//! Session building blocks for matchkit.
//!
//! This crate holds the leaf components the coordinator drives while a
//! match session is being put together:
//!
//! 1. **Identity gating**: is the local user signed in? ([`IdentityGate`])
//! 2. **Roster resolution**: who are the peers? ([`RosterResolver`],
//!    [`Roster`])
//! 3. **Connectivity tracking**: has everyone shown up yet?
//!    ([`ConnectivityTracker`])
//! 4. **Lifecycle vocabulary**: [`SessionState`] and [`EndReason`]
//!
//! None of these spawn tasks or hold locks. They are plain state owned by
//! a single coordinator task.
//!
//! # How it fits in the stack
//!
//! ```text
//! Coordinator (above)  ← serializes events, drives these components
//!     ↕
//! Session Layer (this crate)  ← roster, connectivity, auth state
//!     ↕
//! Protocol Layer (below)  ← SessionId, PeerHandle, Identity
//! ```

mod auth;
mod connectivity;
mod error;
mod roster;
mod session;

pub use auth::{AuthState, IdentityGate};
pub use connectivity::{ConnectOutcome, ConnectivityTracker};
pub use error::SessionError;
pub use roster::{ResolveRequest, Roster, RosterOutcome, RosterResolver};
pub use session::{EndReason, SessionState};
