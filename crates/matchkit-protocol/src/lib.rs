//! Shared vocabulary for matchkit.
//!
//! This crate defines the types every other layer speaks in:
//!
//! - **Identities** ([`SessionId`], [`PeerHandle`], [`InviteId`],
//!   [`SearchTicket`]): opaque newtypes handed out by the session
//!   provider or by the coordinator itself.
//! - **Records** ([`Identity`], [`Candidate`]): what the provider
//!   returns when a search completes or a roster is resolved.
//! - **Requests** ([`MatchRequest`], [`Recipient`], [`Channel`]): what
//!   the application asks for.
//! - **Errors** ([`ProtocolError`]): rejected requests.
//!
//! # Architecture
//!
//! ```text
//! Provider seam (below) → Protocol (ids, requests) → Session (roster, connectivity)
//! ```
//!
//! Nothing here knows about tasks, channels, or state machines. Payload
//! bytes are never interpreted by matchkit; they travel as `Vec<u8>`.

mod error;
mod types;

pub use error::ProtocolError;
pub use types::{
    Candidate, Channel, Identity, InviteId, MatchRequest, PeerHandle,
    Recipient, SearchTicket, SessionId,
};
