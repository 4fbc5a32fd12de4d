/// Errors reported by a [`SessionProvider`](crate::SessionProvider).
///
/// `Clone` because one failure may need to reach both the log and the
/// observer's end reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The user dismissed the search before a match was found.
    #[error("search cancelled")]
    Cancelled,

    /// The provider could not assemble a session.
    #[error("search failed: {0}")]
    SearchFailed(String),

    /// Identity lookup for a batch of peer handles failed.
    #[error("identity lookup failed: {0}")]
    LookupFailed(String),

    /// Delivering outbound data failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// The match itself failed (network loss, server kicked us, ...).
    #[error("session failed: {0}")]
    SessionFailed(String),

    /// Local player authentication failed.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The provider doesn't support the operation or is shut down.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    /// Returns `true` if the error only means the user walked away.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
