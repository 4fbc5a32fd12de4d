//! Log output setup for binaries built on matchkit.

use tracing_subscriber::EnvFilter;

/// Installs a `tracing` subscriber that prints to stderr.
///
/// The filter comes from `RUST_LOG`, falling back to `info`. Calling this
/// more than once is harmless; only the first call installs anything.
pub fn init() {
    init_with_default("info");
}

/// Like [`init`], but with a custom fallback filter such as
/// `"matchkit_coordinator=debug"`.
pub fn init_with_default(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
}
