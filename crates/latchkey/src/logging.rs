//! Log output for applications embedding Latchkey.
//!
//! Latchkey's crates only emit `tracing` events. Installing a subscriber
//! is the application's call; [`init`] is a ready-made one.

use tracing_subscriber::EnvFilter;

/// Installs a formatted stderr subscriber filtered by `filter`
/// (e.g. `"info"` or `"info,latchkey_session=debug"`).
///
/// `RUST_LOG`, when set, takes precedence over `filter`. Returns `false`
/// if a global subscriber was already installed, in which case nothing
/// changes.
pub fn init(filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_second_call_is_noop() {
        // Other tests in this binary may have installed one already, so
        // only the second call's outcome is certain.
        let _ = init("debug");

        assert!(!init("info"));
    }
}
