//! Logging bootstrap
//!
//! Category output is forwarded to `tracing`; this module installs a
//! subscriber for processes that do not bring their own.

use tracing::Level;
use tracing_subscriber::EnvFilter;

use knobs_types::Severity;

/// Install a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`
///
/// Does nothing if a global subscriber is already set.
pub fn init() {
    init_with_level(Level::INFO);
}

/// Install a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `level`
pub fn init_with_level(level: Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// `tracing` level used for messages of `severity`
///
/// `Unspecified` has no level of its own and is never emitted.
pub fn severity_to_level(severity: Severity) -> Option<Level> {
    match severity {
        Severity::Unspecified => None,
        Severity::Spam => Some(Level::TRACE),
        Severity::Debug => Some(Level::DEBUG),
        Severity::Info => Some(Level::INFO),
        Severity::Warning => Some(Level::WARN),
        Severity::Error | Severity::Fatal => Some(Level::ERROR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_does_not_panic() {
        init();
        init_with_level(Level::DEBUG);
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(severity_to_level(Severity::Spam), Some(Level::TRACE));
        assert_eq!(severity_to_level(Severity::Warning), Some(Level::WARN));
        assert_eq!(severity_to_level(Severity::Fatal), Some(Level::ERROR));
        assert_eq!(severity_to_level(Severity::Unspecified), None);
    }
}
