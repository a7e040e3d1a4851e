//! Logging initialization.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "info";

/// Filter directive in effect: `RUST_LOG`, else the configured level, else `info`.
pub fn resolve_filter(rust_log: Option<&str>, configured: Option<&str>) -> String {
    rust_log
        .or(configured)
        .map(str::trim)
        .filter(|filter| !filter.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

/// Installs the global subscriber. Safe to call more than once.
pub fn init_logging(configured: Option<&str>) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let directive = resolve_filter(rust_log.as_deref(), configured);
    let env_filter =
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(std::env::var_os("NO_COLOR").is_none()),
        )
        .with(env_filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_filter_precedence() {
        assert_eq!(resolve_filter(Some("debug"), Some("warn")), "debug");
        assert_eq!(resolve_filter(None, Some("warn")), "warn");
        assert_eq!(resolve_filter(None, None), "info");
        assert_eq!(resolve_filter(Some("  "), Some("warn")), "info");
    }
}
