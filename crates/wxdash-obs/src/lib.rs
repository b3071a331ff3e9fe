//! Log setup shared by the proxy and the dashboard binaries.
//!
//! Events go to stderr as JSON lines, leaving stdout to the dashboard's
//! rendered view.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Used when `RUST_LOG` is unset or blank
pub const DEFAULT_FILTER: &str = "info,wxdash=debug";

fn filter_directives(rust_log: Option<&str>) -> &str {
    match rust_log.map(str::trim) {
        Some(directives) if !directives.is_empty() => directives,
        _ => DEFAULT_FILTER,
    }
}

/// Install the global subscriber for `service_name`. Call once, first thing in `main`.
pub fn init(service_name: &str) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = EnvFilter::new(filter_directives(rust_log.as_deref()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();

    tracing::info!(service = %service_name, "logging ready");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives() {
        assert_eq!(filter_directives(None), DEFAULT_FILTER);
        assert_eq!(filter_directives(Some("  ")), DEFAULT_FILTER);
        assert_eq!(filter_directives(Some("warn ")), "warn");
    }
}
