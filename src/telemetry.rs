//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Install the JSON log subscriber.
///
/// `RUST_LOG` wins over `default_directive` when it is set. Later calls are
/// no-ops, so tests and the binary can both call it.
pub fn init(default_directive: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(default_directive))
        .json()
        .with_current_span(true)
        .with_target(true)
        .try_init();
}

fn filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_is_harmless() {
        init("info");
        init("debug");
        tracing::info!(job_id = "j-1", "subscriber installed");
    }

    #[test]
    fn default_directive_applies_without_rust_log() {
        std::env::remove_var("RUST_LOG");
        assert_eq!(filter("warn").to_string(), "warn");
    }
}
