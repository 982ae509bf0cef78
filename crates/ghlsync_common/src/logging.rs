//! Logging setup shared by every ghlsync binary and test harness.

use std::str::FromStr;
use tracing::{info, warn, Level};
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber with a specific level for the `ghlsync` crates.
///
/// `RUST_LOG` is still honored for everything else. Calling this twice is
/// harmless; the second call leaves the existing subscriber in place.
pub fn init_with_level(level: Level) {
    // Directive targets match by prefix, so this covers every ghlsync_* crate.
    let mut filter = EnvFilter::from_default_env();
    match Directive::from_str(&format!("ghlsync={}", level)) {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(e) => eprintln!("Invalid log directive: {}", e),
    }

    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_thread_names(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Parse a configured level name, falling back to INFO.
pub fn level_from_str(level: Option<&str>) -> Level {
    match level {
        None => Level::INFO,
        Some(name) => Level::from_str(name.trim()).unwrap_or_else(|_| {
            warn!("Unknown log level '{}', using INFO", name);
            Level::INFO
        }),
    }
}

/// Log a result, with different messages for success and error cases.
///
/// Returns the original result so it can be used in a chain.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => tracing::error!("{}: {}", error_context, e),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_str() {
        assert_eq!(level_from_str(None), Level::INFO);
        assert_eq!(level_from_str(Some("debug")), Level::DEBUG);
        assert_eq!(level_from_str(Some(" WARN ")), Level::WARN);
        assert_eq!(level_from_str(Some("loud")), Level::INFO);
    }

    #[test]
    fn test_log_result_passes_through() {
        let ok: Result<u8, String> = log_result(Ok(3), "done", "failed");
        assert_eq!(ok, Ok(3));
        let err: Result<u8, String> = log_result(Err("nope".into()), "done", "failed");
        assert_eq!(err, Err("nope".to_string()));
    }
}
