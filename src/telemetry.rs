//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! Behavior:
//! - LOG_LEVEL (or RUST_LOG) controls the filter (e.g. "debug" or detailed directives like
//!   "info,lesson=debug,assistant=debug,hydralearn_backend=debug,tower_http=info,axum=info").
//! - LOG_FORMAT selects "pretty" (default), "compact", or "json" structured logs.
//!
//! Targets used across the crate:
//! - `hydralearn_backend`: startup, config, transport
//! - `lesson`: step transitions and grading
//! - `assistant`: gateway calls and fallbacks
//!
//! Tower HTTP TraceLayer still adds per-request spans; this complements it.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,lesson=debug,assistant=debug,hydralearn_backend=debug,tower_http=info,axum=info";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => {
            builder.json().init();
        }
        Ok("compact") => {
            builder.compact().init();
        }
        _ => {
            builder.init();
        }
    }
}
