//! Tracing subscriber setup
//!
//! Logs always go to stderr so that `check` can print its report on stdout.
//! `RUST_LOG` wins over the level given on the command line.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable that switches on JSON log lines
pub const LOG_JSON_ENV: &str = "LOCALE_MT_LOG_JSON";

pub fn setup_logging(json: bool, default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (tests, embedding) keeps the first subscriber.
    let result = if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init()
    };
    if let Err(e) = result {
        tracing::debug!(error = %e, "logging already initialized");
    }
}

/// Whether `LOCALE_MT_LOG_JSON` asks for JSON output
pub fn should_use_json() -> bool {
    std::env::var(LOG_JSON_ENV)
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}
