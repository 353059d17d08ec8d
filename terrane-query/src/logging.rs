//! Logging infrastructure.
//!
//! Statement builders emit `tracing` events at finalization. This module
//! provides optional env-driven subscriber setup, controlled by:
//!
//! - `TERRANE_DEBUG=true|1|yes` - enable debug logging
//! - `TERRANE_LOG_LEVEL=trace|debug|info|warn|error` - set a specific level
//! - `TERRANE_LOG_FORMAT=pretty|compact|json` - set the output format
//!
//! ```rust,no_run
//! use terrane_query::logging;
//!
//! // Initialize once at startup.
//! logging::init();
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `TERRANE_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("TERRANE_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Get the configured log level from `TERRANE_LOG_LEVEL`.
///
/// Defaults to "debug" if `TERRANE_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    if let Ok(level) = env::var("TERRANE_LOG_LEVEL") {
        match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => {
                if is_debug_enabled() {
                    "debug"
                } else {
                    "warn"
                }
            }
        }
    } else if is_debug_enabled() {
        "debug"
    } else {
        "warn"
    }
}

/// Get the configured log format from `TERRANE_LOG_FORMAT`.
///
/// Defaults to "pretty".
pub fn get_log_format() -> &'static str {
    env::var("TERRANE_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "json" => "json",
            "compact" => "compact",
            _ => "pretty",
        })
        .unwrap_or("pretty")
}

/// Initialize the logging system. Call once at application startup;
/// subsequent calls are no-ops. Does nothing unless `TERRANE_DEBUG` or
/// `TERRANE_LOG_LEVEL` is set, so embedding applications keep control of
/// their own subscriber by default.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("TERRANE_LOG_LEVEL").is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!("terrane_query={}", level))
                .unwrap_or_else(|_| EnvFilter::new("warn"));

            match get_log_format() {
                "json" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().json())
                        .init();
                }
                "compact" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().compact())
                        .init();
                }
                _ => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().pretty())
                        .init();
                }
            }

            tracing::info!(
                level = level,
                format = get_log_format(),
                "terrane logging initialized"
            );
        }

        #[cfg(not(feature = "tracing-subscriber"))]
        {
            // No subscriber feature: stay silent unless the embedding
            // application installs its own.
        }
    });
}
