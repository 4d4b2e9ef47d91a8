//! Tracing bootstrap
//!
//! Filter precedence: `--log-level`, then `EXPOSOME_LOG`, then
//! `warn,exposome=info`. Log lines go to stderr so command reports on stdout
//! stay clean.

use std::sync::Once;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter
pub const LOG_ENV_VAR: &str = "EXPOSOME_LOG";

/// Filter used when nothing else is configured
pub const DEFAULT_FILTER: &str = "warn,exposome=info";

static INIT: Once = Once::new();

/// Build the filter for an optional `--log-level` value
#[must_use]
pub fn filter_for(level: Option<&str>) -> EnvFilter {
    level
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_env(LOG_ENV_VAR).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber
///
/// Safe to call more than once; only the first call takes effect.
pub fn init_tracing(level: Option<&str>) {
    INIT.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .compact(),
            )
            .with(filter_for(level))
            .try_init();
    });
}
