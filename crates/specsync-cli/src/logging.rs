//! Structured logging with environment variable configuration.
//!
//! Logs go to stderr so report output on stdout stays machine-readable.
//! Filter precedence, highest first: the `--log-level` flag, the
//! `SPECSYNC_LOG` environment variable, then `warn`.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

fn filter_directive(flag: Option<&str>) -> String {
    flag.map(str::to_string)
        .or_else(|| std::env::var("SPECSYNC_LOG").ok())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Initialise the logging subsystem.
///
/// If a global subscriber is already set the error is ignored; the first
/// subscriber wins, which is the expected behaviour in tests.
pub(crate) fn init(flag: Option<&str>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter_directive(flag)))
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
