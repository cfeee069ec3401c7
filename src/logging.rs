//! Logging setup
//!
//! `RUST_LOG` overrides the level (e.g. `RUST_LOG=mining_selector=trace`).

use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the global subscriber.
///
/// Defaults to `info`, or `debug` when `verbose` is set. `json` switches to
/// one JSON object per line. Logs go to stderr so command output on stdout
/// stays machine-readable.
pub fn init(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(verbose)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Debug-level logging routed through the test harness
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
