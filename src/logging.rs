//! Tracing subscriber setup for the `homematch` binary.
//!
//! Logs go to stderr so command output on stdout stays machine-readable.
//! The filter is taken from `RUST_LOG`, falling back to `info`, or to
//! `debug` for this crate when `verbose` is set.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "info,homematch=debug"
    } else {
        "warn,homematch=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    // try_init: a subscriber may already be installed (tests, embedding apps)
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();
}
