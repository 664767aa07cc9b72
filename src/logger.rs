//! Log output for the command line tool.
//!
//! Library code only emits `tracing` events; nothing is printed unless a
//! subscriber is installed. The binary installs one with [`init_logger`].
//!
//! Graph construction logs a summary per pass at DEBUG and every skipped
//! unresolved reference at TRACE, so `RUST_LOG=bundlescope=trace` shows
//! exactly which ids in a report did not resolve.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "bundlescope=debug";
const QUIET_FILTER: &str = "bundlescope=error";
const DEFAULT_FILTER: &str = "bundlescope=warn";

/// Pick the log filter for the given flags.
///
/// `verbose` wins over `quiet`; with neither, `RUST_LOG` is honored before
/// falling back to warnings only.
pub fn log_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber. Call once, before any logging.
///
/// Logs go to stderr so command output on stdout stays machine readable.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(log_filter(verbose, quiet))
        .with(fmt_layer)
        .init();
}
