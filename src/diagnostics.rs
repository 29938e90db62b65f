//! Diagnostics backend for the `log` facade
//!
//! On macOS records go to the Unified Logging System under
//! [`APP_SUBSYSTEM`]; elsewhere they are written to stderr.

use log::LevelFilter;

#[cfg(target_os = "macos")]
use crate::constants::APP_SUBSYSTEM;

/// `warn` by default, `debug` with `--verbose`
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Install the backend. A second call is a no-op.
pub fn init(verbose: bool) {
    #[cfg(target_os = "macos")]
    {
        let installed = log::set_boxed_logger(Box::new(oslog::OsLogger::new(APP_SUBSYSTEM)));
        if installed.is_ok() {
            log::set_max_level(level_for(verbose));
        }
    }

    // The fmt subscriber also installs the `log` bridge, capped at its own level
    #[cfg(not(target_os = "macos"))]
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(subscriber_level(verbose))
        .with_target(false)
        .try_init();
}

#[cfg(not(target_os = "macos"))]
fn subscriber_level(verbose: bool) -> tracing_subscriber::filter::LevelFilter {
    use tracing_subscriber::filter::LevelFilter as Filter;
    match level_for(verbose) {
        LevelFilter::Debug => Filter::DEBUG,
        _ => Filter::WARN,
    }
}
