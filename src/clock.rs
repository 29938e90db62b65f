//! Clock and process environment adapter
//!
//! Provides the UTC timestamp format shared by the config store, the working
//! directory lookup, and INT/TERM registration for graceful shutdown.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// strftime pattern for `YYYY-MM-DDTHH:MM:SSZ`
const ISO_Z_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Current UTC instant at second precision with a trailing `Z`
pub fn now_iso_z() -> String {
    format_iso_z(&Utc::now())
}

pub fn format_iso_z(instant: &DateTime<Utc>) -> String {
    instant.format(ISO_Z_FORMAT).to_string()
}

pub fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to determine current working directory")
}

/// Register SIGINT and SIGTERM against a shared flag.
///
/// The returned flag flips to `true` once either signal is delivered; nothing
/// else writes to it.
pub fn install_shutdown_flag() -> Result<Arc<AtomicBool>> {
    let shutdown = Arc::new(AtomicBool::new(false));

    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&shutdown))
        .context("Failed to register SIGINT handler")?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&shutdown))
        .context("Failed to register SIGTERM handler")?;

    Ok(shutdown)
}
