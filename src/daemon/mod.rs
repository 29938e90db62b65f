//! Daemon mode: the cadence loop behind the on/off flag
//!
//! Two observable states:
//! - Idle: config disabled or absent; re-poll every 2 seconds
//! - Running: config enabled; run inference, log its exit code, then wait
//!   `interval` seconds before re-reading the config
//!
//! All waits are cut into slices (1 second in production) so that INT/TERM
//! is noticed within one slice. An inference already in flight is not
//! interrupted.

pub mod config;
pub mod logging;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ConfigStore;
use crate::constants::{
    IDLE_POLL_SECS, LOG_EXIT_CODE_PREFIX, LOG_IDLE, LOG_RUNNING, LOG_START, LOG_STOPPING,
};
use crate::daemon::config::DaemonSettings;
use crate::daemon::logging::DaemonLog;
use crate::inference::{BoundInvoker, Inference, Invoker};

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("Failed to open daemon log {path}: {source}")]
    LogOpen {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    Idle,
    Running,
}

/// Cadence loop over a config store and an inference backend
pub struct Daemon<I: Inference> {
    store: ConfigStore,
    inference: I,
    log: DaemonLog,
    interval_secs: u64,
    shutdown: Arc<AtomicBool>,
    slice: Duration,
    state: DaemonState,
}

impl<I: Inference> Daemon<I> {
    pub fn new(
        store: ConfigStore,
        inference: I,
        log: DaemonLog,
        interval_secs: u64,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            store,
            inference,
            log,
            interval_secs,
            shutdown,
            slice: Duration::from_secs(1),
            state: DaemonState::Idle,
        }
    }

    /// Length of one sleep slice; a "second" of interval is one slice
    pub fn with_slice(mut self, slice: Duration) -> Self {
        self.slice = slice;
        self
    }

    pub fn state(&self) -> DaemonState {
        self.state
    }

    fn keep_running(&self) -> bool {
        !self.shutdown.load(Ordering::Relaxed)
    }

    /// Run until the shutdown flag is raised
    pub fn run(&mut self) {
        self.log.line_or_warn(LOG_START);

        while self.keep_running() {
            self.step();
        }

        self.log.line_or_warn(LOG_STOPPING);
    }

    /// One poll of the config followed by the matching wait
    fn step(&mut self) {
        if self.store.is_enabled() {
            self.state = DaemonState::Running;
            self.log.line_or_warn(LOG_RUNNING);

            let code = self.inference.invoke();
            self.log
                .line_or_warn(&format!("{}{}", LOG_EXIT_CODE_PREFIX, code));

            self.sleep_slices(self.interval_secs);
        } else {
            if self.state == DaemonState::Running {
                self.log.line_or_warn(LOG_IDLE);
            }
            self.state = DaemonState::Idle;

            self.sleep_slices(IDLE_POLL_SECS);
        }
    }

    fn sleep_slices(&self, count: u64) {
        for _ in 0..count {
            if !self.keep_running() {
                break;
            }
            std::thread::sleep(self.slice);
        }
    }
}

/// Open the log, wire the real invoker, and loop until INT/TERM
pub fn run_daemon(settings: &DaemonSettings, shutdown: Arc<AtomicBool>) -> Result<(), DaemonError> {
    let log = DaemonLog::open(&settings.log_path).map_err(|source| DaemonError::LogOpen {
        path: settings.log_path.clone(),
        source,
    })?;

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let invoker = Invoker::from_dir(&cwd);
    log::info!(
        "daemon using repository root {} (interval {}s)",
        invoker.root().display(),
        settings.interval_secs
    );

    let store = ConfigStore::new(settings.config_path.clone());
    let inference = BoundInvoker::new(invoker, settings.inference_request());

    Daemon::new(store, inference, log, settings.interval_secs, shutdown).run();
    Ok(())
}
