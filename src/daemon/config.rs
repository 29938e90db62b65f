//! Runtime settings for daemon mode
//!
//! Built from command-line arguments only; nothing here is persisted.

use std::path::PathBuf;

use crate::constants::{
    CONFIG_DIR, CONFIG_FILE_NAME, DEFAULT_INPUT_PATH, DEFAULT_INTERVAL_SECS, DEFAULT_LOG_PATH,
    DEFAULT_MODEL_PATH, DEFAULT_PYTHON,
};
use crate::inference::InferenceRequest;

/// Core daemon runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonSettings {
    /// Model path, resolved against the repository root when relative
    pub model_path: PathBuf,
    /// Input CSV, resolved against the repository root when relative
    pub input_path: PathBuf,
    /// Optional feature list forwarded to the entry point
    pub features_path: Option<PathBuf>,
    /// Interpreter for the entry point
    pub python: String,
    /// Seconds between inference runs while enabled (>= 1)
    pub interval_secs: u64,
    /// Append-only lifecycle log, relative to the working directory
    pub log_path: PathBuf,
    /// Shared on/off flag, relative to the working directory
    pub config_path: PathBuf,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            features_path: None,
            python: DEFAULT_PYTHON.to_string(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            config_path: PathBuf::from(CONFIG_DIR).join(CONFIG_FILE_NAME),
        }
    }
}

impl DaemonSettings {
    pub fn inference_request(&self) -> InferenceRequest {
        InferenceRequest {
            model: self.model_path.clone(),
            input: self.input_path.clone(),
            features: self.features_path.clone(),
            python: self.python.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid interval: {0}. Must be a positive whole number of seconds")]
    InvalidInterval(String),
}

/// Accept only integers >= 1; zero would busy-loop the daemon
pub fn parse_interval(raw: &str) -> Result<u64, SettingsError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(SettingsError::InvalidInterval(raw.to_string())),
    }
}
