//! Global constants for antikeylogger
//!
//! Centralized location for paths, defaults and the daemon's log vocabulary

/// Subsystem identifier for diagnostics routed to the macOS Unified Logging System
pub const APP_SUBSYSTEM: &str = "com.antikeylogger.control";

/// Config file location, relative to the working directory
pub const CONFIG_DIR: &str = "config";
pub const CONFIG_FILE_NAME: &str = "antivirus_config.json";

/// Inference entry point, relative to the repository root
pub const SCRIPTS_DIR: &str = "scripts";
pub const INFERENCE_SCRIPT: &str = "predecir_keylogger.py";

/// Per-run capture of the inference's combined stdout+stderr, relative to the repository root
pub const CAPTURE_DIR: &str = "logs";
pub const CAPTURE_FILE_NAME: &str = "last_inference_output.txt";

pub const DEFAULT_MODEL_PATH: &str = "backup/modelo/modelo_keylogger_from_datos.onnx";
pub const DEFAULT_INPUT_PATH: &str = "DATOS/Keylogger_Detection_Dataset.csv";
pub const DEFAULT_LOG_PATH: &str = "logs/antivirus_daemon.log";
pub const DEFAULT_INTERVAL_SECS: u64 = 10;

#[cfg(windows)]
pub const DEFAULT_PYTHON: &str = "python";
#[cfg(not(windows))]
pub const DEFAULT_PYTHON: &str = "python3";

/// Seconds between config polls while idle
pub const IDLE_POLL_SECS: u64 = 2;

/// Exit code reported when the interpreter could not be spawned
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// Exit code for usage errors and failed control operations
pub const USAGE_EXIT_CODE: i32 = 1;

// Daemon lifecycle log lines
pub const LOG_START: &str = "[daemon] start";
pub const LOG_RUNNING: &str = "[daemon] enabled -> running inference";
pub const LOG_EXIT_CODE_PREFIX: &str = "[daemon] inference exit code: ";
pub const LOG_IDLE: &str = "[daemon] disabled -> idle";
pub const LOG_STOPPING: &str = "[daemon] stopping";
