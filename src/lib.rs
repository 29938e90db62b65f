//! antikeylogger - keylogger classifier control harness
//!
//! This library exposes the persistent on/off flag, the inference invoker
//! and the daemon cadence loop used by the `antikeylogger` binary.

pub mod cli;
pub mod clock;
pub mod config;
pub mod constants;
pub mod daemon;
pub mod diagnostics;
pub mod inference;
