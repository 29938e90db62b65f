//! Verb dispatch for the control CLI
//!
//! Each verb writes its user-facing output to the given sink and returns the
//! process exit code. `daemon` is not handled here; it needs signal setup and
//! lives in `main`.

use anyhow::{Context, Result};
use std::io::Write;

use crate::config::{ConfigRecord, ConfigStore};
use crate::constants::USAGE_EXIT_CODE;
use crate::inference::{InferenceRequest, Invoker};

/// Where the verbs act: the config store and the repository root for inference
#[derive(Debug, Clone)]
pub struct ControlContext {
    pub store: ConfigStore,
    pub invoker: Invoker,
}

pub fn enable<W: Write>(ctx: &ControlContext, notes: &str, out: &mut W) -> Result<i32> {
    set_enabled(ctx, true, notes, out)
}

pub fn disable<W: Write>(ctx: &ControlContext, notes: &str, out: &mut W) -> Result<i32> {
    set_enabled(ctx, false, notes, out)
}

fn set_enabled<W: Write>(ctx: &ControlContext, enabled: bool, notes: &str, out: &mut W) -> Result<i32> {
    ctx.store
        .save(enabled, notes)
        .with_context(|| format!("Failed to {} antikeylogger", if enabled { "enable" } else { "disable" }))?;
    writeln!(out, "{}", if enabled { "enabled" } else { "disabled" })?;
    Ok(0)
}

pub fn status<W: Write>(ctx: &ControlContext, json: bool, out: &mut W) -> Result<i32> {
    let record = ctx.store.read_all();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&record)?)?;
    } else {
        format_status(&record, out)?;
    }
    Ok(0)
}

/// `enabled: <bool>`, then `last_changed:` and non-empty `notes:` when present
pub fn format_status<W: Write>(record: &ConfigRecord, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "enabled: {}", record.enabled)?;
    if let Some(last_changed) = &record.last_changed {
        writeln!(out, "last_changed: {}", last_changed)?;
    }
    if let Some(notes) = record.notes.as_deref().filter(|n| !n.is_empty()) {
        writeln!(out, "notes: {}", notes)?;
    }
    Ok(())
}

/// One inference; the exit code is the inference's own
pub fn run<W: Write>(ctx: &ControlContext, request: &InferenceRequest, out: &mut W) -> Result<i32> {
    match ctx.invoker.run_to(request, out) {
        Ok(code) => {
            writeln!(out, "model exit: {}", code)?;
            Ok(code)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            Ok(USAGE_EXIT_CODE)
        }
    }
}
