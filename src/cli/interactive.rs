//! Interactive prompt accepting the control verbs line by line

use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::cli::commands::{self, ControlContext};
use crate::inference::InferenceRequest;

const BANNER: &str = "Entering interactive mode. Type 'help' for commands.";
const PROMPT: &str = "> ";
const HINT: &str = "Unknown command (type 'help').";
const HELP: &str = "Commands:
  run [model] [input]  - run one inference
  status               - show enabled/disabled
  enable [notes]       - enable
  disable [notes]      - disable
  help                 - show this list
  exit | quit          - leave interactive mode";

/// One parsed prompt line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Exit,
    Status,
    Enable(String),
    Disable(String),
    Run {
        model: Option<PathBuf>,
        input: Option<PathBuf>,
    },
    Unknown,
}

/// Split off the verb token; notes are the rest after one separating space
pub fn parse_line(line: &str) -> ReplCommand {
    let line = line.trim();
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));

    match verb {
        "help" => ReplCommand::Help,
        "exit" | "quit" => ReplCommand::Exit,
        "status" => ReplCommand::Status,
        "enable" => ReplCommand::Enable(rest.to_string()),
        "disable" => ReplCommand::Disable(rest.to_string()),
        "run" => {
            let mut args = rest.split_whitespace().map(PathBuf::from);
            ReplCommand::Run {
                model: args.next(),
                input: args.next(),
            }
        }
        _ => ReplCommand::Unknown,
    }
}

/// Read commands until `exit`/`quit` or EOF. Always returns exit code 0.
pub fn run_interactive<R: BufRead, W: Write>(
    ctx: &ControlContext,
    python: &str,
    mut input: R,
    out: &mut W,
) -> Result<i32> {
    writeln!(out, "{}", BANNER)?;

    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        // Lines are taken as bytes so a stray non-UTF-8 note cannot end the session
        let mut raw = Vec::new();
        if input.read_until(b'\n', &mut raw)? == 0 {
            writeln!(out)?;
            break;
        }
        let line = String::from_utf8_lossy(&raw);

        match parse_line(&line) {
            ReplCommand::Exit => break,
            ReplCommand::Help => writeln!(out, "{}", HELP)?,
            ReplCommand::Status => {
                commands::status(ctx, false, out)?;
            }
            ReplCommand::Enable(notes) => report(commands::enable(ctx, &notes, out)),
            ReplCommand::Disable(notes) => report(commands::disable(ctx, &notes, out)),
            ReplCommand::Run { model, input } => {
                let defaults = InferenceRequest::default();
                let request = InferenceRequest {
                    model: model.unwrap_or(defaults.model),
                    input: input.unwrap_or(defaults.input),
                    features: None,
                    python: python.to_string(),
                };
                commands::run(ctx, &request, out)?;
            }
            ReplCommand::Unknown => writeln!(out, "{}", HINT)?,
        }
    }

    Ok(0)
}

/// Failed saves are reported and the prompt keeps going
fn report(result: Result<i32>) {
    if let Err(e) = result {
        eprintln!("error: {:#}", e);
    }
}
