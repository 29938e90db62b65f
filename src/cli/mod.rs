//! CLI argument parsing and validation module
//!
//! Handles the command-line interface using clap:
//! - Control verbs (enable / disable / status)
//! - One-shot inference (`run`) and the interactive prompt
//! - Daemon mode and its cadence settings
//!
//! Every parse failure maps to exit code 1 in `main`.

pub mod commands;
pub mod interactive;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_INPUT_PATH, DEFAULT_LOG_PATH, DEFAULT_MODEL_PATH, DEFAULT_PYTHON,
};
use crate::daemon::config::{parse_interval, DaemonSettings};
use crate::inference::InferenceRequest;

/// Parsed invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    /// Raise diagnostics from warn to debug
    pub verbose: bool,
    pub verb: Verb,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    Enable { notes: String },
    Disable { notes: String },
    Status { json: bool },
    Run(InferenceRequest),
    Interactive { python: String },
    Daemon(DaemonSettings),
}

fn version() -> &'static str {
    concat!(env!("ANTIKEYLOGGER_VERSION"), " (", env!("GIT_HASH"), ")")
}

fn python_arg() -> Arg {
    Arg::new("python")
        .long("python")
        .value_name("EXE")
        .default_value(DEFAULT_PYTHON)
        .help("Interpreter used to launch the inference entry point")
}

fn features_arg() -> Arg {
    Arg::new("features")
        .long("features")
        .value_name("PATH")
        .value_parser(value_parser!(PathBuf))
        .help("Feature list forwarded to the entry point as --features")
}

/// Free text: leading dashes are kept and extra words are joined with spaces
fn notes_arg() -> Arg {
    Arg::new("notes")
        .value_name("NOTES")
        .num_args(1..)
        .allow_hyphen_values(true)
        .help("Free-text note stored alongside the flag")
}

pub fn build_command() -> Command {
    Command::new("antikeylogger")
        .version(version())
        .about("Toggle and schedule keylogger classifier runs")
        .long_about(
            "Control harness for a keylogger classifier. A persistent flag in \
             ./config/antivirus_config.json decides whether the daemon periodically \
             runs inference over a feature file.",
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print diagnostic messages"),
        )
        .subcommand(
            Command::new("enable")
                .about("Persist enabled=true")
                .arg(notes_arg()),
        )
        .subcommand(
            Command::new("disable")
                .about("Persist enabled=false")
                .arg(notes_arg()),
        )
        .subcommand(
            Command::new("status")
                .about("Show the flag, when it last changed, and its notes")
                .arg(
                    Arg::new("json")
                        .short('j')
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output in JSON format"),
                ),
        )
        .subcommand(
            Command::new("run")
                .about("Run one inference and exit with its exit code")
                .arg(
                    Arg::new("model")
                        .value_name("MODEL")
                        .value_parser(value_parser!(PathBuf))
                        .default_value(DEFAULT_MODEL_PATH)
                        .help("ONNX model path"),
                )
                .arg(
                    Arg::new("input")
                        .value_name("INPUT")
                        .value_parser(value_parser!(PathBuf))
                        .default_value(DEFAULT_INPUT_PATH)
                        .help("Feature-vector CSV path"),
                )
                .arg(python_arg())
                .arg(features_arg()),
        )
        .subcommand(
            Command::new("interactive")
                .about("Prompt loop accepting the same verbs")
                .arg(python_arg()),
        )
        .subcommand(
            Command::new("daemon")
                .about("Run inference on a cadence while the flag is enabled")
                .arg(
                    Arg::new("model")
                        .long("model")
                        .value_name("PATH")
                        .value_parser(value_parser!(PathBuf))
                        .default_value(DEFAULT_MODEL_PATH)
                        .help("ONNX model path"),
                )
                .arg(
                    Arg::new("input")
                        .long("input")
                        .value_name("PATH")
                        .value_parser(value_parser!(PathBuf))
                        .default_value(DEFAULT_INPUT_PATH)
                        .help("Feature-vector CSV path"),
                )
                .arg(
                    Arg::new("interval")
                        .long("interval")
                        .value_name("SECONDS")
                        .value_parser(parse_interval)
                        .help("Seconds between inference runs while enabled [default: 10]"),
                )
                .arg(
                    Arg::new("log")
                        .long("log")
                        .value_name("PATH")
                        .value_parser(value_parser!(PathBuf))
                        .default_value(DEFAULT_LOG_PATH)
                        .help("Append-only lifecycle log"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_name("PATH")
                        .value_parser(value_parser!(PathBuf))
                        .help("Config file to poll instead of ./config/antivirus_config.json"),
                )
                .arg(python_arg())
                .arg(features_arg()),
        )
}

/// Parse the process arguments
pub fn parse_args() -> Result<CliArgs, clap::Error> {
    parse_from(std::env::args_os())
}

pub fn parse_from<I, T>(args: I) -> Result<CliArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_command().try_get_matches_from(args)?;
    let verbose = matches.get_flag("verbose");

    let verb = match matches.subcommand() {
        Some(("enable", sub)) => Verb::Enable { notes: notes(sub) },
        Some(("disable", sub)) => Verb::Disable { notes: notes(sub) },
        Some(("status", sub)) => Verb::Status { json: sub.get_flag("json") },
        Some(("run", sub)) => Verb::Run(InferenceRequest {
            model: path(sub, "model"),
            input: path(sub, "input"),
            features: sub.get_one::<PathBuf>("features").cloned(),
            python: string(sub, "python"),
        }),
        Some(("interactive", sub)) => Verb::Interactive { python: string(sub, "python") },
        Some(("daemon", sub)) => {
            let defaults = DaemonSettings::default();
            Verb::Daemon(DaemonSettings {
                model_path: path(sub, "model"),
                input_path: path(sub, "input"),
                features_path: sub.get_one::<PathBuf>("features").cloned(),
                python: string(sub, "python"),
                interval_secs: sub.get_one::<u64>("interval").copied().unwrap_or(defaults.interval_secs),
                log_path: path(sub, "log"),
                config_path: sub
                    .get_one::<PathBuf>("config")
                    .cloned()
                    .unwrap_or(defaults.config_path),
            })
        }
        _ => {
            return Err(build_command().error(
                clap::error::ErrorKind::MissingSubcommand,
                "a verb is required",
            ))
        }
    };

    Ok(CliArgs { verbose, verb })
}

fn string(matches: &ArgMatches, id: &str) -> String {
    matches.get_one::<String>(id).cloned().unwrap_or_default()
}

fn notes(matches: &ArgMatches) -> String {
    matches
        .get_many::<String>("notes")
        .map(|words| words.map(String::as_str).collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

fn path(matches: &ArgMatches, id: &str) -> PathBuf {
    matches.get_one::<PathBuf>(id).cloned().unwrap_or_default()
}
