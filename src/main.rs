#![forbid(unsafe_code)]

use anyhow::Result;
use std::io::{self, Write};

use antikeylogger::cli::{self, commands, interactive, CliArgs, Verb};
use antikeylogger::config::ConfigStore;
use antikeylogger::constants::USAGE_EXIT_CODE;
use antikeylogger::{clock, daemon, diagnostics, inference::Invoker};

fn main() {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            // clap's usage errors exit 2; this tool reports them as 1
            std::process::exit(if err.use_stderr() { USAGE_EXIT_CODE } else { 0 });
        }
    };

    diagnostics::init(args.verbose);

    let code = match dispatch(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            USAGE_EXIT_CODE
        }
    };

    std::process::exit(code);
}

fn dispatch(args: CliArgs) -> Result<i32> {
    let cwd = clock::current_dir()?;
    let ctx = commands::ControlContext {
        store: ConfigStore::in_dir(&cwd),
        invoker: Invoker::from_dir(&cwd),
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let code = match args.verb {
        Verb::Enable { notes } => commands::enable(&ctx, &notes, &mut out)?,
        Verb::Disable { notes } => commands::disable(&ctx, &notes, &mut out)?,
        Verb::Status { json } => commands::status(&ctx, json, &mut out)?,
        Verb::Run(request) => commands::run(&ctx, &request, &mut out)?,
        Verb::Interactive { python } => {
            interactive::run_interactive(&ctx, &python, io::stdin().lock(), &mut out)?
        }
        Verb::Daemon(settings) => {
            let shutdown = clock::install_shutdown_flag()?;
            daemon::run_daemon(&settings, shutdown)?;
            0
        }
    };

    out.flush()?;
    Ok(code)
}
