use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;
use tasknotify::app::{self, HeadlessDispatcher};
use tasknotify::cli::Cli;
use tasknotify::procfs::ProcRoot;

fn main() -> ExitCode {
    let cli = Cli::parse();
    tasknotify::logging::init(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    if let Some(shell) = cli.completions {
        tasknotify::cli::print_completions(shell);
        return Ok(0);
    }

    let config = tasknotify::config::load(cli.config.as_ref());

    if cli.probe {
        app::probe(&ProcRoot::system(), &config, cli.json)?;
        return Ok(0);
    }

    let mut dispatcher = HeadlessDispatcher::new(config.session.variables.clone());
    let outcome = app::run(&cli, &config, &mut std::io::stdin().lock(), &mut dispatcher);
    Ok(outcome.exit_code())
}
