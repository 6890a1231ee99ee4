use clap::{ArgAction, CommandFactory, Parser};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "tasknotify",
    about = "Send a desktop notification if there is input on standard input or if BODY is given",
    long_about = "Send a desktop notification if there is input on standard input or if BODY is given.\n\n\
        Works from cron jobs, systemd units and other headless contexts: when DISPLAY or \
        DBUS_SESSION_BUS_ADDRESS are missing, they are borrowed from other processes you own.",
    version
)]
pub struct Cli {
    /// Produce a notification with this SUMMARY
    #[arg(
        value_name = "SUMMARY",
        required_unless_present_any = ["probe", "completions"]
    )]
    pub summary: Option<String>,

    /// Produce a notification with this BODY (default: read from stdin)
    #[arg(value_name = "BODY")]
    pub body: Option<String>,

    /// App name for the notification (default: tasknotify)
    #[arg(short, long, value_name = "NAME")]
    pub app_name: Option<String>,

    /// Read at most N characters from standard input (default: 1024)
    #[arg(short, long, value_name = "N")]
    pub limit: Option<usize>,

    /// Increase log output; '-vv' for debug output
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Read configuration from this file only
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show which session variable values other processes carry, then exit
    #[arg(long)]
    pub probe: bool,

    /// With --probe, print the result as JSON
    #[arg(long, requires = "probe")]
    pub json: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

/// Write the completion script for `shell` to stdout.
pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "tasknotify", &mut std::io::stdout());
}
