use crate::cli::Cli;
use crate::config::TasknotifyConfig;
use crate::inject::ProcessEnv;
use crate::input::read_body_text;
use crate::notify::{NotificationRequest, notify_headless};
use crate::output;
use crate::procfs::ProcRoot;
use crate::resolve::get_environ_values;
use std::io::Read;
use tracing::{debug, error};

/// Sends a prepared notification.
pub trait Dispatch {
    fn dispatch(&mut self, request: &NotificationRequest) -> bool;
}

/// Production dispatcher: borrow the session environment, then notify.
#[derive(Debug, Clone)]
pub struct HeadlessDispatcher {
    pub proc_root: ProcRoot,
    pub session_variables: Vec<String>,
}

impl HeadlessDispatcher {
    pub fn new(session_variables: Vec<String>) -> Self {
        Self {
            proc_root: ProcRoot::system(),
            session_variables,
        }
    }
}

impl Dispatch for HeadlessDispatcher {
    fn dispatch(&mut self, request: &NotificationRequest) -> bool {
        notify_headless(&self.proc_root, request, &self.session_variables)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Sent,
    /// No BODY argument and nothing but whitespace on stdin.
    NothingToSend,
    Failed,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Sent | Outcome::NothingToSend => 0,
            Outcome::Failed => 1,
        }
    }
}

/// Build a request from the command line (reading stdin if needed) and dispatch it.
pub fn run(
    cli: &Cli,
    config: &TasknotifyConfig,
    input: &mut impl Read,
    dispatcher: &mut impl Dispatch,
) -> Outcome {
    let summary = cli.summary.clone().unwrap_or_default();

    let body = match &cli.body {
        Some(body) => body.clone(),
        None => {
            let limit = cli.limit.unwrap_or(config.notification.body_limit);
            let text = match read_body_text(input, limit) {
                Ok(text) => text,
                Err(e) => {
                    error!("unable to read from standard input: {}", e);
                    return Outcome::Failed;
                }
            };
            if text.is_empty() {
                debug!("no input on standard input");
                return Outcome::NothingToSend;
            }
            text
        }
    };

    let app_name = cli
        .app_name
        .clone()
        .unwrap_or_else(|| config.notification.app_name.clone());
    let request = NotificationRequest {
        summary,
        body: Some(body),
        app_name: Some(app_name),
    };

    if dispatcher.dispatch(&request) {
        Outcome::Sent
    } else {
        Outcome::Failed
    }
}

/// Print what the resolver sees for the configured session variables.
pub fn probe(proc_root: &ProcRoot, config: &TasknotifyConfig, json: bool) -> anyhow::Result<()> {
    let table = get_environ_values(proc_root, None, &config.session.variables)?;
    if json {
        output::print_probe_json(&table, &ProcessEnv)?;
    } else {
        output::print_probe(&table, &ProcessEnv);
    }
    Ok(())
}
