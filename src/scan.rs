use crate::error::{Error, Result};
use crate::procfs::ProcRoot;
use std::collections::HashMap;
use std::io::ErrorKind;
use tracing::trace;

/// Snapshot of one process's environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEnvironment {
    pub pid: u32,
    pub uid: u32,
    pub vars: HashMap<String, String>,
}

impl ProcessEnvironment {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Why a process was left out of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Real UID belongs to someone else.
    OtherUser(u32),
    /// Process went away between listing and reading.
    Exited,
    PermissionDenied,
    /// Kernel threads and some zombies have no environment.
    EmptyEnvironment,
    Unreadable(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::OtherUser(uid) => write!(f, "owned by uid {}", uid),
            SkipReason::Exited => write!(f, "process exited"),
            SkipReason::PermissionDenied => write!(f, "permission denied"),
            SkipReason::EmptyEnvironment => write!(f, "empty environment"),
            SkipReason::Unreadable(detail) => write!(f, "unreadable: {}", detail),
        }
    }
}

/// Outcome of reading a single process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironRead {
    Available(ProcessEnvironment),
    Skipped(SkipReason),
}

impl EnvironRead {
    pub fn available(self) -> Option<ProcessEnvironment> {
        match self {
            EnvironRead::Available(env) => Some(env),
            EnvironRead::Skipped(_) => None,
        }
    }
}

/// Real UID of the calling process.
pub fn current_uid() -> u32 {
    nix::unistd::getuid().as_raw()
}

/// Extract the real UID from the contents of `/proc/<pid>/status`.
///
/// The `Uid:` line lists real, effective, saved and filesystem UIDs in that order.
pub fn parse_real_uid(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("Uid:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|uid| uid.parse().ok())
}

/// Parse the NUL-separated `NAME=value` records of `/proc/<pid>/environ`.
///
/// Records without `=`, with an empty name, or that are not UTF-8 are dropped.
pub fn parse_environ(raw: &[u8]) -> HashMap<String, String> {
    raw.split(|b| *b == 0)
        .filter_map(|record| std::str::from_utf8(record).ok())
        .filter_map(|record| record.split_once('='))
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

fn classify(err: &Error) -> SkipReason {
    match err {
        Error::ProcRead { source, .. } => match source.kind() {
            ErrorKind::NotFound => SkipReason::Exited,
            ErrorKind::PermissionDenied => SkipReason::PermissionDenied,
            // ESRCH shows up when a process dies mid-read.
            _ if source.raw_os_error() == Some(nix::libc::ESRCH) => SkipReason::Exited,
            _ => SkipReason::Unreadable(source.to_string()),
        },
        other => SkipReason::Unreadable(other.to_string()),
    }
}

/// Read one process's environment if its real UID is `uid`.
///
/// Never fails: anything that gets in the way becomes a [`SkipReason`].
pub fn read_process(proc_root: &ProcRoot, pid: u32, uid: u32) -> EnvironRead {
    let status = match proc_root.read(pid, "status") {
        Ok(s) => s,
        Err(e) => return EnvironRead::Skipped(classify(&e)),
    };

    let owner = match parse_real_uid(&status) {
        Some(owner) => owner,
        None => {
            return EnvironRead::Skipped(SkipReason::Unreadable(
                "no Uid line in status".to_string(),
            ));
        }
    };
    if owner != uid {
        return EnvironRead::Skipped(SkipReason::OtherUser(owner));
    }

    let raw = match proc_root.read_bytes(pid, "environ") {
        Ok(raw) => raw,
        Err(e) => return EnvironRead::Skipped(classify(&e)),
    };

    let vars = parse_environ(&raw);
    if vars.is_empty() {
        return EnvironRead::Skipped(SkipReason::EmptyEnvironment);
    }

    EnvironRead::Available(ProcessEnvironment { pid, uid, vars })
}

/// Lazily yield the environments of processes whose real UID is `uid`
/// (default: the current user).
///
/// The process list is taken once up front; each environment is read only
/// when the iterator reaches it. Only listing the root itself can fail.
pub fn process_environs(
    proc_root: &ProcRoot,
    uid: Option<u32>,
) -> Result<impl Iterator<Item = ProcessEnvironment> + '_> {
    let uid = uid.unwrap_or_else(current_uid);
    let pids = proc_root.pids()?;

    Ok(pids
        .into_iter()
        .filter_map(move |pid| match read_process(proc_root, pid, uid) {
            EnvironRead::Available(env) => Some(env),
            EnvironRead::Skipped(reason) => {
                trace!(pid, %reason, "skipping process");
                None
            }
        }))
}
