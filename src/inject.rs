use crate::procfs::ProcRoot;
use crate::resolve::{ResolvedEnvironmentPatch, get_environ_values};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Session variables needed to reach the desktop notification service.
pub const REQUIRED_VARIABLES: [&str; 2] = ["DISPLAY", "DBUS_SESSION_BUS_ADDRESS"];

/// Somewhere environment variables can be read from and written to.
pub trait EnvStore {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&mut self, name: &str, value: &str);
}

/// The environment of the running process.
#[derive(Debug, Default)]
pub struct ProcessEnv;

impl EnvStore for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var_os(name).map(|v| v.to_string_lossy().into_owned())
    }

    fn set(&mut self, name: &str, value: &str) {
        // SAFETY: injection runs once on the main thread, before the
        // notification backend starts any threads of its own.
        unsafe { std::env::set_var(name, value) }
    }
}

impl EnvStore for BTreeMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        BTreeMap::get(self, name).cloned()
    }

    fn set(&mut self, name: &str, value: &str) {
        self.insert(name.to_string(), value.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectOutcome {
    /// Every required variable was already set; nothing was touched.
    AlreadySet,
    /// These values were written into the store.
    Applied(ResolvedEnvironmentPatch),
    /// No running process had any of the missing variables.
    NothingFound,
}

/// Names from `names` that are unset or empty in `store`.
pub fn missing_variables<'a, S: AsRef<str>>(
    store: &impl EnvStore,
    names: &'a [S],
) -> Vec<&'a str> {
    names
        .iter()
        .map(|n| n.as_ref())
        .filter(|name| store.get(name).is_none_or(|v| v.is_empty()))
        .collect()
}

/// Fill in missing session variables from the current user's other processes.
///
/// Variables that already hold a value are never overwritten. Failing to find
/// anything is only a warning; the notification call reports the real error.
pub fn set_environ<S: AsRef<str>>(
    store: &mut impl EnvStore,
    proc_root: &ProcRoot,
    uid: Option<u32>,
    names: &[S],
) -> InjectOutcome {
    let missing = missing_variables(&*store, names);
    if missing.is_empty() {
        debug!(
            "environment variables {:?} already set",
            names.iter().map(|n| n.as_ref()).collect::<Vec<&str>>()
        );
        return InjectOutcome::AlreadySet;
    }

    let patch = match get_environ_values(proc_root, uid, missing.as_slice()) {
        Ok(table) => table.resolve(),
        Err(e) => {
            warn!("unable to scan processes: {}", e);
            ResolvedEnvironmentPatch::new()
        }
    };

    if patch.is_empty() {
        warn!(
            "unable to find environment variables in current user processes: {:?}",
            missing
        );
        return InjectOutcome::NothingFound;
    }

    for (name, value) in &patch {
        store.set(name, value);
    }
    debug!("updated environment: {:?}", patch);
    InjectOutcome::Applied(patch)
}
