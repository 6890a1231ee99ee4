use crate::error::Result;
use crate::procfs::ProcRoot;
use crate::scan::{ProcessEnvironment, process_environs};
use std::collections::BTreeMap;

/// Observed values for one variable with their counts, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueCounts {
    entries: Vec<(String, usize)>,
}

impl ValueCounts {
    pub fn record(&mut self, value: &str) {
        match self.entries.iter_mut().find(|(v, _)| v == value) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((value.to_string(), 1)),
        }
    }

    /// Most frequently observed value. Ties go to the value seen first.
    pub fn most_common(&self) -> Option<(&str, usize)> {
        let mut best: Option<(&str, usize)> = None;
        for (value, count) in &self.entries {
            if best.is_none_or(|(_, c)| *count > c) {
                best = Some((value.as_str(), *count));
            }
        }
        best
    }

    pub fn count(&self, value: &str) -> usize {
        self.entries
            .iter()
            .find(|(v, _)| v == value)
            .map_or(0, |(_, c)| *c)
    }

    /// Total number of observations across all values.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(v, c)| (v.as_str(), *c))
    }
}

/// Name -> value selected for injection.
pub type ResolvedEnvironmentPatch = BTreeMap<String, String>;

/// Frequency of observed values for each requested variable.
///
/// Every requested name is a key, observed or not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableFrequencyTable {
    counts: BTreeMap<String, ValueCounts>,
}

impl VariableFrequencyTable {
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            counts: names
                .iter()
                .map(|n| (n.as_ref().to_string(), ValueCounts::default()))
                .collect(),
        }
    }

    /// Count the requested variables present in `env`. Empty values are ignored.
    pub fn observe(&mut self, env: &ProcessEnvironment) {
        for (name, counts) in self.counts.iter_mut() {
            if let Some(value) = env.get(name).filter(|v| !v.is_empty()) {
                counts.record(value);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ValueCounts> {
        self.counts.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValueCounts)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Pick the mode of every variable that was observed at least once.
    pub fn resolve(&self) -> ResolvedEnvironmentPatch {
        self.counts
            .iter()
            .filter_map(|(name, counts)| {
                counts
                    .most_common()
                    .map(|(value, _)| (name.clone(), value.to_string()))
            })
            .collect()
    }
}

/// Count values of `names` across the environments of processes owned by
/// `uid` (default: the current user).
pub fn get_environ_values<S: AsRef<str>>(
    proc_root: &ProcRoot,
    uid: Option<u32>,
    names: &[S],
) -> Result<VariableFrequencyTable> {
    let mut table = VariableFrequencyTable::new(names);
    for env in process_environs(proc_root, uid)? {
        table.observe(&env);
    }
    Ok(table)
}
