use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Abstraction over the procfs root.
/// Defaults to `/proc` in production, redirectable to a temp directory for testing.
#[derive(Debug, Clone)]
pub struct ProcRoot {
    root: PathBuf,
}

impl Default for ProcRoot {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/proc"),
        }
    }
}

impl ProcRoot {
    /// Create a ProcRoot pointing at the real system.
    pub fn system() -> Self {
        Self::default()
    }

    /// Create a ProcRoot pointing at a custom directory (for testing).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a per-process file, e.g. `path(42, "environ")` -> `/proc/42/environ`.
    pub fn path(&self, pid: u32, file: impl AsRef<Path>) -> PathBuf {
        self.root.join(pid.to_string()).join(file)
    }

    /// Read a per-process file as raw bytes.
    ///
    /// The underlying `io::Error` is kept so callers can tell a vanished
    /// process from a permission problem.
    pub fn read_bytes(&self, pid: u32, file: impl AsRef<Path>) -> Result<Vec<u8>> {
        let path = self.path(pid, file);
        std::fs::read(&path).map_err(|e| Error::ProcRead { path, source: e })
    }

    /// Read a per-process file as text.
    pub fn read(&self, pid: u32, file: impl AsRef<Path>) -> Result<String> {
        let path = self.path(pid, file);
        std::fs::read_to_string(&path).map_err(|e| Error::ProcRead { path, source: e })
    }

    /// List process IDs, ascending. Non-numeric entries are ignored.
    pub fn pids(&self) -> Result<Vec<u32>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| Error::ProcRead {
            path: self.root.clone(),
            source: e,
        })?;
        let mut pids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::ProcRead {
                path: self.root.clone(),
                source: e,
            })?;
            if let Some(pid) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<u32>().ok())
            {
                pids.push(pid);
            }
        }
        pids.sort_unstable();
        Ok(pids)
    }

    /// Get the root path.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
