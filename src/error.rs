use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("procfs read failed: {path}: {source}")]
    ProcRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid app name: {0:?}")]
    InvalidAppName(String),

    #[error("notification failed: {0}")]
    Notification(#[from] notify_rust::error::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
