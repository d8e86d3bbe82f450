use std::path::PathBuf;

use parley::errors::DeferredError;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("{command}: no files were given")]
    NoFiles { command: &'static str },

    #[error("{}: no such file", .0.display())]
    Missing(PathBuf),

    #[error("{0} isn't a valid package index; it should start with http:// or https://")]
    BadIndex(String),

    #[error("couldn't get the package index")]
    Index(#[from] DeferredError),

    #[error(transparent)]
    Task(#[from] tokio::task::JoinError),
}
