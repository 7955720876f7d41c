use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    IO(#[from] io::Error),
    #[error("Failed to open log file {path:?}: {source}")]
    LogFile { path: PathBuf, source: io::Error },
    #[error("Tracing has already been initialized")]
    TracingAlreadyInitialized,
    #[error("Must be run as root, current effective uid is {0}")]
    NotRoot(u32),
    #[error("One or more missing dependencies found: {}", .0.join(", "))]
    MissingDependencies(Vec<&'static str>),
}
