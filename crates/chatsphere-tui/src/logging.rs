//! Log setup.
//!
//! The UI owns the terminal, so logs go to a file or nowhere.

#![allow(clippy::disallowed_types, reason = "Mutex serializes writes to the log file")]

use std::{fs::File, io, path::Path, sync::Mutex};

use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log setup errors.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Log file could not be created.
    #[error("cannot open log file: {0}")]
    Io(#[from] io::Error),

    /// Invalid level or filter directive.
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    /// A global subscriber is already installed.
    #[error("logging already initialized")]
    AlreadyInitialized,
}

/// Install a subscriber writing to `file`, filtered by `RUST_LOG` or else
/// `level`. Does nothing without a file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or the filter is invalid.
pub fn init(level: &str, file: Option<&Path>) -> Result<(), LoggingError> {
    let Some(path) = file else {
        return Ok(());
    };

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };
    let writer = Mutex::new(File::create(path)?);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)
}
