//! Error types for the process monitor.

use std::io;
use thiserror::Error;

use crate::source::Pid;

/// Result type alias for monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Error taxonomy for counter sampling and refresh.
///
/// Only [`MonitorError::SourceUnavailable`] suspends a refresh; everything
/// else is absorbed at the point it occurs so a steady-state monitoring
/// loop never terminates on a transient failure.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// The counter source cannot be read at all. Propagated to the caller;
    /// fatal only during startup identification (kernel, OS name).
    #[error("counter source unavailable: {0}")]
    SourceUnavailable(String),

    /// The process exited between enumeration and the read. Expected race;
    /// the entity keeps its last known values for the cycle.
    #[error("process {0} is gone")]
    ProcessGone(Pid),

    /// The source returned unparseable content.
    #[error("malformed reading: {0}")]
    MalformedReading(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
