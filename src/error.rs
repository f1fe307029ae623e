//! Error types for the simulation engine.
//!
//! Every detected error is fatal to the run; nothing is recovered locally and
//! retried. Errors are logged through the tracing channel at the point of
//! detection and then propagated up to the caller, which aborts.

use thiserror::Error;

/// Unified error type for all simulation operations.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Invalid or missing parameters, unknown type names, references to
    /// undefined groups or potentials. Detected eagerly at construction or
    /// registration time.
    #[error("configuration error: {0}")]
    Config(String),

    /// An operation was invoked before its prerequisite component existed,
    /// e.g. integrating before a constraint was set.
    #[error("sequencing error: {0}")]
    Sequencing(String),

    /// A computed quantity left its physically meaningful range: an event
    /// probability above one, a population driven to zero, a non-finite
    /// force.
    #[error("numerical error: {0}")]
    Numerical(String),

    /// I/O errors while reading or writing configuration files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimulationError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        SimulationError::Config(message.into())
    }

    /// Creates a sequencing error.
    pub fn sequencing(message: impl Into<String>) -> Self {
        SimulationError::Sequencing(message.into())
    }

    /// Creates a numerical error.
    pub fn numerical(message: impl Into<String>) -> Self {
        SimulationError::Numerical(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
