//! Core error types for exclusive-core.
//!
//! A gate rejecting an invocation is not an error: it yields `None` and runs
//! the abort callback. The types here cover misuse of the guard API and the
//! configuration and replay layers around it.

use std::path::PathBuf;
use thiserror::Error;

use crate::gate::GateKind;

/// Core error type for exclusive-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Replay script errors
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Errors raised by guard operations that are not valid for a gate.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardError {
    /// The gate has no short recovery delay configured
    #[error("gate '{0}' does not support rearm")]
    RearmUnsupported(GateKind),
}

/// Replay script errors.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Steps must be listed in non-decreasing time order
    #[error("step {index} at {at_ms}ms comes before the previous step at {previous_ms}ms")]
    OutOfOrder {
        index: usize,
        at_ms: u64,
        previous_ms: u64,
    },

    /// Script could not be parsed
    #[error("Failed to parse script: {0}")]
    Parse(String),
}
