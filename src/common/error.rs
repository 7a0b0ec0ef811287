//! Error types for the session controller
//!
//! Decode failures on inbound messages never surface here: the dispatcher
//! contains them and reports through logging. These errors cover caller-side
//! contract violations and configuration problems.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the session controller
#[derive(Error, Debug)]
pub enum Error {
    /// A control operation was invoked in a state that doesn't allow it.
    /// This is a contract violation by the caller; the UI must gate
    /// enablement so the session is never asked for an illegal transition.
    #[error("Cannot {action} while session is {state}")]
    InvalidState { action: String, state: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create an invalid state error
    pub fn invalid_state(action: &str, state: &str) -> Self {
        Self::InvalidState {
            action: action.to_string(),
            state: state.to_string(),
        }
    }
}
