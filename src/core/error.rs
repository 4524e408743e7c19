//! Error types for core module
//!
//! Provides custom error types for the command-line front end: settings
//! persistence and failures bubbling up from the agent.

use chess_agent::AgentError;
use thiserror::Error;

/// Errors that can occur in the core module
#[derive(Error, Debug)]
pub enum CoreError {
    /// Settings file I/O error
    #[error("Settings I/O error: {0}")]
    SettingsIo(#[from] std::io::Error),

    /// Settings serialization/deserialization error
    #[error("Settings serialization error: {0}")]
    SettingsSerialization(#[from] serde_json::Error),

    /// Reading commands or writing output during console play
    #[error("Console I/O error: {0}")]
    Console(std::io::Error),

    /// Error reported by the agent
    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
