//! Error types for the chess agent
//!
//! Provides custom error types for agent operations including move
//! validation, policy preconditions, snapshot persistence and configuration.

use thiserror::Error;

/// Errors that can occur in the chess agent
#[derive(Error, Debug)]
pub enum AgentError {
    /// Requested action does not parse or is not legal in the current state
    #[error("Invalid move: {action} is not legal in position {fen}")]
    InvalidAction { action: String, fen: String },

    /// Policy invoked on a position without legal actions
    #[error("No legal actions in terminal position {fen}")]
    TerminalState { fen: String },

    /// Position text could not be parsed by the rules engine
    #[error("Invalid position: {fen}")]
    InvalidPosition { fen: String },

    /// Snapshot file I/O error
    #[error("Snapshot I/O error: {0}")]
    Persistence(#[from] std::io::Error),

    /// Snapshot serialization/deserialization error
    #[error("Snapshot format error: {0}")]
    SnapshotFormat(#[from] serde_json::Error),

    /// Snapshot written by an incompatible format version
    #[error("Unsupported snapshot version {found} (expected {expected})")]
    UnsupportedSnapshotVersion { found: u32, expected: u32 },

    /// Invalid hyperparameter or training setting
    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

impl AgentError {
    /// True for failures reading or decoding a snapshot
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            AgentError::Persistence(_)
                | AgentError::SnapshotFormat(_)
                | AgentError::UnsupportedSnapshotVersion { .. }
        )
    }
}

/// Result type alias for agent operations
pub type AgentResult<T> = Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_action_message() {
        let err = AgentError::InvalidAction {
            action: "e2e5".to_string(),
            fen: "startpos".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid move: e2e5 is not legal in position startpos"
        );
        assert!(!err.is_persistence());
    }

    #[test]
    fn test_io_error_is_persistence() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AgentError = io.into();
        assert!(err.is_persistence());
    }
}
