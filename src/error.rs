//! Error handling module for fatwheel
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Workflow stages convert these into log lines at their call site; only the
//! binary entry points let them escape.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for fatwheel
#[derive(Error, Debug)]
pub enum FatwheelError {
    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Package index request failed before a status code was received
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// An external tool could not be spawned or exited unsuccessfully
    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    /// Wheel pairing errors (bad filenames, missing merge output)
    #[error("Pairing error: {0}")]
    Pairing(String),

    /// An entry in the scratch directory could not be removed
    #[error("Failed to delete {}. Reason: {reason}", path.display())]
    Scratch { path: PathBuf, reason: String },

    /// The scratch directory has content but no ownership marker
    #[error(
        "{} is not a fatwheel cache folder (no .fatwheel-scratch marker) and is not empty; refusing to clear it",
        path.display()
    )]
    UnownedScratch { path: PathBuf },

    /// State errors (mutex poisoning, closed channels)
    #[error("State error: {0}")]
    State(String),

    /// General errors (catch-all for edge cases)
    #[error("{0}")]
    General(String),
}

/// Result type alias for fatwheel operations
pub type Result<T> = std::result::Result<T, FatwheelError>;

impl FatwheelError {
    /// Create a tool failure error
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a pairing error
    pub fn pairing(msg: impl Into<String>) -> Self {
        Self::Pairing(msg.into())
    }

    /// Create a scratch cleanup error
    pub fn scratch(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Scratch {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a state error
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Create a general error
    pub fn general(msg: impl Into<String>) -> Self {
        Self::General(msg.into())
    }
}
