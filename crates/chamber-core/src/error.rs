//! Error types for Chamber Core
//!
//! Provides a unified error type for all workspace operations.

use crate::workspace::{PaneId, TabId};
use thiserror::Error;

/// Result type for Chamber Core operations
pub type Result<T> = std::result::Result<T, ChamberError>;

/// Unified error type for Chamber Core
#[derive(Error, Debug)]
pub enum ChamberError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Channel error (communication failure)
    #[error("Channel error: {0}")]
    Channel(String),

    /// A tab id that is not in the given pane (strict mode only)
    #[error("Tab {tab_id} not found in {pane} pane")]
    TabNotFound { tab_id: TabId, pane: PaneId },

    /// A positional index past the end of a pane (strict mode only)
    #[error("Tab index {index} out of range for pane with {len} tabs")]
    IndexOutOfRange { index: usize, len: usize },
}

impl ChamberError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        ChamberError::Config(msg.into())
    }

    /// Create a channel error
    pub fn channel(msg: impl Into<String>) -> Self {
        ChamberError::Channel(msg.into())
    }

    /// Create a tab-not-found error
    pub fn tab_not_found(tab_id: &TabId, pane: PaneId) -> Self {
        ChamberError::TabNotFound {
            tab_id: tab_id.clone(),
            pane,
        }
    }

    /// Whether this error only reports a reference that did not resolve
    ///
    /// These are the conditions the store ignores outside strict mode.
    pub fn is_missing_reference(&self) -> bool {
        matches!(
            self,
            ChamberError::TabNotFound { .. } | ChamberError::IndexOutOfRange { .. }
        )
    }
}

impl From<serde_json::Error> for ChamberError {
    fn from(err: serde_json::Error) -> Self {
        ChamberError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ChamberError {
    fn from(err: toml::de::Error) -> Self {
        ChamberError::Config(err.to_string())
    }
}

impl<T> From<crossbeam_channel::SendError<T>> for ChamberError {
    fn from(err: crossbeam_channel::SendError<T>) -> Self {
        ChamberError::Channel(format!("Send error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_not_found_message() {
        let err = ChamberError::tab_not_found(&TabId::from("chat-1"), PaneId::Right);
        assert_eq!(err.to_string(), "Tab chat-1 not found in right pane");
        assert!(err.is_missing_reference());
    }

    #[test]
    fn test_config_error_is_not_missing_reference() {
        assert!(!ChamberError::config("bad").is_missing_reference());
    }
}
