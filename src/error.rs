//! Error types for Flora Health

use thiserror::Error;

/// Errors surfaced by the dashboard core
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("No files selected")]
    NoFilesSelected,

    #[error("Invalid upload transition: cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] std::io::Error),

    #[error("Note text is empty")]
    EmptyNote,

    #[error("Message text is empty")]
    EmptyMessage,

    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    #[error("Unknown notification: {0}")]
    UnknownNotification(String),

    #[error("Unknown setting: {group}.{key}")]
    UnknownSetting { group: String, key: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Analysis failed: {0}")]
    AnalysisError(String),
}
