//! Core error types for weekgate-core.
//!
//! Access outcomes (`Unauthenticated`, `NotYetUnlocked`) are not errors; see
//! [`crate::access`].

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for weekgate-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed date input
    #[error(transparent)]
    InvalidDate(#[from] InvalidDate),

    /// Session store errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Schedule construction errors
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// Rendering surface errors
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A date string that could not be read as a local calendar date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid date '{input}': {reason}")]
pub struct InvalidDate {
    pub input: String,
    pub reason: String,
}

impl InvalidDate {
    pub fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Session-store errors.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Backing key/value store failed
    #[error("Session backend failed: {0}")]
    Backend(String),

    /// Uploaded file is not a supported image
    #[error("Unsupported photo '{path}': {message}")]
    UnsupportedPhoto { path: PathBuf, message: String },

    /// Reading the photo file failed
    #[error("Failed to read photo {path}: {source}")]
    PhotoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
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

    /// Key does not exist in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory could not be determined or created
    #[error("Configuration directory unavailable: {0}")]
    DataDir(String),
}

/// Schedule construction errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScheduleError {
    #[error(transparent)]
    InvalidDate(#[from] InvalidDate),

    /// Entries must be strictly ascending by date
    #[error("Event '{label}' on {date} is not after the previous event")]
    OutOfOrder { label: String, date: chrono::NaiveDate },

    /// Every event needs a label
    #[error("Event on {0} has an empty label")]
    EmptyLabel(chrono::NaiveDate),
}

/// Errors reported by a rendering [`Surface`](crate::render::Surface).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The target element is not part of the current view
    #[error("Element '{id}' does not exist in the current view")]
    MissingElement { id: String },
}

impl From<rusqlite::Error> for SessionError {
    fn from(err: rusqlite::Error) -> Self {
        SessionError::Backend(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
