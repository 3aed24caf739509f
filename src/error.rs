//! Error handling for Mosaic
//!
//! Validation failures are blocking: the rejected operation leaves the
//! prior state in place. Stale-id lookups are not errors and never show up
//! here.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Mosaic operations
pub type Result<T> = std::result::Result<T, MosaicError>;

/// Main error type for Mosaic operations
#[derive(Error, Debug)]
pub enum MosaicError {
    // Validation Errors
    #[error("Layout name must not be empty")]
    EmptyName,

    #[error("Invalid item duration: {seconds}s (must be a positive number of seconds)")]
    InvalidDuration { seconds: f64 },

    #[error("Zone geometry rejected: {reason}")]
    GeometryViolation { reason: String },

    #[error("Invalid stage dimensions: {width}x{height}")]
    InvalidStage { width: f64, height: f64 },

    // Undo/Redo Errors
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    // Document Errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid document schema version: {version}")]
    InvalidSchemaVersion { version: String },

    #[error("Migration failed from {from} to {to}: {reason}")]
    MigrationError {
        from: String,
        to: String,
        reason: String,
    },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MosaicError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            MosaicError::EmptyName => "EMPTY_NAME",
            MosaicError::InvalidDuration { .. } => "INVALID_DURATION",
            MosaicError::GeometryViolation { .. } => "GEOMETRY_VIOLATION",
            MosaicError::InvalidStage { .. } => "INVALID_STAGE",
            MosaicError::NothingToUndo => "NOTHING_TO_UNDO",
            MosaicError::NothingToRedo => "NOTHING_TO_REDO",
            MosaicError::FileNotFound { .. } => "FILE_NOT_FOUND",
            MosaicError::FileReadError { .. } => "FILE_READ_ERROR",
            MosaicError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            MosaicError::InvalidSchemaVersion { .. } => "INVALID_SCHEMA_VERSION",
            MosaicError::MigrationError { .. } => "MIGRATION_ERROR",
            MosaicError::Io(_) => "IO_ERROR",
            MosaicError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the user can correct the input and retry.
    ///
    /// `InvalidStage` is a programmer error and is never recoverable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MosaicError::EmptyName
                | MosaicError::InvalidDuration { .. }
                | MosaicError::GeometryViolation { .. }
                | MosaicError::NothingToUndo
                | MosaicError::NothingToRedo
                | MosaicError::FileNotFound { .. }
        )
    }

    /// Get a user-facing recovery suggestion
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            MosaicError::EmptyName => Some("Enter a layout name before saving."),
            MosaicError::InvalidDuration { .. } => {
                Some("Durations are whole or fractional seconds greater than zero.")
            }
            MosaicError::GeometryViolation { .. } => {
                Some("Zones must be at least 20x20 and stay inside the stage.")
            }
            MosaicError::NothingToUndo => Some("There are no edits to undo."),
            MosaicError::NothingToRedo => Some("There are no undone edits to redo."),
            MosaicError::FileNotFound { .. } => Some("Run 'mosaic-cli init <path>' first."),
            _ => None,
        }
    }
}
