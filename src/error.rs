//! Error types for patientdb
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using PatientDbError
pub type Result<T> = std::result::Result<T, PatientDbError>;

/// Unified error type for patientdb operations
#[derive(Debug, Error)]
pub enum PatientDbError {
    // -------------------------------------------------------------------------
    // Protocol Errors (detected by the codec before dispatch)
    // -------------------------------------------------------------------------
    /// Wrong field count, unknown keyword or empty line
    #[error("{0}")]
    MalformedCommand(String),

    /// Unparsable identifier or date inside a well-shaped command
    #[error("{0}")]
    InvalidArgument(String),

    /// Reply line that is neither `SUCCESS|` nor `ERROR|` (client side)
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("{0}")]
    Validation(String),

    #[error("Patient not found: {0}")]
    NotFound(u64),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Storage Errors (raised by persistent repository backends)
    // -------------------------------------------------------------------------
    #[error("Storage error: {0}")]
    Storage(String),

    // -------------------------------------------------------------------------
    // Seed / Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Seed error: {0}")]
    Seed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Internal Faults
    // -------------------------------------------------------------------------
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PatientDbError {
    /// True for errors whose message is safe and meaningful to show a client.
    ///
    /// Storage, I/O and internal faults may carry backend details and are
    /// replaced by a generic message on the wire.
    pub fn is_client_facing(&self) -> bool {
        matches!(
            self,
            PatientDbError::MalformedCommand(_)
                | PatientDbError::InvalidArgument(_)
                | PatientDbError::Validation(_)
                | PatientDbError::NotFound(_)
        )
    }
}

impl From<serde_json::Error> for PatientDbError {
    fn from(err: serde_json::Error) -> Self {
        PatientDbError::Seed(err.to_string())
    }
}
