//! # Batch Error Types
//!
//! Error types for batch generation and sheet lifecycle operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Batch Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Generation    │  │     Storage             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  AlreadyRunning │  │  Storage                │ │
//! │  │  ConfigLoad...  │  │  NothingToBatch │  │  ObjectNotFound         │ │
//! │  │  ConfigSave...  │  │  FetchTimeout   │  │  BatchNotFound          │ │
//! │  └─────────────────┘  │  Image          │  │  Io                     │ │
//! │                       └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Input: InvalidPayload, SerializationFailed                     │   │
//! │  │  Domain: Core(CoreError) - validation, status transitions       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use gangsheet_core::{CoreError, PackError};
use thiserror::Error;

/// Result type alias for batch operations.
pub type BatchResult<T> = Result<T, BatchError>;

/// Batch error type covering every failure of the batch layer.
#[derive(Debug, Error)]
pub enum BatchError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid batch configuration.
    #[error("Invalid batch configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Generation Errors
    // =========================================================================
    /// Another generation run holds the single-flight guard.
    #[error("A batch is already being generated")]
    AlreadyRunning,

    /// The queue (or the selected subset) produced no placements.
    #[error("Nothing eligible to batch ({considered} items considered)")]
    NothingToBatch { considered: usize },

    /// A source image fetch exceeded the configured timeout.
    #[error("Timed out fetching {key} after {secs} seconds")]
    FetchTimeout { key: String, secs: u64 },

    /// Decoding a source or encoding the sheet failed.
    #[error("Image error: {0}")]
    Image(String),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// Object store or batch store failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// No object under the given key.
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// No batch sheet with the given id.
    #[error("Batch not found: {0}")]
    BatchNotFound(String),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// Failed to serialize output.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// A JSON argument could not be read or parsed.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// Validation or lifecycle rule from the core crate.
    #[error(transparent)]
    Core(CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<CoreError> for BatchError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Pack(PackError::NothingPlaced { considered }) => {
                BatchError::NothingToBatch { considered }
            }
            other => BatchError::Core(other),
        }
    }
}

impl From<std::io::Error> for BatchError {
    fn from(err: std::io::Error) -> Self {
        BatchError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BatchError {
    fn from(err: serde_json::Error) -> Self {
        BatchError::SerializationFailed(err.to_string())
    }
}

impl From<toml::de::Error> for BatchError {
    fn from(err: toml::de::Error) -> Self {
        BatchError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for BatchError {
    fn from(err: toml::ser::Error) -> Self {
        BatchError::ConfigSaveFailed(err.to_string())
    }
}

impl From<image::ImageError> for BatchError {
    fn from(err: image::ImageError) -> Self {
        BatchError::Image(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl BatchError {
    /// Returns true if running the same operation again may succeed.
    ///
    /// ## Retryable Errors
    /// - Another run in flight
    /// - Fetch timeouts and store failures
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BatchError::AlreadyRunning | BatchError::FetchTimeout { .. } | BatchError::Storage(_)
        )
    }

    /// Returns true if the message is meant for the operator as-is.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            BatchError::AlreadyRunning
                | BatchError::NothingToBatch { .. }
                | BatchError::BatchNotFound(_)
                | BatchError::InvalidPayload(_)
                | BatchError::Core(_)
        )
    }

    /// Process exit status for the command line.
    ///
    /// 2 when the input was understood but refused, 1 for anything else.
    pub fn exit_code(&self) -> u8 {
        if self.is_user_facing() {
            2
        } else {
            1
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            BatchError::InvalidConfig(_)
                | BatchError::ConfigLoadFailed(_)
                | BatchError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gangsheet_core::BatchStatus;

    #[test]
    fn test_nothing_placed_becomes_nothing_to_batch() {
        let err: BatchError = CoreError::Pack(PackError::NothingPlaced { considered: 4 }).into();
        assert!(matches!(err, BatchError::NothingToBatch { considered: 4 }));
        assert!(err.is_user_facing());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_core_errors_pass_through() {
        let err: BatchError = CoreError::InvalidStatusTransition {
            batch_id: "b-1".into(),
            from: BatchStatus::Printed,
            to: BatchStatus::Generated,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Batch b-1 cannot move from PRINTED to GENERATED"
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(BatchError::AlreadyRunning.is_retryable());
        assert!(BatchError::FetchTimeout {
            key: "uploads/a.png".into(),
            secs: 30
        }
        .is_retryable());
        assert!(!BatchError::InvalidConfig("dpi".into()).is_retryable());
        assert!(BatchError::ConfigLoadFailed("bad toml".into()).is_config_error());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(BatchError::NothingToBatch { considered: 0 }.exit_code(), 2);
        assert_eq!(BatchError::InvalidPayload("items".into()).exit_code(), 2);
        assert_eq!(BatchError::from(CoreError::PricingUnavailable).exit_code(), 2);
        assert_eq!(BatchError::Io("disk full".into()).exit_code(), 1);
        assert_eq!(BatchError::ObjectNotFound("uploads/a.png".into()).exit_code(), 1);
        assert_eq!(BatchError::ConfigLoadFailed("bad toml".into()).exit_code(), 1);
    }
}
