//! # Error Types
//!
//! Domain-specific error types for gangsheet-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  gangsheet-core errors (this file)                                     │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── ValidationError  - Input / settings validation failures           │
//! │  ├── TierRangeError   - Tier table partition failures (admin-facing)   │
//! │  └── PackError        - Nothing could be placed on the sheet           │
//! │                                                                         │
//! │  gangsheet-batch errors (separate crate)                               │
//! │  └── BatchError       - Orchestration / collaborator failures          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → BatchError → caller               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item id, field, etc.)
//! 3. Errors are enum variants, never String
//! 4. Tier range messages are shown to the admin verbatim

use thiserror::Error;

use crate::types::BatchStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No pricing tiers are configured.
    ///
    /// ## When This Occurs
    /// - The tier table is empty (fresh install, admin deleted every tier)
    ///
    /// Callers must refuse to price instead of inventing a subtotal.
    #[error("Pricing unavailable: no pricing tiers are configured")]
    PricingUnavailable,

    /// A batch sheet cannot move from its current status to the requested one.
    ///
    /// ## Allowed Transitions
    /// ```text
    /// Generated ──► Printed
    /// Generated ◄─► Archived
    /// ```
    #[error("Batch {batch_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        batch_id: String,
        from: BatchStatus,
        to: BatchStatus,
    },

    /// Tier table failed range validation.
    #[error("Invalid tier table: {0}")]
    TierRange(#[from] TierRangeError),

    /// Packing produced no placements.
    #[error(transparent)]
    Pack(#[from] PackError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when settings or order input don't meet requirements.
/// Used for early validation before pricing or packing runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value must be a finite number.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Invalid format or relationship between fields.
    #[error("{field} is invalid: {reason}")]
    Invalid { field: String, reason: String },
}

impl ValidationError {
    /// Creates an `Invalid` error for a field.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Tier Range Error
// =============================================================================

/// Reasons a proposed tier table is not a contiguous partition of the area axis.
///
/// The `Display` text is what the admin sees; it is never auto-corrected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TierRangeError {
    #[error("Add at least one pricing tier.")]
    Empty,

    #[error("Each tier must have minSqIn < maxSqIn.")]
    MinNotBelowMax { sort_order: i32 },

    #[error("Only the last tier can have an open-ended max.")]
    OpenEndedNotLast { sort_order: i32 },

    #[error("Tiers must be contiguous with no gaps or overlaps.")]
    NotContiguous { after_sort_order: i32 },
}

// =============================================================================
// Pack Error
// =============================================================================

/// Packing outcome that is reported to the user, not a system fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    /// Not a single item could be placed on the sheet.
    ///
    /// ## When This Occurs
    /// - The queue (or the selected subset) is empty
    /// - Every item lacks a source image
    /// - Every item is wider than the printable width
    /// - The first item is taller than the sheet's max length
    #[error("Nothing could be batched ({considered} items considered)")]
    NothingPlaced { considered: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_range_messages_are_admin_facing() {
        assert_eq!(TierRangeError::Empty.to_string(), "Add at least one pricing tier.");
        assert_eq!(
            TierRangeError::NotContiguous { after_sort_order: 1 }.to_string(),
            "Tiers must be contiguous with no gaps or overlaps."
        );
    }

    #[test]
    fn test_status_transition_message() {
        let err = CoreError::InvalidStatusTransition {
            batch_id: "b-1".to_string(),
            from: BatchStatus::Printed,
            to: BatchStatus::Generated,
        };
        assert_eq!(err.to_string(), "Batch b-1 cannot move from PRINTED to GENERATED");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "width_in".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_pack_error_message() {
        let err: CoreError = PackError::NothingPlaced { considered: 3 }.into();
        assert_eq!(err.to_string(), "Nothing could be batched (3 items considered)");
    }
}
