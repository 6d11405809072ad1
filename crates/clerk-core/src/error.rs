//! # Error Types
//!
//! Domain-specific error types for clerk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  clerk-core errors (this file)                                         │
//! │  ├── CoreError        - Fixture and validation failures                │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  clerk-db errors (separate crate)                                      │
//! │  └── DbError          - Connection / constraint / query failures       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised by the pure layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A fixture document or record could not be decoded.
    ///
    /// ## When This Occurs
    /// - The document is not a JSON array
    /// - A record names an unknown model kind
    /// - A record's `fields` miss a required column or carry a bad value
    #[error("Invalid fixture: {0}")]
    InvalidFixture(#[from] serde_json::Error),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Checked before a statement is sent so obviously bad input never opens a
/// transaction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is longer than its column.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
