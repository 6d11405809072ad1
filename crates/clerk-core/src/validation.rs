//! # Validation Module
//!
//! Input checks run before a client or phone row is written.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front-end                                                    │
//! │  └── Collects raw text                                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Empty / whitespace-only values                                    │
//! │  └── Column sizes (VARCHAR(100), VARCHAR(20))                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (PostgreSQL)                                        │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE (clients.email)                                            │
//! │  └── FOREIGN KEY (phones.client_id)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Uniqueness and referential checks are left to the database; they surface
//! as constraint errors from clerk-db.

use crate::error::ValidationError;
use crate::query::{ClientChanges, ClientField};
use crate::{MAX_CLIENT_FIELD_LEN, MAX_PHONE_NUMBER_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a first or last name.
///
/// ## Example
/// ```rust
/// use clerk_core::validation::validate_name;
///
/// assert!(validate_name("first_name", "Jane").is_ok());
/// assert!(validate_name("first_name", "  ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    validate_text(field, name, MAX_CLIENT_FIELD_LEN)
}

/// Validates an email address. Only presence and length are checked.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    validate_text("email", email, MAX_CLIENT_FIELD_LEN)
}

/// Validates a phone number string.
pub fn validate_phone_number(number: &str) -> ValidationResult<()> {
    validate_text("phone_number", number, MAX_PHONE_NUMBER_LEN)
}

/// Validates all three fields of a new client.
pub fn validate_new_client(first_name: &str, last_name: &str, email: &str) -> ValidationResult<()> {
    validate_name("first_name", first_name)?;
    validate_name("last_name", last_name)?;
    validate_email(email)
}

/// Validates the fields a partial update would write.
///
/// Unsupplied (absent or blank) fields are skipped, so an empty change set
/// is valid.
pub fn validate_client_changes(changes: &ClientChanges) -> ValidationResult<()> {
    for (field, value) in changes.supplied() {
        match field {
            ClientField::Email => validate_email(value)?,
            ClientField::PhoneNumber => validate_phone_number(value)?,
            ClientField::FirstName | ClientField::LastName => validate_name(field.column(), value)?,
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
