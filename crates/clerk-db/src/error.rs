//! # Database Error Types
//!
//! Error kinds for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  PostgreSQL Error (sqlx::Error)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← classified by SQLSTATE / failure class        │
//! │       │                                                                 │
//! │       ├── logged once where it happened (DbError::log)                 │
//! │       ├── transaction rolled back                                      │
//! │       ▼                                                                 │
//! │  Err(DbError) to caller ← "failed" stays distinct from "empty"         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use sqlx::error::ErrorKind;
use thiserror::Error;
use tracing::{error, warn};

use clerk_core::{CoreError, ValidationError};

/// Which integrity rule a write broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// `23505`: e.g. duplicate `clients.email`.
    Unique,
    /// `23503`: e.g. phone for a client that does not exist.
    ForeignKey,
    /// `23502`
    NotNull,
    /// `23514`
    Check,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintKind::Unique => "unique",
            ConstraintKind::ForeignKey => "foreign key",
            ConstraintKind::NotNull => "not null",
            ConstraintKind::Check => "check",
        };
        f.write_str(name)
    }
}

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// The database could not be reached or authenticated against.
    ///
    /// ## When This Occurs
    /// - Incomplete configuration (missing host, user, ...)
    /// - Network failure, refused connection, bad credentials
    /// - The connection dropped in the middle of an operation
    #[error("Connection failed: {0}")]
    Connection(String),

    /// An integrity constraint rejected a write.
    #[error("{kind} constraint violated: {message}")]
    Constraint { kind: ConstraintKind, message: String },

    /// A statement was malformed or failed while executing.
    #[error("Query failed: {0}")]
    Query(String),

    /// Input was rejected before any statement was sent.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// A fixture document could not be decoded.
    #[error("Invalid fixture: {0}")]
    Fixture(String),
}

impl DbError {
    /// Shorthand used by tests and callers matching on the kind.
    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        match self {
            DbError::Constraint { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, DbError::Connection(_))
    }

    /// Logs the error for `operation` at a level matching its kind.
    ///
    /// Constraint and validation failures are caller mistakes and go out as
    /// warnings; connection and query failures are errors.
    pub fn log(&self, operation: &str) {
        match self {
            DbError::Constraint { kind, message } => {
                warn!(operation, constraint = %kind, message = %message, "Constraint violation, rolled back");
            }
            DbError::Validation(err) => {
                warn!(operation, error = %err, "Rejected invalid input");
            }
            DbError::Fixture(message) => {
                warn!(operation, message = %message, "Rejected fixture document");
            }
            DbError::Connection(message) => {
                error!(operation, message = %message, "Database connection failure");
            }
            DbError::Query(message) => {
                error!(operation, message = %message, "Query failure");
            }
        }
    }
}

/// SQLSTATEs after which the session is gone: class `08` (connection
/// exception) and `57P01`..`57P03` (server shutdown or backend terminated).
fn is_connection_sqlstate(code: &str) -> bool {
    code.starts_with("08") || matches!(code, "57P01" | "57P02" | "57P03")
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → Connection (SQLSTATE 08xxx, 57P01-57P03),
///                               Constraint (class 23) or Query
/// Io / Tls / Configuration    → Connection
/// PoolTimedOut / PoolClosed   → Connection
/// Other                       → Query
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                if db_err.code().is_some_and(|code| is_connection_sqlstate(&code)) {
                    return DbError::Connection(message);
                }
                let kind = match db_err.kind() {
                    ErrorKind::UniqueViolation => Some(ConstraintKind::Unique),
                    ErrorKind::ForeignKeyViolation => Some(ConstraintKind::ForeignKey),
                    ErrorKind::NotNullViolation => Some(ConstraintKind::NotNull),
                    ErrorKind::CheckViolation => Some(ConstraintKind::Check),
                    _ => None,
                };
                match kind {
                    Some(kind) => DbError::Constraint { kind, message },
                    None => DbError::Query(message),
                }
            }

            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => DbError::Connection(err.to_string()),

            _ => DbError::Query(err.to_string()),
        }
    }
}

impl From<CoreError> for DbError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(err) => DbError::Validation(err),
            CoreError::InvalidFixture(err) => DbError::Fixture(err.to_string()),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================
