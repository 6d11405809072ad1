//! # Repository Module
//!
//! Database repository implementations for Clerk.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Caller                                                                │
//! │       │  db.clients().update_client(7, &changes)                       │
//! │       ▼                                                                 │
//! │  ClientRepository<'_>  (borrows the ConnectionManager mutably)         │
//! │       │                                                                 │
//! │       │  1. acquire()            connect-if-absent                     │
//! │       │  2. begin()              one transaction per mutation          │
//! │       │  3. execute(bound SQL)   statement from clerk-core             │
//! │       │  4. finish()             commit, or roll back + log            │
//! │       ▼                                                                 │
//! │  PostgreSQL                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ClientRepository`] - Client and phone CRUD, client search
//! - [`SalesReportRepository`] - Sales by publisher
//! - [`FixtureRepository`] - Bookstore seed import

pub mod client;
pub mod fixture;
pub mod report;

pub use client::{ClientRepository, UpdateOutcome};
pub use fixture::FixtureRepository;
pub use report::SalesReportRepository;

use sqlx::postgres::{PgArguments, PgConnection};
use sqlx::query::{Query, QueryAs};
use sqlx::{Connection, Postgres, Transaction};
use tracing::warn;

use clerk_core::SqlParam;

use crate::error::{DbError, DbResult};

/// Logs `err` for `operation` and hands it back.
pub(crate) fn logged(err: DbError, operation: &str) -> DbError {
    err.log(operation);
    err
}

/// Opens the transaction an operation runs in.
pub(crate) async fn begin<'c>(
    conn: &'c mut PgConnection,
    operation: &'static str,
) -> DbResult<Transaction<'c, Postgres>> {
    conn.begin()
        .await
        .map_err(|e| logged(e.into(), operation))
}

/// Commits on success; rolls back and logs on failure.
///
/// The rollback is explicit, but a dropped `Transaction` rolls back as well,
/// so an early return can never leave a half-applied write behind.
pub(crate) async fn finish<T>(
    tx: Transaction<'_, Postgres>,
    result: Result<T, sqlx::Error>,
    operation: &'static str,
) -> DbResult<T> {
    match result {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|e| logged(e.into(), operation))?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(operation, error = %rollback_err, "Rollback failed");
            }
            Err(logged(e.into(), operation))
        }
    }
}

/// Binds statement parameters in placeholder order.
pub(crate) fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [SqlParam],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            SqlParam::Int(value) => query.bind(*value),
            SqlParam::Text(value) => query.bind(value.as_str()),
        };
    }
    query
}

/// [`bind_params`] for typed row queries.
pub(crate) fn bind_params_as<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    params: &'q [SqlParam],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for param in params {
        query = match param {
            SqlParam::Int(value) => query.bind(*value),
            SqlParam::Text(value) => query.bind(value.as_str()),
        };
    }
    query
}
