//! # Client Repository
//!
//! Transactional CRUD and search over `clients` and `phones`.
//!
//! ## Operation Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_client / add_phone / update_client / delete_phone / delete_client │
//! │                                                                         │
//! │   acquire() ──► BEGIN ──► statement ──► COMMIT ──► Ok(value)           │
//! │                               │                                         │
//! │                               └── error ──► ROLLBACK ──► log ──► Err   │
//! │                                                                         │
//! │  Errors come back typed (Constraint / Query / Connection), so callers  │
//! │  can tell "nothing matched" (Ok(0), Ok(vec![])) from "it failed".      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deleting a client removes its phones through the schema's
//! `ON DELETE CASCADE`; no phone rows are touched here.

use tracing::debug;

use clerk_core::query::{build_client_search, build_client_update};
use clerk_core::validation::{validate_client_changes, validate_new_client, validate_phone_number};
use clerk_core::{Client, ClientChanges, ClientFilter, ClientRow, Phone};

use crate::connection::ConnectionManager;
use crate::error::DbResult;
use crate::repository::{begin, bind_params, bind_params_as, finish, logged};

/// Result of [`ClientRepository::update_client`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No field was supplied; no statement was issued.
    NoChanges,
    /// The update ran; `rows` is 0 when the id does not exist.
    Updated { rows: u64 },
}

/// Repository for the client directory.
#[derive(Debug)]
pub struct ClientRepository<'a> {
    db: &'a mut ConnectionManager,
}

impl<'a> ClientRepository<'a> {
    pub fn new(db: &'a mut ConnectionManager) -> Self {
        ClientRepository { db }
    }

    /// Inserts a client.
    ///
    /// ## Returns
    /// * `Ok(id)` - The new client's id
    /// * `Err(DbError::Constraint { kind: Unique, .. })` - Email already used
    /// * `Err(DbError::Validation)` - Empty or oversized field, nothing sent
    pub async fn add_client(
        &mut self,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> DbResult<i32> {
        const OP: &str = "add_client";
        validate_new_client(first_name, last_name, email).map_err(|e| logged(e.into(), OP))?;

        debug!(email, "Adding client");

        let result = async {
            let conn = self.db.acquire().await?;
            let mut tx = begin(conn, OP).await?;
            let inserted = sqlx::query_scalar::<_, i32>(
                "INSERT INTO clients (first_name, last_name, email) VALUES ($1, $2, $3) RETURNING id",
            )
            .bind(first_name)
            .bind(last_name)
            .bind(email)
            .fetch_one(&mut *tx)
            .await;
            finish(tx, inserted, OP).await
        }
        .await;

        self.db.settle(&result);
        result
    }

    /// Inserts a phone number for an existing client.
    ///
    /// ## Returns
    /// * `Ok(id)` - The new phone's id
    /// * `Err(DbError::Constraint { kind: ForeignKey, .. })` - Unknown client;
    ///   the phones table is left unchanged
    pub async fn add_phone(&mut self, client_id: i32, number: &str) -> DbResult<i32> {
        const OP: &str = "add_phone";
        validate_phone_number(number).map_err(|e| logged(e.into(), OP))?;

        debug!(client_id, number, "Adding phone");

        let result = async {
            let conn = self.db.acquire().await?;
            let mut tx = begin(conn, OP).await?;
            let inserted = sqlx::query_scalar::<_, i32>(
                "INSERT INTO phones (client_id, phone_number) VALUES ($1, $2) RETURNING id",
            )
            .bind(client_id)
            .bind(number)
            .fetch_one(&mut *tx)
            .await;
            finish(tx, inserted, OP).await
        }
        .await;

        self.db.settle(&result);
        result
    }

    /// Updates only the supplied fields of one client.
    ///
    /// Supplied values are validated like [`Self::add_client`] input. The
    /// connection is then ensured, as for every operation. When `changes`
    /// supplies nothing, no statement is issued and the row stays as it was.
    ///
    /// ## Returns
    /// * `Ok(UpdateOutcome)` - See [`UpdateOutcome`]
    /// * `Err(DbError::Constraint { kind: Unique, .. })` - Email already used;
    ///   the row is left unchanged
    /// * `Err(DbError::Validation)` - Oversized field, nothing sent
    pub async fn update_client(
        &mut self,
        client_id: i32,
        changes: &ClientChanges,
    ) -> DbResult<UpdateOutcome> {
        const OP: &str = "update_client";
        validate_client_changes(changes).map_err(|e| logged(e.into(), OP))?;

        let result = async {
            let conn = self.db.acquire().await?;

            let Some(statement) = build_client_update(client_id, changes) else {
                debug!(client_id, "No fields supplied, skipping update");
                return Ok(UpdateOutcome::NoChanges);
            };

            debug!(client_id, sql = %statement.sql, "Updating client");

            let mut tx = begin(conn, OP).await?;
            let updated = bind_params(sqlx::query(&statement.sql), &statement.params)
                .execute(&mut *tx)
                .await
                .map(|done| UpdateOutcome::Updated {
                    rows: done.rows_affected(),
                });
            finish(tx, updated, OP).await
        }
        .await;

        self.db.settle(&result);
        result
    }

    /// Deletes the phones of `client_id` whose number equals `number`.
    ///
    /// ## Returns
    /// Number of rows removed; zero is not an error.
    pub async fn delete_phone(&mut self, client_id: i32, number: &str) -> DbResult<u64> {
        const OP: &str = "delete_phone";
        debug!(client_id, number, "Deleting phone");

        let result = async {
            let conn = self.db.acquire().await?;
            let mut tx = begin(conn, OP).await?;
            let deleted = sqlx::query("DELETE FROM phones WHERE client_id = $1 AND phone_number = $2")
                .bind(client_id)
                .bind(number)
                .execute(&mut *tx)
                .await
                .map(|done| done.rows_affected());
            finish(tx, deleted, OP).await
        }
        .await;

        self.db.settle(&result);
        result
    }

    /// Deletes a client; its phones go with it (ON DELETE CASCADE).
    pub async fn delete_client(&mut self, client_id: i32) -> DbResult<u64> {
        const OP: &str = "delete_client";
        debug!(client_id, "Deleting client");

        let result = async {
            let conn = self.db.acquire().await?;
            let mut tx = begin(conn, OP).await?;
            let deleted = sqlx::query("DELETE FROM clients WHERE id = $1")
                .bind(client_id)
                .execute(&mut *tx)
                .await
                .map(|done| done.rows_affected());
            finish(tx, deleted, OP).await
        }
        .await;

        self.db.settle(&result);
        result
    }

    /// Searches clients by any combination of name, email and phone number.
    ///
    /// ## Returns
    /// One row per (client, phone) pair; clients without phones appear once
    /// with `phone_number: None`. An empty vector means nothing matched.
    pub async fn find_clients(&mut self, filter: &ClientFilter) -> DbResult<Vec<ClientRow>> {
        const OP: &str = "find_clients";
        let statement = build_client_search(filter);
        debug!(sql = %statement.sql, "Searching clients");

        let result = async {
            let conn = self.db.acquire().await?;
            bind_params_as(sqlx::query_as::<_, ClientRow>(&statement.sql), &statement.params)
                .fetch_all(conn)
                .await
                .map_err(|e| logged(e.into(), OP))
        }
        .await;

        self.db.settle(&result);
        result
    }

    /// Gets a client by id.
    pub async fn get_client(&mut self, client_id: i32) -> DbResult<Option<Client>> {
        const OP: &str = "get_client";

        let result = async {
            let conn = self.db.acquire().await?;
            sqlx::query_as::<_, Client>(
                "SELECT id, first_name, last_name, email FROM clients WHERE id = $1",
            )
            .bind(client_id)
            .fetch_optional(conn)
            .await
            .map_err(|e| logged(e.into(), OP))
        }
        .await;

        self.db.settle(&result);
        result
    }

    /// Gets all phones of a client, oldest first.
    pub async fn phones_of(&mut self, client_id: i32) -> DbResult<Vec<Phone>> {
        const OP: &str = "phones_of";

        let result = async {
            let conn = self.db.acquire().await?;
            sqlx::query_as::<_, Phone>(
                "SELECT id, client_id, phone_number FROM phones WHERE client_id = $1 ORDER BY id",
            )
            .bind(client_id)
            .fetch_all(conn)
            .await
            .map_err(|e| logged(e.into(), OP))
        }
        .await;

        self.db.settle(&result);
        result
    }

    /// Counts all phone rows (for diagnostics).
    pub async fn phone_count(&mut self) -> DbResult<i64> {
        const OP: &str = "phone_count";

        let result = async {
            let conn = self.db.acquire().await?;
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM phones")
                .fetch_one(conn)
                .await
                .map_err(|e| logged(e.into(), OP))
        }
        .await;

        self.db.settle(&result);
        result
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
