//! # Connection Management
//!
//! One live PostgreSQL connection per session, established lazily.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     ConnectionManager state                             │
//! │                                                                         │
//! │      ConnectionManager::new(config)                                    │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │        ┌────────────────┐   acquire() / connect()   ┌──────────────┐   │
//! │        │  Disconnected  │ ────────────────────────► │  Connected   │   │
//! │        └────────────────┘                           └──────┬───────┘   │
//! │                 ▲        close()                           │           │
//! │                 ├──────────────────────────────────────────┤           │
//! │                 │        connection-level failure          │           │
//! │                 └──────────────────────────────────────────┘           │
//! │                                                                         │
//! │  Every repository operation starts with acquire(): connect-if-absent.  │
//! │  A failed connect leaves the manager Disconnected; the next operation  │
//! │  simply tries again.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! All operations take `&mut self`, so one manager can only ever run one
//! operation at a time. Callers that want parallel work open one manager
//! per task. There is no pool, timeout or cancellation.
//!
//! ## Release
//! `close()` is explicit and idempotent. Dropping the manager also releases
//! the socket, and every transaction is a scoped guard that rolls back on
//! any exit path that does not commit.

use sqlx::postgres::PgConnection;
use sqlx::Connection;
use tracing::{debug, info, warn};

use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use crate::repository::client::ClientRepository;
use crate::repository::fixture::FixtureRepository;
use crate::repository::report::SalesReportRepository;

/// Whether a live connection is held.
#[derive(Debug, Default)]
enum ConnectionState {
    #[default]
    Disconnected,
    Connected(PgConnection),
}

/// Owner of the session's single connection.
///
/// ## Usage
/// ```rust,ignore
/// let mut db = ConnectionManager::new(DbConfig::from_env()?);
///
/// let id = db.clients().add_client("Jane", "Doe", "jane@example.com").await?;
/// db.clients().add_phone(id, "+1 555 0100").await?;
///
/// db.close().await;
/// ```
#[derive(Debug)]
pub struct ConnectionManager {
    config: DbConfig,
    state: ConnectionState,
}

impl ConnectionManager {
    /// Creates a manager. No connection is opened until first use.
    pub fn new(config: DbConfig) -> Self {
        ConnectionManager {
            config,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected(_))
    }

    /// Opens the connection if none is held.
    ///
    /// ## Returns
    /// * `Ok(())` - A live connection is held (new or existing)
    /// * `Err(DbError::Connection)` - Configuration incomplete, network or
    ///   authentication failure. Already logged; the manager stays
    ///   Disconnected and the next operation retries.
    pub async fn connect(&mut self) -> DbResult<()> {
        if self.is_connected() {
            return Ok(());
        }

        let target = self.config.target();
        info!(target = %target, "Connecting to database");

        let options = self.config.connect_options().inspect_err(|e| e.log("connect"))?;

        let conn = PgConnection::connect_with(&options).await.map_err(|e| {
            // Every failure at this stage means the session never came up.
            let err = DbError::Connection(e.to_string());
            err.log("connect");
            err
        })?;

        info!(target = %target, "Database connection established");
        self.state = ConnectionState::Connected(conn);
        Ok(())
    }

    /// Returns the live connection, connecting first when necessary.
    pub(crate) async fn acquire(&mut self) -> DbResult<&mut PgConnection> {
        if !self.is_connected() {
            self.connect().await?;
        }

        match &mut self.state {
            ConnectionState::Connected(conn) => Ok(conn),
            ConnectionState::Disconnected => Err(DbError::Connection(
                "no connection after connect".to_string(),
            )),
        }
    }

    /// Drops a connection that failed at the transport level, so the next
    /// operation reconnects instead of reusing a dead socket.
    pub(crate) fn settle<T>(&mut self, result: &DbResult<T>) {
        if let Err(err) = result {
            if err.is_connection() && self.is_connected() {
                warn!("Discarding broken database connection");
                self.state = ConnectionState::Disconnected;
            }
        }
    }

    /// Closes the connection. Safe to call when none is open.
    pub async fn close(&mut self) {
        match std::mem::take(&mut self.state) {
            ConnectionState::Connected(conn) => {
                info!("Closing database connection");
                if let Err(e) = conn.close().await {
                    warn!(error = %e, "Error while closing database connection");
                }
            }
            ConnectionState::Disconnected => {
                debug!("close() called with no open connection");
            }
        }
    }

    /// Checks that the database answers a trivial query.
    ///
    /// ## Returns
    /// * `true` - Database is responsive
    /// * `false` - Database is unavailable (logged)
    pub async fn health_check(&mut self) -> bool {
        let result = match self.acquire().await {
            Ok(conn) => sqlx::query("SELECT 1")
                .execute(conn)
                .await
                .map(|_| ())
                .map_err(DbError::from),
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            err.log("health_check");
        }
        self.settle(&result);
        result.is_ok()
    }

    /// Returns the client directory repository.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let rows = db.clients().find_clients(&ClientFilter::new()).await?;
    /// ```
    pub fn clients(&mut self) -> ClientRepository<'_> {
        ClientRepository::new(self)
    }

    /// Returns the sales report repository.
    pub fn reports(&mut self) -> SalesReportRepository<'_> {
        SalesReportRepository::new(self)
    }

    /// Returns the fixture import repository.
    pub fn fixtures(&mut self) -> FixtureRepository<'_> {
        FixtureRepository::new(self)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn test_new_manager_is_lazy() {
        let db = ConnectionManager::new(DbConfig::new());
        assert!(!db.is_connected());
    }

    #[tokio::test]
    async fn test_incomplete_config_fails_without_panicking() {
        let mut db = ConnectionManager::new(DbConfig::new().host("localhost"));

        let err = db.connect().await.unwrap_err();
        assert!(err.is_connection());
        assert!(!db.is_connected());

        // Degraded mode: operations report the connection failure.
        let err = db.clients().delete_client(1).await.unwrap_err();
        assert!(err.is_connection());
        assert!(!db.health_check().await);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut db = ConnectionManager::new(DbConfig::new());
        db.close().await;
        db.close().await;
        assert!(!db.is_connected());
    }

    #[tokio::test]
    async fn test_connect_close_reconnect() {
        let Some(scratch) = test_support::ScratchDb::create().await else {
            return;
        };
        let mut db = scratch.manager();

        assert!(db.health_check().await);
        assert!(db.is_connected());

        db.close().await;
        assert!(!db.is_connected());
        db.close().await;

        // Lazy reconnect on the next operation.
        assert_eq!(db.clients().phone_count().await.unwrap(), 0);
        assert!(db.is_connected());

        db.close().await;
        scratch.drop_schema().await;
    }

    #[tokio::test]
    async fn test_terminated_backend_reconnects_on_next_operation() {
        let Some(scratch) = test_support::ScratchDb::create().await else {
            return;
        };
        let mut db = scratch.manager();
        let mut admin = scratch.manager();

        let pid: i32 = sqlx::query_scalar("SELECT pg_backend_pid()")
            .fetch_one(db.acquire().await.unwrap())
            .await
            .unwrap();
        let terminated: bool = sqlx::query_scalar("SELECT pg_terminate_backend($1)")
            .bind(pid)
            .fetch_one(admin.acquire().await.unwrap())
            .await
            .unwrap();
        assert!(terminated);
        admin.close().await;

        // The first call sees the dead session and drops it.
        let err = db.clients().get_client(1).await.unwrap_err();
        assert!(err.is_connection(), "unexpected error kind: {err:?}");
        assert!(!db.is_connected());

        // The next one reconnects.
        assert_eq!(db.clients().get_client(1).await.unwrap(), None);
        assert!(db.is_connected());

        db.close().await;
        scratch.drop_schema().await;
    }
}
