//! # Table Bootstrap
//!
//! Idempotent DDL for the two schemas. There is no versioning: every
//! statement is `IF NOT EXISTS`, and changing an existing table is out of
//! scope.
//!
//! ## Process
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Bootstrap Process                                  │
//! │                                                                         │
//! │  create_database("clients_db")      (on a maintenance database)        │
//! │       │                                                                 │
//! │       ├── exists? → skip                                               │
//! │       ▼                                                                 │
//! │  CREATE DATABASE "clients_db"                                          │
//! │                                                                         │
//! │  create_client_tables()             (one transaction)                  │
//! │       ├── clients                                                      │
//! │       └── phones  (client_id → clients ON DELETE CASCADE)              │
//! │                                                                         │
//! │  create_bookstore_tables()          (one transaction)                  │
//! │       ├── publisher, shop                                              │
//! │       ├── book   (id_publisher → publisher)                            │
//! │       ├── stock  (id_book → book, id_shop → shop)                      │
//! │       └── sale   (id_stock → stock)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::info;

use crate::connection::ConnectionManager;
use crate::error::DbResult;
use crate::repository::{begin, finish, logged};

const CLIENT_TABLES: [&str; 2] = [
    "CREATE TABLE IF NOT EXISTS clients (
        id SERIAL PRIMARY KEY,
        first_name VARCHAR(100) NOT NULL,
        last_name VARCHAR(100) NOT NULL,
        email VARCHAR(100) UNIQUE NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS phones (
        id SERIAL PRIMARY KEY,
        client_id INT REFERENCES clients(id) ON DELETE CASCADE,
        phone_number VARCHAR(20) NOT NULL
    )",
];

const BOOKSTORE_TABLES: [&str; 5] = [
    "CREATE TABLE IF NOT EXISTS publisher (
        id SERIAL PRIMARY KEY,
        name VARCHAR NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS shop (
        id SERIAL PRIMARY KEY,
        name VARCHAR NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS book (
        id SERIAL PRIMARY KEY,
        title VARCHAR NOT NULL,
        id_publisher INTEGER NOT NULL REFERENCES publisher(id)
    )",
    "CREATE TABLE IF NOT EXISTS stock (
        id SERIAL PRIMARY KEY,
        id_book INTEGER NOT NULL REFERENCES book(id),
        id_shop INTEGER NOT NULL REFERENCES shop(id),
        count INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS sale (
        id SERIAL PRIMARY KEY,
        price DOUBLE PRECISION NOT NULL,
        date_sale TIMESTAMP NOT NULL,
        id_stock INTEGER NOT NULL REFERENCES stock(id),
        count INTEGER NOT NULL DEFAULT 1
    )",
];

async fn run_ddl(
    db: &mut ConnectionManager,
    statements: &[&str],
    operation: &'static str,
) -> DbResult<()> {
    let result = async {
        let conn = db.acquire().await?;
        let mut tx = begin(conn, operation).await?;
        let mut outcome = Ok(());
        for statement in statements {
            if let Err(e) = sqlx::query(statement).execute(&mut *tx).await {
                outcome = Err(e);
                break;
            }
        }
        finish(tx, outcome, operation).await
    }
    .await;

    db.settle(&result);
    result
}

/// Creates `clients` and `phones` if they do not exist.
pub async fn create_client_tables(db: &mut ConnectionManager) -> DbResult<()> {
    run_ddl(db, &CLIENT_TABLES, "create_client_tables").await?;
    info!("Tables 'clients' and 'phones' are ready");
    Ok(())
}

/// Creates the five bookstore tables if they do not exist.
pub async fn create_bookstore_tables(db: &mut ConnectionManager) -> DbResult<()> {
    run_ddl(db, &BOOKSTORE_TABLES, "create_bookstore_tables").await?;
    info!("Bookstore tables are ready");
    Ok(())
}

/// Quotes an identifier for PostgreSQL (`"` doubled inside).
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Creates database `name` unless it already exists.
///
/// `db` must be connected to some other database of the same server
/// (typically `postgres`). `CREATE DATABASE` cannot run inside a transaction,
/// so this is the one statement issued without one.
///
/// ## Returns
/// * `Ok(true)` - The database was created
/// * `Ok(false)` - It already existed
pub async fn create_database(db: &mut ConnectionManager, name: &str) -> DbResult<bool> {
    const OP: &str = "create_database";

    let result = async {
        let conn = db.acquire().await?;

        let exists: Option<i32> = sqlx::query_scalar("SELECT 1 FROM pg_database WHERE datname = $1")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| logged(e.into(), OP))?;
        if exists.is_some() {
            return Ok(false);
        }

        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(name)))
            .execute(&mut *conn)
            .await
            .map_err(|e| logged(e.into(), OP))?;
        Ok(true)
    }
    .await;

    db.settle(&result);
    match &result {
        Ok(true) => info!(database = name, "Database created"),
        Ok(false) => info!(database = name, "Database already exists"),
        Err(_) => {}
    }
    result
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScratchDb;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("clients_db"), "\"clients_db\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_phones_cascade_with_client() {
        assert!(CLIENT_TABLES[1].contains("ON DELETE CASCADE"));
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let Some(scratch) = ScratchDb::create().await else {
            return;
        };
        let mut db = scratch.manager();

        // ScratchDb already ran both once.
        create_client_tables(&mut db).await.unwrap();
        create_bookstore_tables(&mut db).await.unwrap();

        db.close().await;
        scratch.drop_schema().await;
    }
}
