//! # Fixture Repository
//!
//! Seeds the bookstore tables from fixture records. Rows are inserted
//! verbatim, primary keys included, in document order and in a single
//! transaction: either the whole document lands or none of it does.
//! Referential integrity is whatever the database enforces.

use sqlx::postgres::PgConnection;
use tracing::{debug, info};

use clerk_core::fixtures::{parse_fixtures, FixtureModel, FixtureRow};

use crate::connection::ConnectionManager;
use crate::error::DbResult;
use crate::repository::{begin, finish, logged};

/// Repository for fixture import.
#[derive(Debug)]
pub struct FixtureRepository<'a> {
    db: &'a mut ConnectionManager,
}

async fn insert_row(conn: &mut PgConnection, row: &FixtureRow) -> Result<(), sqlx::Error> {
    match row {
        FixtureRow::Publisher(p) => {
            sqlx::query("INSERT INTO publisher (id, name) VALUES ($1, $2)")
                .bind(p.id)
                .bind(&p.name)
                .execute(conn)
                .await?
        }
        FixtureRow::Shop(s) => {
            sqlx::query("INSERT INTO shop (id, name) VALUES ($1, $2)")
                .bind(s.id)
                .bind(&s.name)
                .execute(conn)
                .await?
        }
        FixtureRow::Book(b) => {
            sqlx::query("INSERT INTO book (id, title, id_publisher) VALUES ($1, $2, $3)")
                .bind(b.id)
                .bind(&b.title)
                .bind(b.id_publisher)
                .execute(conn)
                .await?
        }
        FixtureRow::Stock(s) => {
            sqlx::query("INSERT INTO stock (id, id_book, id_shop, count) VALUES ($1, $2, $3, $4)")
                .bind(s.id)
                .bind(s.id_book)
                .bind(s.id_shop)
                .bind(s.count)
                .execute(conn)
                .await?
        }
        FixtureRow::Sale(s) => {
            sqlx::query(
                "INSERT INTO sale (id, price, date_sale, id_stock, count) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(s.id)
            .bind(s.price)
            .bind(s.date_sale)
            .bind(s.id_stock)
            .bind(s.count)
            .execute(conn)
            .await?
        }
    };
    Ok(())
}

/// Moves each table's id sequence past the explicit keys just inserted.
async fn advance_sequences(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    for model in FixtureModel::ALL {
        let table = model.table();
        sqlx::query(&format!(
            "SELECT setval(pg_get_serial_sequence('{table}', 'id'), \
             COALESCE((SELECT MAX(id) FROM {table}), 0) + 1, false)"
        ))
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

impl<'a> FixtureRepository<'a> {
    pub fn new(db: &'a mut ConnectionManager) -> Self {
        FixtureRepository { db }
    }

    /// Inserts decoded rows.
    ///
    /// ## Returns
    /// * `Ok(n)` - All `n` rows were inserted
    /// * `Err(DbError::Constraint)` - A row broke a key or reference; nothing was kept
    pub async fn load(&mut self, rows: &[FixtureRow]) -> DbResult<usize> {
        const OP: &str = "load_fixtures";
        debug!(rows = rows.len(), "Loading fixtures");

        let result = async {
            let conn = self.db.acquire().await?;
            let mut tx = begin(conn, OP).await?;
            let inserted: Result<usize, sqlx::Error> = async {
                for row in rows {
                    insert_row(&mut tx, row).await?;
                }
                advance_sequences(&mut tx).await?;
                Ok(rows.len())
            }
            .await;
            finish(tx, inserted, OP).await
        }
        .await;

        self.db.settle(&result);
        if let Ok(count) = &result {
            info!(rows = count, "Fixtures loaded");
        }
        result
    }

    /// Parses a fixture document and inserts it.
    pub async fn load_json(&mut self, json: &str) -> DbResult<usize> {
        let rows = parse_fixtures(json).map_err(|e| logged(e.into(), "load_fixtures"))?;
        self.load(&rows).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConstraintKind, DbError};
    use crate::test_support::ScratchDb;

    #[tokio::test]
    async fn test_invalid_document_is_rejected_before_connecting() {
        let mut db = ConnectionManager::new(crate::DbConfig::new());

        let err = db.fixtures().load_json("{not json").await.unwrap_err();
        assert!(matches!(err, DbError::Fixture(_)));
        assert!(!db.is_connected());
    }

    #[tokio::test]
    async fn test_broken_reference_rolls_back_whole_document() {
        let Some(scratch) = ScratchDb::create().await else {
            return;
        };
        let mut db = scratch.manager();

        let err = db
            .fixtures()
            .load_json(
                r#"[
                    {"model": "publisher", "pk": 1, "fields": {"name": "Penguin"}},
                    {"model": "book", "pk": 1, "fields": {"title": "Orphan", "id_publisher": 99}}
                ]"#,
            )
            .await
            .unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::ForeignKey));

        let conn = db.acquire().await.unwrap();
        let publishers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM publisher")
            .fetch_one(conn)
            .await
            .unwrap();
        assert_eq!(publishers, 0);

        db.close().await;
        scratch.drop_schema().await;
    }

    #[tokio::test]
    async fn test_sequences_follow_loaded_keys() {
        let Some(scratch) = ScratchDb::create().await else {
            return;
        };
        let mut db = scratch.manager();

        let loaded = db
            .fixtures()
            .load_json(r#"[{"model": "shop", "pk": 7, "fields": {"name": "Labirint"}}]"#)
            .await
            .unwrap();
        assert_eq!(loaded, 1);

        let conn = db.acquire().await.unwrap();
        let next: i32 = sqlx::query_scalar("INSERT INTO shop (name) VALUES ('Bukvoed') RETURNING id")
            .fetch_one(conn)
            .await
            .unwrap();
        assert_eq!(next, 8);

        db.close().await;
        scratch.drop_schema().await;
    }
}
