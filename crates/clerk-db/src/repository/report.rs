//! # Sales Report Repository
//!
//! Runs the five-table join behind the sales-by-publisher report. Layout
//! and ordering rules live in [`clerk_core::report`].

use tracing::{debug, info};

use clerk_core::report::sales_report_statement;
use clerk_core::{PublisherRef, SaleLine, SalesReport};

use crate::connection::ConnectionManager;
use crate::error::DbResult;
use crate::repository::{bind_params_as, logged};

/// Repository for the bookstore sales report.
#[derive(Debug)]
pub struct SalesReportRepository<'a> {
    db: &'a mut ConnectionManager,
}

impl<'a> SalesReportRepository<'a> {
    pub fn new(db: &'a mut ConnectionManager) -> Self {
        SalesReportRepository { db }
    }

    /// Lists the sales of one publisher, newest first.
    ///
    /// ## Returns
    /// * `Ok(SalesReport::NoSales)` - The publisher sold nothing (or does not exist)
    /// * `Ok(SalesReport::Sales(lines))` - At least one sale
    /// * `Err(DbError)` - The query itself failed
    pub async fn sales_by_publisher(&mut self, publisher: &PublisherRef) -> DbResult<SalesReport> {
        const OP: &str = "sales_by_publisher";
        let statement = sales_report_statement(publisher);
        debug!(publisher = %publisher, "Querying sales");

        let result = async {
            let conn = self.db.acquire().await?;
            bind_params_as(sqlx::query_as::<_, SaleLine>(&statement.sql), &statement.params)
                .fetch_all(conn)
                .await
                .map_err(|e| logged(e.into(), OP))
        }
        .await;

        self.db.settle(&result);

        let report = SalesReport::from_lines(result?);
        match &report {
            SalesReport::NoSales => info!(publisher = %publisher, "No sales found"),
            SalesReport::Sales(lines) => {
                debug!(publisher = %publisher, count = lines.len(), "Sales found")
            }
        }
        Ok(report)
    }

    /// Same as [`Self::sales_by_publisher`], interpreting raw user input
    /// (all digits → id, anything else → name).
    pub async fn sales_by_publisher_input(&mut self, input: &str) -> DbResult<SalesReport> {
        self.sales_by_publisher(&PublisherRef::parse(input)).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScratchDb;

    const FIXTURE: &str = r#"[
        {"model": "publisher", "pk": 1, "fields": {"name": "Penguin"}},
        {"model": "publisher", "pk": 2, "fields": {"name": "Quiet House"}},
        {"model": "publisher", "pk": 3, "fields": {"name": "42"}},
        {"model": "shop", "pk": 1, "fields": {"name": "ShopA"}},
        {"model": "shop", "pk": 2, "fields": {"name": "B"}},
        {"model": "book", "pk": 1, "fields": {"title": "Short", "id_publisher": 1}},
        {"model": "book", "pk": 2, "fields": {"title": "LongerTitle", "id_publisher": 1}},
        {"model": "book", "pk": 3, "fields": {"title": "Unsold", "id_publisher": 2}},
        {"model": "stock", "pk": 1, "fields": {"id_book": 1, "id_shop": 1, "count": 3}},
        {"model": "stock", "pk": 2, "fields": {"id_book": 2, "id_shop": 2, "count": 5}},
        {"model": "stock", "pk": 3, "fields": {"id_book": 3, "id_shop": 1, "count": 1}},
        {"model": "sale", "pk": 1, "fields": {"price": "9.5", "date_sale": "2023-01-01T10:00:00", "id_stock": 1, "count": 1}},
        {"model": "sale", "pk": 2, "fields": {"price": 120, "date_sale": "2023-02-02T10:00:00", "id_stock": 2, "count": 1}}
    ]"#;

    #[tokio::test]
    async fn test_report_by_id_and_by_name() {
        let Some(scratch) = ScratchDb::create().await else {
            return;
        };
        let mut db = scratch.manager();
        db.fixtures().load_json(FIXTURE).await.unwrap();

        let by_id = db.reports().sales_by_publisher_input("1").await.unwrap();
        let by_name = db.reports().sales_by_publisher_input("Penguin").await.unwrap();
        assert_eq!(by_id, by_name);

        assert_eq!(
            by_id.render(),
            "LongerTitle | B     | 120.00 | 02-02-2023\nShort       | ShopA |   9.50 | 01-01-2023"
        );

        db.close().await;
        scratch.drop_schema().await;
    }

    #[tokio::test]
    async fn test_report_without_sales() {
        let Some(scratch) = ScratchDb::create().await else {
            return;
        };
        let mut db = scratch.manager();
        db.fixtures().load_json(FIXTURE).await.unwrap();

        let unsold = db.reports().sales_by_publisher_input("Quiet House").await.unwrap();
        assert_eq!(unsold, SalesReport::NoSales);

        let unknown = db.reports().sales_by_publisher_input("Nobody").await.unwrap();
        assert!(unknown.is_empty());

        // A publisher named "42" is looked up as id 42, which does not exist.
        let digits = db.reports().sales_by_publisher_input("42").await.unwrap();
        assert!(digits.is_empty());

        db.close().await;
        scratch.drop_schema().await;
    }
}
