//! # Fixture Records
//!
//! Seed data for the bookstore schema, one JSON record per row:
//!
//! ```json
//! [
//!   {"model": "publisher", "pk": 1, "fields": {"name": "O'Reilly"}},
//!   {"model": "book", "pk": 1, "fields": {"title": "Programming Python", "id_publisher": 1}},
//!   {"model": "shop", "pk": 1, "fields": {"name": "Labirint"}},
//!   {"model": "stock", "pk": 1, "fields": {"id_shop": 1, "id_book": 1, "count": 34}},
//!   {"model": "sale", "pk": 1, "fields": {"price": "50.05", "date_sale": "2018-10-25T09:45:24.552Z", "count": 16, "id_stock": 1}}
//! ]
//! ```
//!
//! Each record decodes into a typed entity, so the set of columns written
//! per kind is fixed here and never taken from the document. Referential
//! integrity is not checked; the database enforces it on insert.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use crate::error::CoreResult;
use crate::types::{Book, Publisher, Sale, Shop, Stock};

/// Entity kind named by a record's `model` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureModel {
    Publisher,
    Shop,
    Book,
    Stock,
    Sale,
}

impl FixtureModel {
    /// Table the kind is stored in.
    pub const fn table(self) -> &'static str {
        match self {
            FixtureModel::Publisher => "publisher",
            FixtureModel::Shop => "shop",
            FixtureModel::Book => "book",
            FixtureModel::Stock => "stock",
            FixtureModel::Sale => "sale",
        }
    }

    /// All kinds, parents before children.
    pub const ALL: [FixtureModel; 5] = [
        FixtureModel::Publisher,
        FixtureModel::Shop,
        FixtureModel::Book,
        FixtureModel::Stock,
        FixtureModel::Sale,
    ];
}

/// One raw record of a fixture document.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureRecord {
    pub model: FixtureModel,
    pub pk: i32,
    pub fields: serde_json::Value,
}

/// A decoded record, ready to insert with its primary key.
#[derive(Debug, Clone, PartialEq)]
pub enum FixtureRow {
    Publisher(Publisher),
    Shop(Shop),
    Book(Book),
    Stock(Stock),
    Sale(Sale),
}

impl FixtureRow {
    pub fn model(&self) -> FixtureModel {
        match self {
            FixtureRow::Publisher(_) => FixtureModel::Publisher,
            FixtureRow::Shop(_) => FixtureModel::Shop,
            FixtureRow::Book(_) => FixtureModel::Book,
            FixtureRow::Stock(_) => FixtureModel::Stock,
            FixtureRow::Sale(_) => FixtureModel::Sale,
        }
    }
}

// -----------------------------------------------------------------------------
// Per-kind field sets
// -----------------------------------------------------------------------------

#[derive(Deserialize)]
struct NamedFields {
    name: String,
}

#[derive(Deserialize)]
struct BookFields {
    title: String,
    id_publisher: i32,
}

#[derive(Deserialize)]
struct StockFields {
    id_book: i32,
    id_shop: i32,
    #[serde(default)]
    count: i32,
}

#[derive(Deserialize)]
struct SaleFields {
    #[serde(deserialize_with = "price_from_number_or_string")]
    price: f64,
    #[serde(deserialize_with = "timestamp_from_string")]
    date_sale: NaiveDateTime,
    id_stock: i32,
    #[serde(default = "one")]
    count: i32,
}

fn one() -> i32 {
    1
}

fn price_from_number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Number(f64),
        Text(String),
    }

    match Price::deserialize(deserializer)? {
        Price::Number(value) => Ok(value),
        Price::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid price '{text}'"))),
    }
}

/// Accepts RFC 3339 (converted to UTC) or a naive ISO timestamp.
fn timestamp_from_string<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_timestamp(&text)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{text}'")))
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(text, pattern).ok())
}

impl FixtureRecord {
    /// Decodes `fields` according to `model`.
    pub fn into_row(self) -> CoreResult<FixtureRow> {
        let id = self.pk;
        let row = match self.model {
            FixtureModel::Publisher => {
                let f: NamedFields = serde_json::from_value(self.fields)?;
                FixtureRow::Publisher(Publisher { id, name: f.name })
            }
            FixtureModel::Shop => {
                let f: NamedFields = serde_json::from_value(self.fields)?;
                FixtureRow::Shop(Shop { id, name: f.name })
            }
            FixtureModel::Book => {
                let f: BookFields = serde_json::from_value(self.fields)?;
                FixtureRow::Book(Book {
                    id,
                    title: f.title,
                    id_publisher: f.id_publisher,
                })
            }
            FixtureModel::Stock => {
                let f: StockFields = serde_json::from_value(self.fields)?;
                FixtureRow::Stock(Stock {
                    id,
                    id_book: f.id_book,
                    id_shop: f.id_shop,
                    count: f.count,
                })
            }
            FixtureModel::Sale => {
                let f: SaleFields = serde_json::from_value(self.fields)?;
                FixtureRow::Sale(Sale {
                    id,
                    price: f.price,
                    date_sale: f.date_sale,
                    id_stock: f.id_stock,
                    count: f.count,
                })
            }
        };
        Ok(row)
    }
}

/// Parses a whole fixture document, keeping record order.
pub fn parse_fixtures(json: &str) -> CoreResult<Vec<FixtureRow>> {
    let records: Vec<FixtureRecord> = serde_json::from_str(json)?;
    records.into_iter().map(FixtureRecord::into_row).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use chrono::NaiveDate;

    const SAMPLE: &str = r#"[
        {"model": "publisher", "pk": 1, "fields": {"name": "O'Reilly"}},
        {"model": "book", "pk": 1, "fields": {"title": "Programming Python", "id_publisher": 1}},
        {"model": "shop", "pk": 1, "fields": {"name": "Labirint"}},
        {"model": "stock", "pk": 1, "fields": {"id_shop": 1, "id_book": 1, "count": 34}},
        {"model": "sale", "pk": 1, "fields": {"price": "50.05", "date_sale": "2018-10-25T09:45:24.552Z", "count": 16, "id_stock": 1}}
    ]"#;

    #[test]
    fn test_parse_sample_document() {
        let rows = parse_fixtures(SAMPLE).unwrap();

        assert_eq!(rows.len(), 5);
        assert_eq!(
            rows[0],
            FixtureRow::Publisher(Publisher {
                id: 1,
                name: "O'Reilly".to_string()
            })
        );
        assert_eq!(rows[3].model(), FixtureModel::Stock);

        match &rows[4] {
            FixtureRow::Sale(sale) => {
                assert!((sale.price - 50.05).abs() < 1e-9);
                assert_eq!(sale.count, 16);
                assert_eq!(
                    sale.date_sale.date(),
                    NaiveDate::from_ymd_opt(2018, 10, 25).unwrap()
                );
            }
            other => panic!("expected sale, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_for_count() {
        let rows = parse_fixtures(
            r#"[
                {"model": "stock", "pk": 2, "fields": {"id_shop": 1, "id_book": 1}},
                {"model": "sale", "pk": 2, "fields": {"price": 9.5, "date_sale": "2020-01-01 10:00:00", "id_stock": 2}}
            ]"#,
        )
        .unwrap();

        assert!(matches!(&rows[0], FixtureRow::Stock(s) if s.count == 0));
        assert!(matches!(&rows[1], FixtureRow::Sale(s) if s.count == 1 && s.price == 9.5));
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        let err = parse_fixtures(r#"[{"model": "author", "pk": 1, "fields": {}}]"#).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFixture(_)));
    }

    #[test]
    fn test_bad_price_is_rejected() {
        let err = parse_fixtures(
            r#"[{"model": "sale", "pk": 1, "fields": {"price": "cheap", "date_sale": "2020-01-01T00:00:00", "id_stock": 1}}]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid price"));
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert!(parse_timestamp("2018-10-25T09:45:24.552Z").is_some());
        assert!(parse_timestamp("2018-10-25T12:45:24+03:00").is_some());
        assert!(parse_timestamp("2018-10-25T09:45:24").is_some());
        assert!(parse_timestamp("25.10.2018").is_none());
    }

    #[test]
    fn test_models_are_ordered_parents_first() {
        let tables: Vec<&str> = FixtureModel::ALL.iter().map(|m| m.table()).collect();
        assert_eq!(tables, vec!["publisher", "shop", "book", "stock", "sale"]);
    }
}
