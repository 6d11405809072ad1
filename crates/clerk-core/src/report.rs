//! # Sales Report
//!
//! Publisher lookup and text rendering for the sales-by-publisher report.
//!
//! ## Report Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sales by Publisher                               │
//! │                                                                         │
//! │  "3" / "Penguin"                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PublisherRef::parse  →  Id(3) | Name("Penguin")                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  sales_report_statement  (book ⋈ stock ⋈ sale ⋈ shop ⋈ publisher)     │
//! │       │                                                                 │
//! │       ▼  rows (clerk-db)                                               │
//! │  SalesReport::from_lines  →  NoSales | Sales(lines, newest first)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  render()                                                              │
//! │  "LongerTitle | B     | 120.00 | 02-02-2023"                           │
//! │  "Short       | ShopA |   9.50 | 01-01-2023"                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The rendered text is what front-ends display verbatim, so the column
//! layout must not drift: title and shop left-justified to the widest value
//! of the current result, price `{:6.2}`, date `DD-MM-YYYY`, columns joined
//! by `" | "`.

use std::fmt;
use std::str::FromStr;

use crate::query::{SqlParam, Statement};
use crate::types::SaleLine;

/// Text shown instead of a table when the publisher has no sales.
pub const NO_SALES_MESSAGE: &str = "No sales found for the given publisher.";

/// Separator between report columns.
pub const COLUMN_SEPARATOR: &str = " | ";

/// `strftime` pattern of the date column.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

// =============================================================================
// Publisher Lookup
// =============================================================================

/// How the report identifies its publisher.
///
/// ## Precedence
/// Input that parses as an `i32` is always an id. A publisher literally
/// named `"42"` can therefore not be found by name; it is looked up as id 42.
/// All-digit input outside the `i32` range (e.g. `"99999999999"`) cannot be
/// a key of the `SERIAL` id column and is looked up as a name instead; both
/// lookups find nothing for such input unless a publisher carries that name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublisherRef {
    Id(i32),
    Name(String),
}

impl PublisherRef {
    /// Interprets raw user input. Surrounding whitespace is ignored.
    ///
    /// ## Example
    /// ```rust
    /// use clerk_core::PublisherRef;
    ///
    /// assert_eq!(PublisherRef::parse("3"), PublisherRef::Id(3));
    /// assert_eq!(PublisherRef::parse("Penguin"), PublisherRef::Name("Penguin".into()));
    /// ```
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match input.parse::<i32>() {
            Ok(id) => PublisherRef::Id(id),
            Err(_) => PublisherRef::Name(input.to_string()),
        }
    }
}

impl FromStr for PublisherRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PublisherRef::parse(s))
    }
}

impl fmt::Display for PublisherRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublisherRef::Id(id) => write!(f, "publisher #{id}"),
            PublisherRef::Name(name) => write!(f, "publisher '{name}'"),
        }
    }
}

const SALES_REPORT_BASE: &str = "SELECT b.title, sh.name AS shop, s.price, s.date_sale \
     FROM book b \
     JOIN stock st ON st.id_book = b.id \
     JOIN sale s ON s.id_stock = st.id \
     JOIN shop sh ON sh.id = st.id_shop \
     JOIN publisher p ON p.id = b.id_publisher";

/// Builds the report query for one publisher.
///
/// Both lookup kinds share the same join and ordering; only the predicate
/// differs.
pub fn sales_report_statement(publisher: &PublisherRef) -> Statement {
    let (predicate, param) = match publisher {
        PublisherRef::Id(id) => ("p.id = $1", SqlParam::Int(*id)),
        PublisherRef::Name(name) => ("p.name = $1", SqlParam::Text(name.clone())),
    };

    Statement {
        sql: format!("{SALES_REPORT_BASE} WHERE {predicate} ORDER BY s.date_sale DESC"),
        params: vec![param],
    }
}

// =============================================================================
// Report
// =============================================================================

/// Outcome of a sales report.
///
/// An empty result is a normal answer, not a failure. `Sales(vec![])` is
/// treated exactly like `NoSales`.
#[derive(Debug, Clone, PartialEq)]
pub enum SalesReport {
    NoSales,
    Sales(Vec<SaleLine>),
}

impl SalesReport {
    /// Classifies query rows, newest sale first.
    pub fn from_lines(mut lines: Vec<SaleLine>) -> Self {
        if lines.is_empty() {
            return SalesReport::NoSales;
        }
        lines.sort_by(|a, b| b.date_sale.cmp(&a.date_sale));
        SalesReport::Sales(lines)
    }

    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    /// The report lines; empty for [`SalesReport::NoSales`].
    pub fn lines(&self) -> &[SaleLine] {
        match self {
            SalesReport::NoSales => &[],
            SalesReport::Sales(lines) => lines,
        }
    }

    /// Renders one formatted string per sale, newest first.
    ///
    /// Returns an empty vector when there are no sales.
    pub fn render_lines(&self) -> Vec<String> {
        let lines = match self {
            SalesReport::NoSales => return Vec::new(),
            SalesReport::Sales(lines) => lines,
        };

        let title_width = lines.iter().map(|l| l.title.chars().count()).max().unwrap_or(0);
        let shop_width = lines.iter().map(|l| l.shop.chars().count()).max().unwrap_or(0);

        let mut ordered: Vec<&SaleLine> = lines.iter().collect();
        ordered.sort_by(|a, b| b.date_sale.cmp(&a.date_sale));

        ordered
            .into_iter()
            .map(|line| format_line(line, title_width, shop_width))
            .collect()
    }

    /// Renders the whole report, or [`NO_SALES_MESSAGE`] when empty.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return NO_SALES_MESSAGE.to_string();
        }
        self.render_lines().join("\n")
    }
}

impl fmt::Display for SalesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn format_line(line: &SaleLine, title_width: usize, shop_width: usize) -> String {
    format!(
        "{:<title_width$}{sep}{:<shop_width$}{sep}{:6.2}{sep}{}",
        line.title,
        line.shop,
        line.price,
        line.date_sale.format(DATE_FORMAT),
        sep = COLUMN_SEPARATOR,
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_numeric_input_as_id() {
        assert_eq!(PublisherRef::parse("3"), PublisherRef::Id(3));
        assert_eq!(PublisherRef::parse(" 17 "), PublisherRef::Id(17));
    }

    #[test]
    fn test_parse_text_input_as_name() {
        assert_eq!(
            PublisherRef::parse("Penguin"),
            PublisherRef::Name("Penguin".to_string())
        );
        assert_eq!(
            PublisherRef::parse("  O'Reilly  "),
            PublisherRef::Name("O'Reilly".to_string())
        );
        assert_eq!(
            PublisherRef::parse("3 Musketeers"),
            PublisherRef::Name("3 Musketeers".to_string())
        );
    }

    #[test]
    fn test_parse_out_of_range_digits_as_name() {
        assert_eq!(
            PublisherRef::parse("99999999999"),
            PublisherRef::Name("99999999999".to_string())
        );
        assert_eq!(PublisherRef::parse("2147483647"), PublisherRef::Id(i32::MAX));
    }

    #[test]
    fn test_id_and_name_share_join_and_order() {
        let by_id = sales_report_statement(&PublisherRef::Id(3));
        let by_name = sales_report_statement(&PublisherRef::parse("Penguin"));

        assert!(by_id.sql.ends_with("WHERE p.id = $1 ORDER BY s.date_sale DESC"));
        assert!(by_name.sql.ends_with("WHERE p.name = $1 ORDER BY s.date_sale DESC"));
        assert_eq!(
            by_id.sql.replace("p.id = $1", ""),
            by_name.sql.replace("p.name = $1", "")
        );

        assert_eq!(by_id.params, vec![SqlParam::Int(3)]);
        assert_eq!(by_name.params, vec![SqlParam::Text("Penguin".to_string())]);
    }

    #[test]
    fn test_render_aligns_columns_and_orders_newest_first() {
        let report = SalesReport::from_lines(vec![
            SaleLine::new("Short", "ShopA", 9.5, date(2023, 1, 1)),
            SaleLine::new("LongerTitle", "B", 120.0, date(2023, 2, 2)),
        ]);

        assert_eq!(
            report.render_lines(),
            vec![
                "LongerTitle | B     | 120.00 | 02-02-2023".to_string(),
                "Short       | ShopA |   9.50 | 01-01-2023".to_string(),
            ]
        );
        assert_eq!(
            report.render(),
            "LongerTitle | B     | 120.00 | 02-02-2023\nShort       | ShopA |   9.50 | 01-01-2023"
        );
    }

    #[test]
    fn test_render_orders_even_when_built_directly() {
        let report = SalesReport::Sales(vec![
            SaleLine::new("A", "S", 1.0, date(2020, 5, 1)),
            SaleLine::new("B", "S", 2.0, date(2021, 5, 1)),
        ]);

        let rendered = report.render_lines();
        assert!(rendered[0].starts_with("B"));
        assert!(rendered[1].starts_with("A"));
    }

    #[test]
    fn test_width_counts_characters() {
        let report = SalesReport::from_lines(vec![
            SaleLine::new("Война и мир", "Дом книги", 5.0, date(2023, 3, 3)),
            SaleLine::new("Idiot", "X", 5.0, date(2023, 3, 2)),
        ]);

        let rendered = report.render_lines();
        assert_eq!(rendered[1], "Idiot       | X         |   5.00 | 02-03-2023");
    }

    #[test]
    fn test_empty_report() {
        let report = SalesReport::from_lines(Vec::new());

        assert!(report.is_empty());
        assert!(report.lines().is_empty());
        assert!(report.render_lines().is_empty());
        assert_eq!(report.render(), NO_SALES_MESSAGE);
        assert_eq!(report.to_string(), NO_SALES_MESSAGE);
    }

    #[test]
    fn test_sales_without_lines_reads_as_empty() {
        let report = SalesReport::Sales(Vec::new());

        assert!(report.is_empty());
        assert_eq!(report.render(), NO_SALES_MESSAGE);
        assert_eq!(report.to_string(), NO_SALES_MESSAGE);
    }
}
