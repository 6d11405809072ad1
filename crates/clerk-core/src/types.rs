//! # Domain Types
//!
//! Entities of the two schemas Clerk works against.
//!
//! ## Client Directory
//! ```text
//! ┌─────────────────┐ 1      * ┌─────────────────┐
//! │     Client      │──────────│      Phone      │
//! │  ─────────────  │          │  ─────────────  │
//! │  id (SERIAL)    │          │  id (SERIAL)    │
//! │  first_name     │          │  client_id (FK) │  ON DELETE CASCADE
//! │  last_name      │          │  phone_number   │
//! │  email (UNIQUE) │          └─────────────────┘
//! └─────────────────┘
//! ```
//!
//! ## Bookstore Chain (read-only for the report)
//! ```text
//! Publisher 1──* Book 1──* Stock *──1 Shop
//!                            │
//!                            1
//!                            │
//!                            *
//!                          Sale
//! ```
//!
//! Identifiers are the database's integer surrogate keys (`SERIAL` → `i32`).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// =============================================================================
// Client Directory
// =============================================================================

/// A client of the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Client {
    /// Surrogate key.
    pub id: i32,

    pub first_name: String,

    pub last_name: String,

    /// Unique across all clients.
    pub email: String,
}

/// A phone number owned by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Phone {
    pub id: i32,

    /// Owning client. Never dangling: the row is removed with its client.
    pub client_id: i32,

    pub phone_number: String,
}

/// One row of a client search.
///
/// The search left-joins phones, so a client with three phones yields three
/// rows and a client without phones yields one row with `phone_number: None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ClientRow {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
}

// =============================================================================
// Bookstore Chain
// =============================================================================

/// A publisher. `name` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publisher {
    pub id: i32,
    pub name: String,
}

/// A book title issued by one publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub id_publisher: i32,
}

/// A shop of the chain. `name` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    pub id: i32,
    pub name: String,
}

/// Copies of one book held by one shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: i32,
    pub id_book: i32,
    pub id_shop: i32,
    pub count: i32,
}

/// A sale drawn from one stock row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: i32,
    pub price: f64,
    pub date_sale: NaiveDateTime,
    pub id_stock: i32,
    pub count: i32,
}

/// One line of the sales-by-publisher report: (title, shop, price, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub title: String,
    pub shop: String,
    pub price: f64,
    pub date_sale: NaiveDateTime,
}

impl SaleLine {
    /// Convenience constructor, mostly for callers that build lines by hand.
    pub fn new(
        title: impl Into<String>,
        shop: impl Into<String>,
        price: f64,
        date_sale: NaiveDateTime,
    ) -> Self {
        SaleLine {
            title: title.into(),
            shop: shop.into(),
            price,
            date_sale,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
