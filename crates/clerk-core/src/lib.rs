//! # clerk-core: Pure Domain Logic for Clerk
//!
//! This crate holds everything about the client directory and the bookstore
//! sales report that can be decided without touching a database.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Clerk Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Front-end (GUI / sales-report CLI)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ clerk-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   query   │  │  report   │  │ fixtures  │  │   │
//! │  │   │  Client   │  │  UPDATE   │  │ Publisher │  │  JSON     │  │   │
//! │  │   │  Sale ... │  │  SEARCH   │  │  render   │  │  records  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    clerk-db (Database Layer)                    │   │
//! │  │         PostgreSQL connection, transactions, repositories       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities of both schemas and the row shapes read back
//! - [`query`] - Partial-update and multi-predicate search assembly
//! - [`report`] - Publisher lookup and sales report rendering
//! - [`fixtures`] - Seed records for the bookstore schema
//! - [`validation`] - Input checks mirroring the column sizes
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use clerk_core::query::{build_client_search, ClientFilter};
//!
//! let filter = ClientFilter::new().last_name("Doe");
//! let statement = build_client_search(&filter);
//!
//! assert!(statement.sql.ends_with("WHERE c.last_name = $1 ORDER BY c.id, p.id"));
//! assert_eq!(statement.params.len(), 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod fixtures;
pub mod query;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use query::{ClientChanges, ClientFilter, SqlParam, Statement};
pub use report::{PublisherRef, SalesReport, NO_SALES_MESSAGE};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Column size of `clients.first_name`, `clients.last_name` and `clients.email`.
pub const MAX_CLIENT_FIELD_LEN: usize = 100;

/// Column size of `phones.phone_number`.
pub const MAX_PHONE_NUMBER_LEN: usize = 20;
