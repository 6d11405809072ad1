//! # clerk-db: Database Layer for Clerk
//!
//! This crate provides PostgreSQL access for the client directory and the
//! bookstore sales report, using sqlx on tokio.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Clerk Data Flow                                │
//! │                                                                         │
//! │  Caller (GUI, sales-report CLI)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     clerk-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐   ┌──────────────────┐   ┌─────────────┐  │   │
//! │  │   │ Connection     │   │   Repositories   │   │  Bootstrap  │  │   │
//! │  │   │ Manager        │◄──│  ClientRepo      │   │  DDL        │  │   │
//! │  │   │ (1 connection) │   │  SalesReportRepo │   │             │  │   │
//! │  │   │                │   │  FixtureRepo     │   │             │  │   │
//! │  │   └────────────────┘   └──────────────────┘   └─────────────┘  │   │
//! │  │          ▲                      │ SQL from clerk-core           │   │
//! │  │          │ DbConfig (DB_* env)  │                               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PostgreSQL                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Connection settings from the environment
//! - [`connection`] - Lazy single-connection lifecycle
//! - [`error`] - Database error kinds
//! - [`repository`] - Client CRUD/search, sales report, fixture import
//! - [`bootstrap`] - Idempotent table creation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use clerk_db::{ConnectionManager, DbConfig};
//! use clerk_core::{ClientChanges, ClientFilter};
//!
//! let mut db = ConnectionManager::new(DbConfig::from_env()?);
//!
//! let id = db.clients().add_client("Jane", "Doe", "jane@example.com").await?;
//! db.clients().update_client(id, &ClientChanges::new().last_name("Roe")).await?;
//! let rows = db.clients().find_clients(&ClientFilter::new().last_name("Roe")).await?;
//!
//! println!("{}", db.reports().sales_by_publisher_input("Penguin").await?);
//! db.close().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bootstrap;
pub mod config;
pub mod connection;
pub mod error;
pub mod repository;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, DbConfig};
pub use connection::ConnectionManager;
pub use error::{ConstraintKind, DbError, DbResult};

// Repository re-exports for convenience
pub use repository::{ClientRepository, FixtureRepository, SalesReportRepository, UpdateOutcome};
