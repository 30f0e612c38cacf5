//! LODGR Database: SurrealDB connection management, schema migrations
//! and implementations of the `lodgr-core` traits.
//!
//! This crate provides:
//! - Connection management ([`DbConfig`], [`DbManager`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Repository implementations for units, tenants, leases, caretakers
//! - The transactional occupancy store ([`SurrealOccupancyStore`])
//! - An account-table identity provider ([`SurrealIdentityProvider`])
//! - Error types ([`DbError`])

mod connection;
mod error;
mod identity;
mod occupancy;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use identity::SurrealIdentityProvider;
pub use occupancy::SurrealOccupancyStore;
pub use schema::run_migrations;
