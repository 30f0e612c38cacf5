//! LODGR Core: domain models, repository traits and the error taxonomy
//! shared across all crates.
//!
//! This crate performs no I/O. Persistence lives in `lodgr-db`; the
//! occupancy ledger service lives in `lodgr-ledger`.

pub mod error;
pub mod identity;
pub mod models;
pub mod repository;
