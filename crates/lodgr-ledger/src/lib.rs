//! LODGR Ledger: the occupancy ledger service.
//!
//! All mutations affecting the pairing between tenants and units flow
//! through [`service::OccupancyLedger`], which enforces the occupancy
//! invariants on top of any [`lodgr_core::repository::OccupancyStore`]
//! and [`lodgr_core::identity::IdentityProvider`] implementation.

pub mod config;
pub mod error;
pub mod service;
pub mod snapshot;
