//! Domain models for LODGR.
//!
//! These are the core types shared across all crates.

pub mod account;
pub mod caretaker;
pub mod lease;
pub mod tenant;
pub mod unit;
