//! Lease domain model: a time-bounded occupancy agreement binding one
//! tenant to one unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lease lifecycle state. `Terminated` is terminal: a lease is never
/// reactivated and never deleted (append-only history).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LeaseStatus {
    Active,
    Terminated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lease {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub unit_id: Uuid,
    pub start_date: DateTime<Utc>,
    /// Set when the lease is terminated.
    pub end_date: Option<DateTime<Utc>>,
    pub deposit_amount: f64,
    pub deposit_paid: bool,
    pub status: LeaseStatus,
    pub created_at: DateTime<Utc>,
}

/// Terms for a new lease. The lease starts `Active` with the deposit
/// marked paid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseTerms {
    pub start_date: DateTime<Utc>,
    pub deposit_amount: f64,
}
