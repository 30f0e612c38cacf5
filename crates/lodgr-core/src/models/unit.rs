//! Unit domain model: a physical rentable space.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Occupancy status of a unit.
///
/// Mutated only by the occupancy ledger: a unit is `Occupied` exactly
/// when an active lease references it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UnitStatus {
    Available,
    Occupied,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: Uuid,
    pub building: String,
    /// Unique within a building.
    pub unit_number: String,
    pub description: String,
    pub rent_amount: f64,
    pub status: UnitStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUnit {
    pub building: String,
    pub unit_number: String,
    pub description: String,
    pub rent_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUnit {
    pub description: Option<String>,
    pub rent_amount: Option<f64>,
}
