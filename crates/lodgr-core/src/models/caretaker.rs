//! Caretaker domain model: staff who run onboarding for a set of
//! buildings. Carries no occupancy invariants of its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caretaker {
    pub id: Uuid,
    pub user_id: Uuid,
    pub phone: String,
    pub assigned_area: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCaretaker {
    pub user_id: Uuid,
    pub phone: String,
    pub assigned_area: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCaretaker {
    pub phone: Option<String>,
    pub assigned_area: Option<String>,
}
