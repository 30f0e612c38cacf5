//! Tenant domain model.
//!
//! A tenant maps 1:1 to an identity-provider account; the relationship
//! to units is mediated exclusively by leases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    /// Owning account in the identity provider (1:1).
    pub user_id: Uuid,
    pub phone: String,
    pub national_id: String,
    pub emergency_contact: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile attributes captured at onboarding time. The account itself
/// is created by the identity provider, not the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantProfile {
    pub phone: String,
    pub national_id: String,
    pub emergency_contact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTenant {
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub emergency_contact: Option<String>,
}
