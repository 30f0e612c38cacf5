//! Database-specific error types and conversions.

use lodgr_core::error::LodgrError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Commit rejected by concurrent write: {0}")]
    Conflict(String),
}

impl From<DbError> for LodgrError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => LodgrError::NotFound { entity, id },
            DbError::Conflict(_) => LodgrError::ConcurrentModification,
            other => LodgrError::Database(other.to_string()),
        }
    }
}

/// Sentinel tokens thrown (via `THROW`) inside occupancy transactions.
/// Each maps to a typed precondition failure.
pub(crate) mod sentinel {
    pub const UNIT_NOT_FOUND: &str = "unit_not_found";
    pub const TENANT_NOT_FOUND: &str = "tenant_not_found";
    pub const LEASE_NOT_FOUND: &str = "lease_not_found";
    pub const UNIT_UNAVAILABLE: &str = "unit_unavailable";
    pub const UNIT_OCCUPIED: &str = "unit_occupied";
    pub const TENANT_HAS_ACTIVE_LEASE: &str = "tenant_has_active_lease";
    pub const LEASE_ALREADY_TERMINATED: &str = "lease_already_terminated";
}

/// Classify an error raised while executing an occupancy transaction.
///
/// `THROW`n sentinels become their typed precondition error; SurrealDB
/// commit conflicts become `ConcurrentModification`; anything else is an
/// opaque database failure.
pub(crate) fn classify_tx_error(
    msg: &str,
    unit_id: &str,
    tenant_id: &str,
    lease_id: &str,
) -> LodgrError {
    if msg.contains(sentinel::UNIT_NOT_FOUND) {
        return LodgrError::NotFound {
            entity: "unit".into(),
            id: unit_id.into(),
        };
    }
    if msg.contains(sentinel::TENANT_HAS_ACTIVE_LEASE) {
        return LodgrError::TenantHasActiveLease {
            tenant_id: tenant_id.into(),
        };
    }
    if msg.contains(sentinel::TENANT_NOT_FOUND) {
        return LodgrError::NotFound {
            entity: "tenant".into(),
            id: tenant_id.into(),
        };
    }
    if msg.contains(sentinel::LEASE_ALREADY_TERMINATED) {
        return LodgrError::AlreadyTerminated {
            lease_id: lease_id.into(),
        };
    }
    if msg.contains(sentinel::LEASE_NOT_FOUND) {
        return LodgrError::NotFound {
            entity: "lease".into(),
            id: lease_id.into(),
        };
    }
    if msg.contains(sentinel::UNIT_UNAVAILABLE) {
        return LodgrError::UnitUnavailable {
            unit_id: unit_id.into(),
        };
    }
    if msg.contains(sentinel::UNIT_OCCUPIED) {
        return LodgrError::UnitOccupied {
            unit_id: unit_id.into(),
        };
    }

    let lowered = msg.to_lowercase();
    if lowered.contains("conflict") || lowered.contains("failed to commit") {
        return LodgrError::ConcurrentModification;
    }

    LodgrError::Database(msg.to_string())
}
