//! Error types for the LODGR system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LodgrError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unit {unit_id} is not available for onboarding")]
    UnitUnavailable { unit_id: String },

    #[error("Unit {unit_id} is already occupied")]
    UnitOccupied { unit_id: String },

    #[error("Tenant {tenant_id} already has an active lease")]
    TenantHasActiveLease { tenant_id: String },

    #[error("Lease {lease_id} is already terminated")]
    AlreadyTerminated { lease_id: String },

    #[error("An account with email {email} already exists")]
    DuplicateIdentity { email: String },

    #[error("Unit {unit_number} already exists in building {building}")]
    DuplicateUnit {
        building: String,
        unit_number: String,
    },

    #[error("Operation aborted after concurrent modification")]
    ConcurrentModification,

    #[error("Operation timed out")]
    Timeout,

    #[error("Identity provider error: {0}")]
    Identity(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type LodgrResult<T> = Result<T, LodgrError>;

/// Coarse classification of an error, matching the classes the
/// transport layer maps to status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input, rejected before any transaction starts.
    Validation,
    /// A referenced entity does not exist.
    NotFound,
    /// A business invariant would be violated; no state change occurred.
    Conflict,
    /// Transient failure, safe for the caller to retry.
    Retryable,
    /// Identity provider or record store failure unrelated to business rules.
    Upstream,
}

impl LodgrError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LodgrError::Validation { .. } => ErrorKind::Validation,
            LodgrError::NotFound { .. } => ErrorKind::NotFound,
            LodgrError::UnitUnavailable { .. }
            | LodgrError::UnitOccupied { .. }
            | LodgrError::TenantHasActiveLease { .. }
            | LodgrError::AlreadyTerminated { .. }
            | LodgrError::DuplicateIdentity { .. }
            | LodgrError::DuplicateUnit { .. } => ErrorKind::Conflict,
            LodgrError::ConcurrentModification | LodgrError::Timeout => ErrorKind::Retryable,
            LodgrError::Identity(_) | LodgrError::Database(_) | LodgrError::Internal(_) => {
                ErrorKind::Upstream
            }
        }
    }

    /// True when the caller may safely retry the whole operation:
    /// no partial state was left behind.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Retryable
    }
}
