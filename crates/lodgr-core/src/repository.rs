//! Repository and record-store trait definitions for data access
//! abstraction.
//!
//! All operations are async. Plain repositories cover CRUD reads and
//! writes with no cross-entity invariants; every mutation that touches
//! the tenant/unit/lease pairing goes through [`OccupancyStore`], whose
//! methods are single atomic transactions.

use uuid::Uuid;

use crate::error::LodgrResult;
use crate::models::{
    caretaker::{Caretaker, CreateCaretaker, UpdateCaretaker},
    lease::{Lease, LeaseTerms},
    tenant::{Tenant, TenantProfile, UpdateTenant},
    unit::{CreateUnit, Unit, UpdateUnit},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Plain repositories
// ---------------------------------------------------------------------------

pub trait UnitRepository: Send + Sync {
    /// Create a unit. Fails with `DuplicateUnit` when the unit number is
    /// already taken within the building.
    fn create(&self, input: CreateUnit) -> impl Future<Output = LodgrResult<Unit>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LodgrResult<Unit>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUnit,
    ) -> impl Future<Output = LodgrResult<Unit>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = LodgrResult<PaginatedResult<Unit>>> + Send;
    fn list_available(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = LodgrResult<PaginatedResult<Unit>>> + Send;
}

pub trait TenantRepository: Send + Sync {
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LodgrResult<Tenant>> + Send;
    fn get_by_user(&self, user_id: Uuid) -> impl Future<Output = LodgrResult<Tenant>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateTenant,
    ) -> impl Future<Output = LodgrResult<Tenant>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = LodgrResult<PaginatedResult<Tenant>>> + Send;
}

pub trait LeaseRepository: Send + Sync {
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LodgrResult<Lease>> + Send;
    /// All active leases, newest first.
    fn list_active(&self) -> impl Future<Output = LodgrResult<Vec<Lease>>> + Send;
    /// Full lease history for a tenant, newest first.
    fn list_by_tenant(&self, tenant_id: Uuid) -> impl Future<Output = LodgrResult<Vec<Lease>>> + Send;
    /// Full lease history for a unit, newest first.
    fn list_by_unit(&self, unit_id: Uuid) -> impl Future<Output = LodgrResult<Vec<Lease>>> + Send;
}

pub trait CaretakerRepository: Send + Sync {
    fn create(&self, input: CreateCaretaker) -> impl Future<Output = LodgrResult<Caretaker>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LodgrResult<Caretaker>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateCaretaker,
    ) -> impl Future<Output = LodgrResult<Caretaker>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = LodgrResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = LodgrResult<PaginatedResult<Caretaker>>> + Send;
}

// ---------------------------------------------------------------------------
// Occupancy store: the transactional primitive
// ---------------------------------------------------------------------------

/// Result of releasing a tenant: the owning account (for the identity
/// provider to delete) and the leases that were terminated.
#[derive(Debug, Clone)]
pub struct TenantRelease {
    pub user_id: Uuid,
    pub terminated: Vec<Lease>,
}

/// Per-building occupancy counts as read from the store.
#[derive(Debug, Clone)]
pub struct BuildingCounts {
    pub building: String,
    pub total: u64,
    pub occupied: u64,
}

/// Atomic check-and-write operations over the tenant/unit/lease pairing.
///
/// Each method executes as one transaction: its precondition reads and
/// its writes either all commit or none do. Implementations must detect
/// conflicting concurrent commits and surface them as
/// `ConcurrentModification` so the caller can retry.
pub trait OccupancyStore: Send + Sync {
    /// Create an active lease binding `tenant_id` to `unit_id` and mark
    /// the unit occupied. Fails with `UnitOccupied` or
    /// `TenantHasActiveLease` when either party already holds an active
    /// lease.
    fn begin_lease(
        &self,
        tenant_id: Uuid,
        unit_id: Uuid,
        terms: LeaseTerms,
    ) -> impl Future<Output = LodgrResult<Lease>> + Send;

    /// Terminate a lease, stamp its end date and free the unit. Fails
    /// with `AlreadyTerminated` on a second call.
    fn end_lease(&self, lease_id: Uuid) -> impl Future<Output = LodgrResult<Lease>> + Send;

    /// Create a tenant profile for an existing account together with its
    /// first active lease, marking the unit occupied. Fails with
    /// `UnitUnavailable` when the unit is not free.
    fn onboard(
        &self,
        user_id: Uuid,
        profile: TenantProfile,
        unit_id: Uuid,
        terms: LeaseTerms,
    ) -> impl Future<Output = LodgrResult<(Tenant, Lease)>> + Send;

    /// Delete a tenant profile: every active lease is terminated, its
    /// unit freed, and the lease kept as history.
    fn release_tenant(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = LodgrResult<TenantRelease>> + Send;

    /// Delete a unit. Fails with `UnitOccupied` unless the unit is
    /// available.
    fn delete_unit(&self, unit_id: Uuid) -> impl Future<Output = LodgrResult<()>> + Send;

    /// Per-building totals for the occupancy snapshot. Pure read.
    fn building_counts(&self) -> impl Future<Output = LodgrResult<Vec<BuildingCounts>>> + Send;
}
