//! SurrealDB implementation of [`OccupancyStore`].
//!
//! Every mutation is a single `BEGIN TRANSACTION … COMMIT` query:
//! precondition reads and writes execute as one atomic unit, so two
//! concurrent check-and-write operations can never both observe a free
//! unit and both commit. Precondition failures abort the transaction
//! via `THROW` with a sentinel token; SurrealDB rejects conflicting
//! concurrent commits, which surface as `ConcurrentModification`.

use lodgr_core::error::LodgrResult;
use lodgr_core::models::lease::{Lease, LeaseTerms};
use lodgr_core::models::tenant::{Tenant, TenantProfile};
use lodgr_core::repository::{BuildingCounts, OccupancyStore, TenantRelease};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, classify_tx_error};
use crate::repository::lease::{LeaseRow, LeaseRowWithId};
use crate::repository::tenant::TenantRow;

const BEGIN_LEASE_TX: &str = "\
BEGIN TRANSACTION;
LET $unit = (SELECT * FROM type::record('unit', $unit_id));
IF array::len($unit) == 0 { THROW 'unit_not_found' };
LET $tenant = (SELECT * FROM type::record('tenant', $tenant_id));
IF array::len($tenant) == 0 { THROW 'tenant_not_found' };
LET $unit_active = (SELECT * FROM lease \
    WHERE unit_id = $unit_id AND status = 'Active');
IF array::len($unit_active) > 0 { THROW 'unit_occupied' };
LET $tenant_active = (SELECT * FROM lease \
    WHERE tenant_id = $tenant_id AND status = 'Active');
IF array::len($tenant_active) > 0 { THROW 'tenant_has_active_lease' };
CREATE type::record('lease', $lease_id) SET \
    tenant_id = $tenant_id, unit_id = $unit_id, \
    start_date = $start_date, end_date = NONE, \
    deposit_amount = $deposit_amount, deposit_paid = true, \
    status = 'Active';
UPDATE type::record('unit', $unit_id) SET \
    status = 'Occupied', updated_at = time::now();
COMMIT TRANSACTION;";

const END_LEASE_TX: &str = "\
BEGIN TRANSACTION;
LET $lease = (SELECT * FROM type::record('lease', $lease_id));
IF array::len($lease) == 0 { THROW 'lease_not_found' };
IF $lease[0].status == 'Terminated' { THROW 'lease_already_terminated' };
UPDATE type::record('lease', $lease_id) SET \
    status = 'Terminated', end_date = time::now();
UPDATE type::record('unit', $lease[0].unit_id) SET \
    status = 'Available', updated_at = time::now();
COMMIT TRANSACTION;";

const ONBOARD_TX: &str = "\
BEGIN TRANSACTION;
LET $unit = (SELECT * FROM type::record('unit', $unit_id));
IF array::len($unit) == 0 { THROW 'unit_not_found' };
IF $unit[0].status != 'Available' { THROW 'unit_unavailable' };
CREATE type::record('tenant', $tenant_id) SET \
    user_id = $user_id, phone = $phone, \
    national_id = $national_id, emergency_contact = $emergency_contact;
CREATE type::record('lease', $lease_id) SET \
    tenant_id = $tenant_id, unit_id = $unit_id, \
    start_date = $start_date, end_date = NONE, \
    deposit_amount = $deposit_amount, deposit_paid = true, \
    status = 'Active';
UPDATE type::record('unit', $unit_id) SET \
    status = 'Occupied', updated_at = time::now();
COMMIT TRANSACTION;";

const RELEASE_TENANT_TX: &str = "\
BEGIN TRANSACTION;
LET $tenant = (SELECT * FROM type::record('tenant', $tenant_id));
IF array::len($tenant) == 0 { THROW 'tenant_not_found' };
SELECT * FROM type::record('tenant', $tenant_id);
LET $active = (SELECT * FROM lease \
    WHERE tenant_id = $tenant_id AND status = 'Active');
UPDATE lease SET status = 'Terminated', end_date = time::now() \
    WHERE tenant_id = $tenant_id AND status = 'Active' \
    RETURN meta::id(id) AS record_id, *;
UPDATE unit SET status = 'Available', updated_at = time::now() \
    WHERE meta::id(id) IN $active.unit_id;
DELETE type::record('tenant', $tenant_id);
COMMIT TRANSACTION;";

const DELETE_UNIT_TX: &str = "\
BEGIN TRANSACTION;
LET $unit = (SELECT * FROM type::record('unit', $unit_id));
IF array::len($unit) == 0 { THROW 'unit_not_found' };
IF $unit[0].status != 'Available' { THROW 'unit_occupied' };
DELETE type::record('unit', $unit_id);
COMMIT TRANSACTION;";

/// Per-building aggregate row. `count(expr)` counts truthy values.
#[derive(Debug, SurrealValue)]
struct BuildingCountRow {
    building: String,
    total: u64,
    occupied: u64,
}

/// SurrealDB implementation of the occupancy store.
#[derive(Clone)]
pub struct SurrealOccupancyStore<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOccupancyStore<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OccupancyStore for SurrealOccupancyStore<C> {
    async fn begin_lease(
        &self,
        tenant_id: Uuid,
        unit_id: Uuid,
        terms: LeaseTerms,
    ) -> LodgrResult<Lease> {
        let lease_id = Uuid::new_v4();
        let tenant_str = tenant_id.to_string();
        let unit_str = unit_id.to_string();
        let lease_str = lease_id.to_string();

        let result = self
            .db
            .query(BEGIN_LEASE_TX)
            .bind(("tenant_id", tenant_str.clone()))
            .bind(("unit_id", unit_str.clone()))
            .bind(("lease_id", lease_str.clone()))
            .bind(("start_date", terms.start_date))
            .bind(("deposit_amount", terms.deposit_amount))
            .await
            .map_err(|e| classify_tx_error(&e.to_string(), &unit_str, &tenant_str, &lease_str))?;

        let mut result = result
            .check()
            .map_err(|e| classify_tx_error(&e.to_string(), &unit_str, &tenant_str, &lease_str))?;

        // BEGIN occupies slot 0; slot 9 is the lease CREATE.
        let rows: Vec<LeaseRow> = result.take(9).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "lease".into(),
            id: lease_str,
        })?;

        Ok(row.into_lease(lease_id)?)
    }

    async fn end_lease(&self, lease_id: Uuid) -> LodgrResult<Lease> {
        let lease_str = lease_id.to_string();

        let result = self
            .db
            .query(END_LEASE_TX)
            .bind(("lease_id", lease_str.clone()))
            .await
            .map_err(|e| classify_tx_error(&e.to_string(), "", "", &lease_str))?;

        let mut result = result
            .check()
            .map_err(|e| classify_tx_error(&e.to_string(), "", "", &lease_str))?;

        // BEGIN occupies slot 0; slot 4 is the lease UPDATE.
        let rows: Vec<LeaseRow> = result.take(4).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "lease".into(),
            id: lease_str,
        })?;

        Ok(row.into_lease(lease_id)?)
    }

    async fn onboard(
        &self,
        user_id: Uuid,
        profile: TenantProfile,
        unit_id: Uuid,
        terms: LeaseTerms,
    ) -> LodgrResult<(Tenant, Lease)> {
        let tenant_id = Uuid::new_v4();
        let lease_id = Uuid::new_v4();
        let tenant_str = tenant_id.to_string();
        let unit_str = unit_id.to_string();
        let lease_str = lease_id.to_string();

        let result = self
            .db
            .query(ONBOARD_TX)
            .bind(("unit_id", unit_str.clone()))
            .bind(("tenant_id", tenant_str.clone()))
            .bind(("lease_id", lease_str.clone()))
            .bind(("user_id", user_id.to_string()))
            .bind(("phone", profile.phone))
            .bind(("national_id", profile.national_id))
            .bind(("emergency_contact", profile.emergency_contact))
            .bind(("start_date", terms.start_date))
            .bind(("deposit_amount", terms.deposit_amount))
            .await
            .map_err(|e| classify_tx_error(&e.to_string(), &unit_str, &tenant_str, &lease_str))?;

        let mut result = result
            .check()
            .map_err(|e| classify_tx_error(&e.to_string(), &unit_str, &tenant_str, &lease_str))?;

        // BEGIN occupies slot 0; slot 4 is the tenant CREATE, slot 5 the
        // lease CREATE.
        let tenant_rows: Vec<TenantRow> = result.take(4).map_err(DbError::from)?;
        let lease_rows: Vec<LeaseRow> = result.take(5).map_err(DbError::from)?;

        let tenant_row = tenant_rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "tenant".into(),
                id: tenant_str,
            })?;
        let lease_row = lease_rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "lease".into(),
                id: lease_str,
            })?;

        Ok((
            tenant_row.into_tenant(tenant_id)?,
            lease_row.into_lease(lease_id)?,
        ))
    }

    async fn release_tenant(&self, tenant_id: Uuid) -> LodgrResult<TenantRelease> {
        let tenant_str = tenant_id.to_string();

        let result = self
            .db
            .query(RELEASE_TENANT_TX)
            .bind(("tenant_id", tenant_str.clone()))
            .await
            .map_err(|e| classify_tx_error(&e.to_string(), "", &tenant_str, ""))?;

        let mut result = result
            .check()
            .map_err(|e| classify_tx_error(&e.to_string(), "", &tenant_str, ""))?;

        // BEGIN occupies slot 0; slot 3 re-reads the tenant, slot 5 is the
        // lease UPDATE.
        let tenant_rows: Vec<TenantRow> = result.take(3).map_err(DbError::from)?;
        let lease_rows: Vec<LeaseRowWithId> = result.take(5).map_err(DbError::from)?;

        let tenant_row = tenant_rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "tenant".into(),
                id: tenant_str,
            })?;
        let tenant = tenant_row.into_tenant(tenant_id)?;

        let terminated = lease_rows
            .into_iter()
            .map(|r| r.try_into_lease())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TenantRelease {
            user_id: tenant.user_id,
            terminated,
        })
    }

    async fn delete_unit(&self, unit_id: Uuid) -> LodgrResult<()> {
        let unit_str = unit_id.to_string();

        let result = self
            .db
            .query(DELETE_UNIT_TX)
            .bind(("unit_id", unit_str.clone()))
            .await
            .map_err(|e| classify_tx_error(&e.to_string(), &unit_str, "", ""))?;

        result
            .check()
            .map_err(|e| classify_tx_error(&e.to_string(), &unit_str, "", ""))?;

        Ok(())
    }

    async fn building_counts(&self) -> LodgrResult<Vec<BuildingCounts>> {
        let mut result = self
            .db
            .query(
                "SELECT building, count() AS total, \
                 count(status == 'Occupied') AS occupied \
                 FROM unit GROUP BY building",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BuildingCountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|r| BuildingCounts {
                building: r.building,
                total: r.total,
                occupied: r.occupied,
            })
            .collect())
    }
}
