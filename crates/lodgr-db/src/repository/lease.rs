//! SurrealDB implementation of [`LeaseRepository`].
//!
//! Read-only: lease rows are written exclusively by the occupancy
//! store's transactions and are never deleted.

use chrono::{DateTime, Utc};
use lodgr_core::error::LodgrResult;
use lodgr_core::models::lease::{Lease, LeaseStatus};
use lodgr_core::repository::LeaseRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

pub(crate) fn parse_lease_status(raw: &str) -> Result<LeaseStatus, DbError> {
    match raw {
        "Active" => Ok(LeaseStatus::Active),
        "Terminated" => Ok(LeaseStatus::Terminated),
        other => Err(DbError::Migration(format!("invalid lease status: {other}"))),
    }
}

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
pub(crate) struct LeaseRow {
    pub tenant_id: String,
    pub unit_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub deposit_amount: f64,
    pub deposit_paid: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl LeaseRow {
    pub(crate) fn into_lease(self, id: Uuid) -> Result<Lease, DbError> {
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Migration(format!("invalid tenant UUID: {e}")))?;
        let unit_id = Uuid::parse_str(&self.unit_id)
            .map_err(|e| DbError::Migration(format!("invalid unit UUID: {e}")))?;
        Ok(Lease {
            id,
            tenant_id,
            unit_id,
            start_date: self.start_date,
            end_date: self.end_date,
            deposit_amount: self.deposit_amount,
            deposit_paid: self.deposit_paid,
            status: parse_lease_status(&self.status)?,
            created_at: self.created_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
pub(crate) struct LeaseRowWithId {
    pub record_id: String,
    pub tenant_id: String,
    pub unit_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub deposit_amount: f64,
    pub deposit_paid: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl LeaseRowWithId {
    pub(crate) fn try_into_lease(self) -> Result<Lease, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Migration(format!("invalid tenant UUID: {e}")))?;
        let unit_id = Uuid::parse_str(&self.unit_id)
            .map_err(|e| DbError::Migration(format!("invalid unit UUID: {e}")))?;
        Ok(Lease {
            id,
            tenant_id,
            unit_id,
            start_date: self.start_date,
            end_date: self.end_date,
            deposit_amount: self.deposit_amount,
            deposit_paid: self.deposit_paid,
            status: parse_lease_status(&self.status)?,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Lease repository.
#[derive(Clone)]
pub struct SurrealLeaseRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealLeaseRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn list_filtered(&self, field: &'static str, value: String) -> LodgrResult<Vec<Lease>> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM lease \
             WHERE {field} = $value ORDER BY created_at DESC"
        );

        let mut result = self
            .db
            .query(query)
            .bind(("value", value))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LeaseRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|r| r.try_into_lease())
            .collect::<Result<Vec<_>, _>>()?)
    }
}

impl<C: Connection> LeaseRepository for SurrealLeaseRepository<C> {
    async fn get_by_id(&self, id: Uuid) -> LodgrResult<Lease> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('lease', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LeaseRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "lease".into(),
            id: id_str,
        })?;

        Ok(row.into_lease(id)?)
    }

    async fn list_active(&self) -> LodgrResult<Vec<Lease>> {
        self.list_filtered("status", "Active".to_string()).await
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> LodgrResult<Vec<Lease>> {
        self.list_filtered("tenant_id", tenant_id.to_string()).await
    }

    async fn list_by_unit(&self, unit_id: Uuid) -> LodgrResult<Vec<Lease>> {
        self.list_filtered("unit_id", unit_id.to_string()).await
    }
}
