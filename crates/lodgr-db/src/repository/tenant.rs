//! SurrealDB implementation of [`TenantRepository`].
//!
//! Tenant profiles are created and deleted only through the occupancy
//! store; this repository covers reads and profile-field updates.

use chrono::{DateTime, Utc};
use lodgr_core::error::LodgrResult;
use lodgr_core::models::tenant::{Tenant, UpdateTenant};
use lodgr_core::repository::{PaginatedResult, Pagination, TenantRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
pub(crate) struct TenantRow {
    pub user_id: String,
    pub phone: String,
    pub national_id: String,
    pub emergency_contact: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantRow {
    pub(crate) fn into_tenant(self, id: Uuid) -> Result<Tenant, DbError> {
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(Tenant {
            id,
            user_id,
            phone: self.phone,
            national_id: self.national_id,
            emergency_contact: self.emergency_contact,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TenantRowWithId {
    record_id: String,
    user_id: String,
    phone: String,
    national_id: String,
    emergency_contact: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRowWithId {
    fn try_into_tenant(self) -> Result<Tenant, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(Tenant {
            id,
            user_id,
            phone: self.phone,
            national_id: self.national_id,
            emergency_contact: self.emergency_contact,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Tenant repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn get_by_id(&self, id: Uuid) -> LodgrResult<Tenant> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('tenant', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id)?)
    }

    async fn get_by_user(&self, user_id: Uuid) -> LodgrResult<Tenant> {
        let user_id_str = user_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tenant \
                 WHERE user_id = $user_id",
            )
            .bind(("user_id", user_id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: format!("user={user_id_str}"),
        })?;

        Ok(row.try_into_tenant()?)
    }

    async fn update(&self, id: Uuid, input: UpdateTenant) -> LodgrResult<Tenant> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.phone.is_some() {
            sets.push("phone = $phone");
        }
        if input.national_id.is_some() {
            sets.push("national_id = $national_id");
        }
        if input.emergency_contact.is_some() {
            sets.push("emergency_contact = $emergency_contact");
        }
        sets.push("updated_at = time::now()");

        let query = format!("UPDATE type::record('tenant', $id) SET {}", sets.join(", "));

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(phone) = input.phone {
            builder = builder.bind(("phone", phone));
        }
        if let Some(national_id) = input.national_id {
            builder = builder.bind(("national_id", national_id));
        }
        if let Some(emergency_contact) = input.emergency_contact {
            builder = builder.bind(("emergency_contact", emergency_contact));
        }

        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id)?)
    }

    async fn list(&self, pagination: Pagination) -> LodgrResult<PaginatedResult<Tenant>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tenant \
                 ORDER BY created_at DESC LIMIT $limit START $offset; \
                 SELECT count() AS total FROM tenant GROUP ALL;",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        let counts: Vec<CountRow> = result.take(1).map_err(DbError::from)?;
        let total = counts.first().map(|c| c.total).unwrap_or(0);

        let items = rows
            .into_iter()
            .map(|r| r.try_into_tenant())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
