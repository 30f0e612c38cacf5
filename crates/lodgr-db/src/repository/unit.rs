//! SurrealDB implementation of [`UnitRepository`].

use chrono::{DateTime, Utc};
use lodgr_core::error::{LodgrError, LodgrResult};
use lodgr_core::models::unit::{CreateUnit, Unit, UnitStatus, UpdateUnit};
use lodgr_core::repository::{PaginatedResult, Pagination, UnitRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

fn parse_unit_status(raw: &str) -> Result<UnitStatus, DbError> {
    match raw {
        "Available" => Ok(UnitStatus::Available),
        "Occupied" => Ok(UnitStatus::Occupied),
        other => Err(DbError::Migration(format!("invalid unit status: {other}"))),
    }
}

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UnitRow {
    building: String,
    unit_number: String,
    description: String,
    rent_amount: f64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UnitRow {
    fn into_unit(self, id: Uuid) -> Result<Unit, DbError> {
        Ok(Unit {
            id,
            building: self.building,
            unit_number: self.unit_number,
            description: self.description,
            rent_amount: self.rent_amount,
            status: parse_unit_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UnitRowWithId {
    record_id: String,
    building: String,
    unit_number: String,
    description: String,
    rent_amount: f64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UnitRowWithId {
    fn try_into_unit(self) -> Result<Unit, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(Unit {
            id,
            building: self.building,
            unit_number: self.unit_number,
            description: self.description,
            rent_amount: self.rent_amount,
            status: parse_unit_status(&self.status)?,
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

/// SurrealDB implementation of the Unit repository.
#[derive(Clone)]
pub struct SurrealUnitRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUnitRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn list_where(
        &self,
        filter: Option<&'static str>,
        pagination: Pagination,
    ) -> LodgrResult<PaginatedResult<Unit>> {
        let where_clause = filter.map(|f| format!("WHERE {f} ")).unwrap_or_default();
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM unit {where_clause}\
             ORDER BY created_at DESC LIMIT $limit START $offset; \
             SELECT count() AS total FROM unit {where_clause}GROUP ALL;"
        );

        let mut result = self
            .db
            .query(query)
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UnitRowWithId> = result.take(0).map_err(DbError::from)?;
        let counts: Vec<CountRow> = result.take(1).map_err(DbError::from)?;
        let total = counts.first().map(|c| c.total).unwrap_or(0);

        let items = rows
            .into_iter()
            .map(|r| r.try_into_unit())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

impl<C: Connection> UnitRepository for SurrealUnitRepository<C> {
    async fn create(&self, input: CreateUnit) -> LodgrResult<Unit> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('unit', $id) SET \
                 building = $building, unit_number = $unit_number, \
                 description = $description, rent_amount = $rent_amount, \
                 status = 'Available'",
            )
            .bind(("id", id_str.clone()))
            .bind(("building", input.building.clone()))
            .bind(("unit_number", input.unit_number.clone()))
            .bind(("description", input.description))
            .bind(("rent_amount", input.rent_amount))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| {
            // The unique (building, unit_number) index rejects duplicates.
            let msg = e.to_string();
            if msg.contains("idx_unit_building_number") || msg.contains("already contains") {
                LodgrError::DuplicateUnit {
                    building: input.building.clone(),
                    unit_number: input.unit_number.clone(),
                }
            } else {
                LodgrError::from(DbError::from(e))
            }
        })?;

        let rows: Vec<UnitRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "unit".into(),
            id: id_str,
        })?;

        Ok(row.into_unit(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> LodgrResult<Unit> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('unit', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UnitRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "unit".into(),
            id: id_str,
        })?;

        Ok(row.into_unit(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateUnit) -> LodgrResult<Unit> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.rent_amount.is_some() {
            sets.push("rent_amount = $rent_amount");
        }
        sets.push("updated_at = time::now()");

        let query = format!("UPDATE type::record('unit', $id) SET {}", sets.join(", "));

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(rent_amount) = input.rent_amount {
            builder = builder.bind(("rent_amount", rent_amount));
        }

        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<UnitRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "unit".into(),
            id: id_str,
        })?;

        Ok(row.into_unit(id)?)
    }

    async fn list(&self, pagination: Pagination) -> LodgrResult<PaginatedResult<Unit>> {
        self.list_where(None, pagination).await
    }

    async fn list_available(&self, pagination: Pagination) -> LodgrResult<PaginatedResult<Unit>> {
        self.list_where(Some("status = 'Available'"), pagination)
            .await
    }
}
