//! SurrealDB implementation of [`CaretakerRepository`].

use chrono::{DateTime, Utc};
use lodgr_core::error::LodgrResult;
use lodgr_core::models::caretaker::{Caretaker, CreateCaretaker, UpdateCaretaker};
use lodgr_core::repository::{CaretakerRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct CaretakerRow {
    user_id: String,
    phone: String,
    assigned_area: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CaretakerRow {
    fn into_caretaker(self, id: Uuid) -> Result<Caretaker, DbError> {
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(Caretaker {
            id,
            user_id,
            phone: self.phone,
            assigned_area: self.assigned_area,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct CaretakerRowWithId {
    record_id: String,
    user_id: String,
    phone: String,
    assigned_area: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CaretakerRowWithId {
    fn try_into_caretaker(self) -> Result<Caretaker, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(Caretaker {
            id,
            user_id,
            phone: self.phone,
            assigned_area: self.assigned_area,
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

/// SurrealDB implementation of the Caretaker repository.
#[derive(Clone)]
pub struct SurrealCaretakerRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCaretakerRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CaretakerRepository for SurrealCaretakerRepository<C> {
    async fn create(&self, input: CreateCaretaker) -> LodgrResult<Caretaker> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('caretaker', $id) SET \
                 user_id = $user_id, phone = $phone, \
                 assigned_area = $assigned_area",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("phone", input.phone))
            .bind(("assigned_area", input.assigned_area))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<CaretakerRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "caretaker".into(),
            id: id_str,
        })?;

        Ok(row.into_caretaker(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> LodgrResult<Caretaker> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('caretaker', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CaretakerRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "caretaker".into(),
            id: id_str,
        })?;

        Ok(row.into_caretaker(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateCaretaker) -> LodgrResult<Caretaker> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.phone.is_some() {
            sets.push("phone = $phone");
        }
        if input.assigned_area.is_some() {
            sets.push("assigned_area = $assigned_area");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('caretaker', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(phone) = input.phone {
            builder = builder.bind(("phone", phone));
        }
        if let Some(assigned_area) = input.assigned_area {
            builder = builder.bind(("assigned_area", assigned_area));
        }

        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<CaretakerRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "caretaker".into(),
            id: id_str,
        })?;

        Ok(row.into_caretaker(id)?)
    }

    async fn delete(&self, id: Uuid) -> LodgrResult<()> {
        let id_str = id.to_string();

        // Verify existence first so callers get a typed NotFound.
        let mut result = self
            .db
            .query("SELECT * FROM type::record('caretaker', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CaretakerRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "caretaker".into(),
                id: id_str,
            }
            .into());
        }

        self.db
            .query("DELETE type::record('caretaker', $id)")
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> LodgrResult<PaginatedResult<Caretaker>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM caretaker \
                 ORDER BY created_at DESC LIMIT $limit START $offset; \
                 SELECT count() AS total FROM caretaker GROUP ALL;",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CaretakerRowWithId> = result.take(0).map_err(DbError::from)?;
        let counts: Vec<CountRow> = result.take(1).map_err(DbError::from)?;
        let total = counts.first().map(|c| c.total).unwrap_or(0);

        let items = rows
            .into_iter()
            .map(|r| r.try_into_caretaker())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
