//! Account-table identity provider backed by SurrealDB.
//!
//! Stands in for an external account-management system: it owns the
//! `account` table, hashes passwords with Argon2id and enforces email
//! uniqueness. Token issuance and activation email flows are out of
//! scope and live elsewhere.

use argon2::Argon2;
use argon2::password_hash::{PasswordHasher, SaltString};
use chrono::{DateTime, Utc};
use lodgr_core::error::{LodgrError, LodgrResult};
use lodgr_core::identity::IdentityProvider;
use lodgr_core::models::account::{Account, AccountRole, NewAccount};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

fn parse_role(raw: &str) -> Result<AccountRole, DbError> {
    match raw {
        "Tenant" => Ok(AccountRole::Tenant),
        "Caretaker" => Ok(AccountRole::Caretaker),
        "Admin" => Ok(AccountRole::Admin),
        other => Err(DbError::Migration(format!("invalid account role: {other}"))),
    }
}

fn role_str(role: AccountRole) -> &'static str {
    match role {
        AccountRole::Tenant => "Tenant",
        AccountRole::Caretaker => "Caretaker",
        AccountRole::Admin => "Admin",
    }
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing. The salt is randomly generated for each call.
fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, LodgrError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| LodgrError::Internal(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| LodgrError::Internal(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct AccountRow {
    name: String,
    email: String,
    #[allow(dead_code)]
    password_hash: String,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self, id: Uuid) -> Result<Account, DbError> {
        Ok(Account {
            id,
            name: self.name,
            email: self.email,
            role: parse_role(&self.role)?,
            is_active: self.is_active,
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

/// SurrealDB-backed identity provider.
#[derive(Clone)]
pub struct SurrealIdentityProvider<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealIdentityProvider<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }
}

impl<C: Connection> IdentityProvider for SurrealIdentityProvider<C> {
    async fn email_exists(&self, email: &str) -> LodgrResult<bool> {
        let email_owned = email.to_string();

        let mut result = self
            .db
            .query("SELECT count() AS total FROM account WHERE email = $email GROUP ALL")
            .bind(("email", email_owned))
            .await
            .map_err(DbError::from)?;

        let counts: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(counts.first().map(|c| c.total).unwrap_or(0) > 0)
    }

    async fn create_account(&self, input: NewAccount) -> LodgrResult<Account> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;

        let result = self
            .db
            .query(
                "CREATE type::record('account', $id) SET \
                 name = $name, email = $email, \
                 password_hash = $password_hash, role = $role, \
                 is_active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("email", input.email.clone()))
            .bind(("password_hash", password_hash))
            .bind(("role", role_str(input.role)))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| {
            // The unique email index rejects duplicates.
            let msg = e.to_string();
            if msg.contains("idx_account_email") || msg.contains("already contains") {
                LodgrError::DuplicateIdentity {
                    email: input.email.clone(),
                }
            } else {
                LodgrError::from(DbError::from(e))
            }
        })?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: id_str,
        })?;

        Ok(row.into_account(id)?)
    }

    async fn get_account(&self, id: Uuid) -> LodgrResult<Account> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('account', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: id_str,
        })?;

        Ok(row.into_account(id)?)
    }

    async fn delete_account(&self, id: Uuid) -> LodgrResult<()> {
        let id_str = id.to_string();

        self.db
            .query("DELETE type::record('account', $id)")
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;

        Ok(())
    }
}
