//! Occupancy ledger service: orchestration of the mutating workflows.
//!
//! The invariant checks themselves run inside the store's transactions;
//! this layer validates input before any transaction starts, bounds
//! every attempt with a deadline, retries conflicted commits, and
//! coordinates the identity provider around onboarding and deletion.

use chrono::{DateTime, Utc};
use lodgr_core::error::{LodgrError, LodgrResult};
use lodgr_core::identity::IdentityProvider;
use lodgr_core::models::account::{Account, AccountRole, NewAccount};
use lodgr_core::models::lease::{Lease, LeaseTerms};
use lodgr_core::models::tenant::{Tenant, TenantProfile};
use lodgr_core::repository::{OccupancyStore, TenantRelease};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::snapshot::{self, OccupancySnapshot};

/// Input for the onboarding workflow: account, tenant profile and
/// first lease in one step.
#[derive(Debug, Clone)]
pub struct OnboardTenant {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub national_id: String,
    pub emergency_contact: String,
    pub unit_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub deposit_amount: f64,
}

/// Successful onboarding result.
#[derive(Debug, Clone)]
pub struct Onboarded {
    pub account: Account,
    pub tenant: Tenant,
    pub lease: Lease,
}

/// Input for direct lease creation between an existing tenant and a
/// unit.
#[derive(Debug, Clone)]
pub struct CreateLease {
    pub tenant_id: Uuid,
    pub unit_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub deposit_amount: f64,
}

fn require(field: &'static str, value: &str) -> LodgrResult<()> {
    if value.trim().is_empty() {
        return Err(LodgrError::Validation {
            message: format!("{field} is required"),
        });
    }
    Ok(())
}

fn require_email(email: &str) -> LodgrResult<()> {
    require("email", email)?;
    if !email.contains('@') {
        return Err(LodgrError::Validation {
            message: format!("invalid email address: {email}"),
        });
    }
    Ok(())
}

fn require_deposit(amount: f64) -> LodgrResult<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(LodgrError::Validation {
            message: format!("deposit amount must be a non-negative number, got {amount}"),
        });
    }
    Ok(())
}

/// Occupancy ledger service.
///
/// Generic over the record store and identity provider so that the
/// ledger has no dependency on the database crate. Stateless: any
/// number of instances may run against the same store.
pub struct OccupancyLedger<S: OccupancyStore, I: IdentityProvider> {
    store: S,
    identity: I,
    config: LedgerConfig,
}

impl<S: OccupancyStore, I: IdentityProvider> OccupancyLedger<S, I> {
    pub fn new(store: S, identity: I, config: LedgerConfig) -> Self {
        Self {
            store,
            identity,
            config,
        }
    }

    /// Run one store transaction with a per-attempt deadline, retrying
    /// conflicted commits up to the configured attempt count.
    async fn with_retries<T, F, Fut>(&self, op: &'static str, mut call: F) -> LodgrResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = LodgrResult<T>>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match tokio::time::timeout(self.config.operation_timeout, call()).await {
                Err(_) => {
                    warn!(op, attempt, "attempt exceeded deadline");
                    return Err(LedgerError::Deadline.into());
                }
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(LodgrError::ConcurrentModification))
                    if attempt < self.config.max_attempts =>
                {
                    warn!(op, attempt, "commit conflict, retrying");
                    tokio::time::sleep(self.config.retry_backoff * attempt).await;
                }
                Ok(Err(LodgrError::ConcurrentModification)) => {
                    return Err(LedgerError::RetriesExhausted { attempts: attempt }.into());
                }
                Ok(Err(err)) => return Err(err),
            }
        }
    }

    /// Bound a single non-retried call with the operation deadline.
    async fn bounded<T>(&self, fut: impl Future<Output = LodgrResult<T>>) -> LodgrResult<T> {
        match tokio::time::timeout(self.config.operation_timeout, fut).await {
            Err(_) => Err(LedgerError::Deadline.into()),
            Ok(result) => result,
        }
    }

    /// Onboard a tenant: create the account, then the tenant profile
    /// and first active lease in one store transaction, marking the
    /// unit occupied.
    ///
    /// The email existence check runs before anything else so duplicate
    /// identities fail fast with no state change. If the store
    /// transaction fails after the account was created, the account is
    /// deleted again so no partial onboarding is visible.
    pub async fn onboard_tenant(&self, input: OnboardTenant) -> LodgrResult<Onboarded> {
        require("name", &input.name)?;
        require_email(&input.email)?;
        require("password", &input.password)?;
        require_deposit(input.deposit_amount)?;

        if self.bounded(self.identity.email_exists(&input.email)).await? {
            return Err(LodgrError::DuplicateIdentity { email: input.email });
        }

        let account = self
            .bounded(self.identity.create_account(NewAccount {
                name: input.name.clone(),
                email: input.email.clone(),
                password: input.password.clone(),
                role: AccountRole::Tenant,
            }))
            .await?;

        let profile = TenantProfile {
            phone: input.phone.clone(),
            national_id: input.national_id.clone(),
            emergency_contact: input.emergency_contact.clone(),
        };
        let terms = LeaseTerms {
            start_date: input.start_date,
            deposit_amount: input.deposit_amount,
        };

        let result = self
            .with_retries("onboard_tenant", || {
                self.store
                    .onboard(account.id, profile.clone(), input.unit_id, terms.clone())
            })
            .await;

        match result {
            Ok((tenant, lease)) => {
                info!(
                    tenant_id = %tenant.id,
                    lease_id = %lease.id,
                    unit_id = %input.unit_id,
                    "tenant onboarded"
                );
                Ok(Onboarded {
                    account,
                    tenant,
                    lease,
                })
            }
            Err(err) => {
                // Compensate the account creation so the failed
                // onboarding leaves nothing behind.
                if let Err(cleanup) = self.bounded(self.identity.delete_account(account.id)).await {
                    warn!(
                        account_id = %account.id,
                        error = %cleanup,
                        "failed to remove account after onboarding failure"
                    );
                }
                Err(err)
            }
        }
    }

    /// Create an active lease binding a tenant to a unit and mark the
    /// unit occupied. Fails with `UnitOccupied` or
    /// `TenantHasActiveLease` when either already holds an active
    /// lease.
    pub async fn create_lease(&self, input: CreateLease) -> LodgrResult<Lease> {
        require_deposit(input.deposit_amount)?;

        let terms = LeaseTerms {
            start_date: input.start_date,
            deposit_amount: input.deposit_amount,
        };

        let lease = self
            .with_retries("create_lease", || {
                self.store
                    .begin_lease(input.tenant_id, input.unit_id, terms.clone())
            })
            .await?;

        info!(
            lease_id = %lease.id,
            tenant_id = %input.tenant_id,
            unit_id = %input.unit_id,
            "lease created"
        );
        Ok(lease)
    }

    /// Terminate a lease, stamp its end date and free the unit. A
    /// second call fails with `AlreadyTerminated` and changes nothing.
    pub async fn terminate_lease(&self, lease_id: Uuid) -> LodgrResult<Lease> {
        let lease = self
            .with_retries("terminate_lease", || self.store.end_lease(lease_id))
            .await?;

        info!(lease_id = %lease.id, unit_id = %lease.unit_id, "lease terminated");
        Ok(lease)
    }

    /// Delete a tenant: every active lease is terminated and its unit
    /// freed in one store transaction (leases stay on record as
    /// history), then the account is deleted via the identity provider.
    pub async fn delete_tenant(&self, tenant_id: Uuid) -> LodgrResult<TenantRelease> {
        let release = self
            .with_retries("delete_tenant", || self.store.release_tenant(tenant_id))
            .await?;

        if let Err(err) = self.bounded(self.identity.delete_account(release.user_id)).await {
            warn!(
                tenant_id = %tenant_id,
                user_id = %release.user_id,
                error = %err,
                "tenant released but account deletion failed"
            );
            return Err(LedgerError::Identity(err.to_string()).into());
        }

        info!(
            tenant_id = %tenant_id,
            terminated = release.terminated.len(),
            "tenant deleted"
        );
        Ok(release)
    }

    /// Delete a unit. Fails with `UnitOccupied` unless it is available.
    pub async fn delete_unit(&self, unit_id: Uuid) -> LodgrResult<()> {
        self.with_retries("delete_unit", || self.store.delete_unit(unit_id))
            .await?;

        info!(unit_id = %unit_id, "unit deleted");
        Ok(())
    }

    /// Point-in-time occupancy snapshot across all buildings. Pure
    /// read; no retry.
    pub async fn occupancy_snapshot(&self) -> LodgrResult<OccupancySnapshot> {
        let counts = self.bounded(self.store.building_counts()).await?;
        Ok(snapshot::build_snapshot(counts))
    }
}
