//! Integration tests for the occupancy ledger service, running against
//! in-memory SurrealDB through `lodgr-db`.

use std::sync::Arc;

use chrono::Utc;
use lodgr_core::error::{LodgrError, LodgrResult};
use lodgr_core::identity::IdentityProvider;
use lodgr_core::models::account::{Account, AccountRole, NewAccount};
use lodgr_core::models::lease::LeaseStatus;
use lodgr_core::models::unit::{CreateUnit, Unit, UnitStatus};
use lodgr_core::repository::{LeaseRepository, OccupancyStore, Pagination, TenantRepository, UnitRepository};
use lodgr_db::repository::{SurrealLeaseRepository, SurrealTenantRepository, SurrealUnitRepository};
use lodgr_db::{SurrealIdentityProvider, SurrealOccupancyStore};
use lodgr_ledger::config::LedgerConfig;
use lodgr_ledger::service::{CreateLease, OccupancyLedger, OnboardTenant};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Ledger = OccupancyLedger<SurrealOccupancyStore<Db>, SurrealIdentityProvider<Db>>;

/// Helper: spin up in-memory DB, run migrations, build a ledger.
async fn setup() -> (Surreal<Db>, Ledger) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    lodgr_db::run_migrations(&db).await.unwrap();

    let ledger = OccupancyLedger::new(
        SurrealOccupancyStore::new(db.clone()),
        SurrealIdentityProvider::new(db.clone()),
        LedgerConfig::default(),
    );
    (db, ledger)
}

async fn create_unit(db: &Surreal<Db>, building: &str, number: &str) -> Unit {
    SurrealUnitRepository::new(db.clone())
        .create(CreateUnit {
            building: building.into(),
            unit_number: number.into(),
            description: "Bedsitter".into(),
            rent_amount: 8000.0,
        })
        .await
        .unwrap()
}

async fn unit_status(db: &Surreal<Db>, unit_id: Uuid) -> UnitStatus {
    SurrealUnitRepository::new(db.clone())
        .get_by_id(unit_id)
        .await
        .unwrap()
        .status
}

fn onboarding(email: &str, unit_id: Uuid) -> OnboardTenant {
    OnboardTenant {
        name: "Jane Wanjiku".into(),
        email: email.into(),
        password: "correct-horse-battery".into(),
        phone: "0711000000".into(),
        national_id: "12345678".into(),
        emergency_contact: "0722000000".into(),
        unit_id,
        start_date: Utc::now(),
        deposit_amount: 8000.0,
    }
}

fn lease_request(tenant_id: Uuid, unit_id: Uuid) -> CreateLease {
    CreateLease {
        tenant_id,
        unit_id,
        start_date: Utc::now(),
        deposit_amount: 8000.0,
    }
}

// -----------------------------------------------------------------------
// Onboarding
// -----------------------------------------------------------------------

#[tokio::test]
async fn onboard_creates_account_tenant_and_active_lease() {
    let (db, ledger) = setup().await;
    let unit = create_unit(&db, "Block A", "A1").await;

    let onboarded = ledger
        .onboard_tenant(onboarding("jane@example.com", unit.id))
        .await
        .unwrap();

    assert_eq!(onboarded.account.role, AccountRole::Tenant);
    assert_eq!(onboarded.tenant.user_id, onboarded.account.id);
    assert_eq!(onboarded.lease.status, LeaseStatus::Active);
    assert!(onboarded.lease.deposit_paid);
    assert_eq!(unit_status(&db, unit.id).await, UnitStatus::Occupied);
}

#[tokio::test]
async fn onboard_duplicate_email_fails_fast_with_no_state_change() {
    let (db, ledger) = setup().await;
    let taken = create_unit(&db, "Block A", "A1").await;
    let free = create_unit(&db, "Block A", "A2").await;

    ledger
        .onboard_tenant(onboarding("jane@example.com", taken.id))
        .await
        .unwrap();

    let err = ledger
        .onboard_tenant(onboarding("jane@example.com", free.id))
        .await
        .unwrap_err();
    assert!(matches!(err, LodgrError::DuplicateIdentity { .. }));

    assert_eq!(unit_status(&db, free.id).await, UnitStatus::Available);
    let tenants = SurrealTenantRepository::new(db.clone())
        .list(Pagination::default())
        .await
        .unwrap();
    assert_eq!(tenants.total, 1);
}

#[tokio::test]
async fn onboard_into_unavailable_unit_removes_created_account() {
    let (db, ledger) = setup().await;
    let unit = create_unit(&db, "Block A", "A1").await;

    ledger
        .onboard_tenant(onboarding("first@example.com", unit.id))
        .await
        .unwrap();

    let err = ledger
        .onboard_tenant(onboarding("second@example.com", unit.id))
        .await
        .unwrap_err();
    assert!(matches!(err, LodgrError::UnitUnavailable { .. }));

    // The compensating delete makes the email usable again.
    let identity = SurrealIdentityProvider::new(db.clone());
    assert!(!identity.email_exists("second@example.com").await.unwrap());
}

/// Identity provider double whose account creation always fails.
struct FailingIdentity;

impl IdentityProvider for FailingIdentity {
    async fn email_exists(&self, _email: &str) -> LodgrResult<bool> {
        Ok(false)
    }

    async fn create_account(&self, _input: NewAccount) -> LodgrResult<Account> {
        Err(LodgrError::Identity("account service unavailable".into()))
    }

    async fn get_account(&self, id: Uuid) -> LodgrResult<Account> {
        Err(LodgrError::NotFound {
            entity: "account".into(),
            id: id.to_string(),
        })
    }

    async fn delete_account(&self, _id: Uuid) -> LodgrResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn onboarding_leaves_no_trace_when_identity_step_fails() {
    let (db, _) = setup().await;
    let unit = create_unit(&db, "Block A", "A1").await;

    let ledger = OccupancyLedger::new(
        SurrealOccupancyStore::new(db.clone()),
        FailingIdentity,
        LedgerConfig::default(),
    );

    let err = ledger
        .onboard_tenant(onboarding("jane@example.com", unit.id))
        .await
        .unwrap_err();
    assert!(matches!(err, LodgrError::Identity(_)));

    assert_eq!(unit_status(&db, unit.id).await, UnitStatus::Available);
    let tenants = SurrealTenantRepository::new(db.clone())
        .list(Pagination::default())
        .await
        .unwrap();
    assert_eq!(tenants.total, 0);
    let leases = SurrealLeaseRepository::new(db.clone()).list_active().await.unwrap();
    assert!(leases.is_empty());
}

// -----------------------------------------------------------------------
// Lease lifecycle
// -----------------------------------------------------------------------

#[tokio::test]
async fn occupied_unit_rejects_second_lease() {
    let (db, ledger) = setup().await;
    let unit = create_unit(&db, "Block A", "A1").await;
    let free = create_unit(&db, "Block B", "B1").await;

    ledger
        .onboard_tenant(onboarding("jane@example.com", unit.id))
        .await
        .unwrap();
    let other = ledger
        .onboard_tenant(onboarding("other@example.com", free.id))
        .await
        .unwrap();
    ledger.terminate_lease(other.lease.id).await.unwrap();

    let err = ledger
        .create_lease(lease_request(other.tenant.id, unit.id))
        .await
        .unwrap_err();
    assert!(matches!(err, LodgrError::UnitOccupied { .. }));
}

#[tokio::test]
async fn tenant_with_active_lease_cannot_take_second_unit() {
    let (db, ledger) = setup().await;
    let unit = create_unit(&db, "Block A", "A1").await;
    let free = create_unit(&db, "Block A", "A2").await;

    let onboarded = ledger
        .onboard_tenant(onboarding("jane@example.com", unit.id))
        .await
        .unwrap();

    let err = ledger
        .create_lease(lease_request(onboarded.tenant.id, free.id))
        .await
        .unwrap_err();
    assert!(matches!(err, LodgrError::TenantHasActiveLease { .. }));
}

#[tokio::test]
async fn termination_frees_unit_for_the_next_lease() {
    let (db, ledger) = setup().await;
    let unit = create_unit(&db, "Block A", "A1").await;
    let free = create_unit(&db, "Block B", "B1").await;

    let first = ledger
        .onboard_tenant(onboarding("jane@example.com", unit.id))
        .await
        .unwrap();
    let second = ledger
        .onboard_tenant(onboarding("other@example.com", free.id))
        .await
        .unwrap();

    let terminated = ledger.terminate_lease(first.lease.id).await.unwrap();
    assert_eq!(terminated.status, LeaseStatus::Terminated);
    assert!(terminated.end_date.is_some());
    assert_eq!(unit_status(&db, unit.id).await, UnitStatus::Available);

    // Repeat termination fails and changes nothing.
    let err = ledger.terminate_lease(first.lease.id).await.unwrap_err();
    assert!(matches!(err, LodgrError::AlreadyTerminated { .. }));
    assert_eq!(unit_status(&db, unit.id).await, UnitStatus::Available);

    // The freed unit is leasable by a tenant whose lease has ended.
    ledger.terminate_lease(second.lease.id).await.unwrap();
    let lease = ledger
        .create_lease(lease_request(second.tenant.id, unit.id))
        .await
        .unwrap();
    assert_eq!(lease.status, LeaseStatus::Active);
    assert_eq!(unit_status(&db, unit.id).await, UnitStatus::Occupied);
}

#[tokio::test]
async fn terminate_unknown_lease_is_not_found() {
    let (_db, ledger) = setup().await;
    let err = ledger.terminate_lease(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, LodgrError::NotFound { ref entity, .. } if entity == "lease"));
}

// -----------------------------------------------------------------------
// Tenant and unit deletion
// -----------------------------------------------------------------------

#[tokio::test]
async fn delete_tenant_frees_unit_and_preserves_history() {
    let (db, ledger) = setup().await;
    let unit = create_unit(&db, "Block A", "A1").await;

    let onboarded = ledger
        .onboard_tenant(onboarding("jane@example.com", unit.id))
        .await
        .unwrap();

    let release = ledger.delete_tenant(onboarded.tenant.id).await.unwrap();
    assert_eq!(release.user_id, onboarded.account.id);
    assert_eq!(release.terminated.len(), 1);
    assert_eq!(unit_status(&db, unit.id).await, UnitStatus::Available);

    // Account is gone, profile is gone, the lease stays on record.
    let identity = SurrealIdentityProvider::new(db.clone());
    let err = identity.get_account(onboarded.account.id).await.unwrap_err();
    assert!(matches!(err, LodgrError::NotFound { .. }));

    let err = SurrealTenantRepository::new(db.clone())
        .get_by_id(onboarded.tenant.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LodgrError::NotFound { .. }));

    let history = SurrealLeaseRepository::new(db.clone())
        .list_by_tenant(onboarded.tenant.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, LeaseStatus::Terminated);

    let err = ledger.delete_tenant(onboarded.tenant.id).await.unwrap_err();
    assert!(matches!(err, LodgrError::NotFound { ref entity, .. } if entity == "tenant"));
}

#[tokio::test]
async fn delete_unit_rules() {
    let (db, ledger) = setup().await;
    let occupied = create_unit(&db, "Block A", "A1").await;
    let free = create_unit(&db, "Block A", "A2").await;

    ledger
        .onboard_tenant(onboarding("jane@example.com", occupied.id))
        .await
        .unwrap();

    let err = ledger.delete_unit(occupied.id).await.unwrap_err();
    assert!(matches!(err, LodgrError::UnitOccupied { .. }));

    ledger.delete_unit(free.id).await.unwrap();
    let err = SurrealUnitRepository::new(db.clone())
        .get_by_id(free.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LodgrError::NotFound { .. }));
}

// -----------------------------------------------------------------------
// Validation
// -----------------------------------------------------------------------

#[tokio::test]
async fn malformed_input_is_rejected_before_any_transaction() {
    let (db, ledger) = setup().await;
    let unit = create_unit(&db, "Block A", "A1").await;

    let mut bad_deposit = onboarding("jane@example.com", unit.id);
    bad_deposit.deposit_amount = -50.0;
    let err = ledger.onboard_tenant(bad_deposit).await.unwrap_err();
    assert!(matches!(err, LodgrError::Validation { .. }));

    let bad_email = onboarding("not-an-email", unit.id);
    let err = ledger.onboard_tenant(bad_email).await.unwrap_err();
    assert!(matches!(err, LodgrError::Validation { .. }));

    let mut bad_lease = lease_request(Uuid::new_v4(), unit.id);
    bad_lease.deposit_amount = f64::NAN;
    let err = ledger.create_lease(bad_lease).await.unwrap_err();
    assert!(matches!(err, LodgrError::Validation { .. }));

    assert_eq!(unit_status(&db, unit.id).await, UnitStatus::Available);
}

// -----------------------------------------------------------------------
// Concurrency
// -----------------------------------------------------------------------

#[tokio::test]
async fn concurrent_leases_on_one_unit_admit_at_most_one() {
    let (db, ledger) = setup().await;
    let contested = create_unit(&db, "Block A", "A1").await;
    let parked_a = create_unit(&db, "Block B", "B1").await;
    let parked_b = create_unit(&db, "Block B", "B2").await;

    // Two tenants, both currently lease-free.
    let first = ledger
        .onboard_tenant(onboarding("first@example.com", parked_a.id))
        .await
        .unwrap();
    let second = ledger
        .onboard_tenant(onboarding("second@example.com", parked_b.id))
        .await
        .unwrap();
    ledger.terminate_lease(first.lease.id).await.unwrap();
    ledger.terminate_lease(second.lease.id).await.unwrap();

    let ledger = Arc::new(ledger);
    let a = {
        let ledger = Arc::clone(&ledger);
        let request = lease_request(first.tenant.id, contested.id);
        tokio::spawn(async move { ledger.create_lease(request).await })
    };
    let b = {
        let ledger = Arc::clone(&ledger);
        let request = lease_request(second.tenant.id, contested.id);
        tokio::spawn(async move { ledger.create_lease(request).await })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one concurrent lease may win");
    for r in &results {
        if let Err(err) = r {
            assert!(
                matches!(
                    err,
                    LodgrError::UnitOccupied { .. } | LodgrError::ConcurrentModification
                ),
                "unexpected loser error: {err}"
            );
        }
    }

    // The invariant, not just the API answers: one active lease.
    let active = SurrealLeaseRepository::new(db.clone())
        .list_by_unit(contested.id)
        .await
        .unwrap()
        .into_iter()
        .filter(|l| l.status == LeaseStatus::Active)
        .count();
    assert_eq!(active, 1);
    assert_eq!(unit_status(&db, contested.id).await, UnitStatus::Occupied);
}

#[tokio::test]
async fn concurrent_leases_for_one_tenant_admit_at_most_one() {
    let (db, ledger) = setup().await;
    let unit_a = create_unit(&db, "Block A", "A1").await;
    let unit_b = create_unit(&db, "Block A", "A2").await;
    let parked = create_unit(&db, "Block B", "B1").await;

    let onboarded = ledger
        .onboard_tenant(onboarding("jane@example.com", parked.id))
        .await
        .unwrap();
    ledger.terminate_lease(onboarded.lease.id).await.unwrap();
    let tenant_id = onboarded.tenant.id;

    let ledger = Arc::new(ledger);
    let a = {
        let ledger = Arc::clone(&ledger);
        let request = lease_request(tenant_id, unit_a.id);
        tokio::spawn(async move { ledger.create_lease(request).await })
    };
    let b = {
        let ledger = Arc::clone(&ledger);
        let request = lease_request(tenant_id, unit_b.id);
        tokio::spawn(async move { ledger.create_lease(request).await })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "a tenant may only win one lease");
    for r in &results {
        if let Err(err) = r {
            assert!(matches!(
                err,
                LodgrError::TenantHasActiveLease { .. } | LodgrError::ConcurrentModification
            ));
        }
    }

    let active = SurrealLeaseRepository::new(db.clone())
        .list_by_tenant(tenant_id)
        .await
        .unwrap()
        .into_iter()
        .filter(|l| l.status == LeaseStatus::Active)
        .count();
    assert_eq!(active, 1);
}

// -----------------------------------------------------------------------
// Snapshot
// -----------------------------------------------------------------------

#[tokio::test]
async fn snapshot_counts_add_up() {
    let (db, ledger) = setup().await;
    let a1 = create_unit(&db, "Block A", "A1").await;
    create_unit(&db, "Block A", "A2").await;
    create_unit(&db, "Block A", "A3").await;
    let b1 = create_unit(&db, "Block B", "B1").await;

    ledger
        .onboard_tenant(onboarding("jane@example.com", a1.id))
        .await
        .unwrap();
    ledger
        .onboard_tenant(onboarding("other@example.com", b1.id))
        .await
        .unwrap();

    let snap = ledger.occupancy_snapshot().await.unwrap();
    assert_eq!(snap.total_units, 4);
    assert_eq!(snap.occupied_units, 2);
    assert_eq!(snap.available_units, 2);
    assert_eq!(snap.occupancy_rate, 50);

    assert_eq!(snap.buildings.len(), 2);
    assert_eq!(snap.buildings[0].building, "Block A");
    assert_eq!(snap.buildings[0].total, 3);
    assert_eq!(snap.buildings[0].occupied, 1);
    assert_eq!(snap.buildings[0].vacant, 2);
    assert_eq!(snap.buildings[0].percentage, 33);
    assert_eq!(snap.buildings[1].building, "Block B");
    assert_eq!(snap.buildings[1].percentage, 100);
}

#[tokio::test]
async fn snapshot_of_empty_store_is_all_zeroes() {
    let (_db, ledger) = setup().await;
    let snap = ledger.occupancy_snapshot().await.unwrap();
    assert_eq!(snap.total_units, 0);
    assert_eq!(snap.occupancy_rate, 0);
    assert!(snap.buildings.is_empty());
}
