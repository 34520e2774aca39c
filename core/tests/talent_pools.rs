//! Talent pool tests: review scheduling, membership rules, counter
//! consistency, and assessment refreshes.

use succession_core::clock::EngineClock;
use succession_core::error::EngineError;
use succession_core::pool_manager::{AddMemberInput, CreatePoolInput, PoolManager, ReviewCycle};
use succession_core::scoring::{NineBoxCategory, ReadinessLevel};
use succession_core::store::{Collection, DocStore};

fn setup() -> (DocStore, PoolManager) {
    let store = DocStore::in_memory().unwrap();
    store.migrate().unwrap();
    (store, PoolManager::new(EngineClock::default()))
}

fn pool_input(name: &str, cycle: ReviewCycle) -> CreatePoolInput {
    CreatePoolInput {
        company_id: "acme".into(),
        pool_name: name.into(),
        pool_type: "executive".into(),
        review_cycle: cycle,
    }
}

fn member(employee: &str, level: ReadinessLevel) -> AddMemberInput {
    AddMemberInput {
        employee_id: employee.into(),
        employee_name: format!("Employee {employee}"),
        current_position: "Senior Manager".into(),
        nine_box_category: NineBoxCategory::HighPotential,
        readiness_level: level,
    }
}

#[test]
fn review_cycle_schedules_first_review() {
    let store = DocStore::in_memory().unwrap();
    store.migrate().unwrap();
    let pools = PoolManager::new(EngineClock::fixed_at("2026-01-15T00:00:00Z"));

    let cases = [
        (ReviewCycle::Quarterly, "2026-04-15T00:00:00Z"),
        (ReviewCycle::SemiAnnual, "2026-07-15T00:00:00Z"),
        (ReviewCycle::Annual, "2027-01-15T00:00:00Z"),
    ];
    for (cycle, expected) in cases {
        let pool = pools
            .create_talent_pool(&store, pool_input("Bench", cycle), "hr-admin")
            .unwrap();
        assert_eq!(
            pool.next_review_date,
            EngineClock::fixed_at(expected).now(),
            "cycle {cycle:?}"
        );
    }
}

#[test]
fn add_member_keeps_counters_in_lockstep() {
    let (store, pools) = setup();
    let pool = pools
        .create_talent_pool(&store, pool_input("Bench", ReviewCycle::Quarterly), "hr")
        .unwrap();
    assert_eq!(pool.member_count, 0);

    let one = pools
        .add_member(&store, &pool.pool_id, member("emp-1", ReadinessLevel::ReadyNow), "hr")
        .unwrap();
    assert_eq!(
        (one.member_count, one.ready_now_count, one.ready_1_year_count),
        (1, 1, 0)
    );

    let two = pools
        .add_member(
            &store,
            &pool.pool_id,
            member("emp-2", ReadinessLevel::Ready1Year),
            "hr",
        )
        .unwrap();
    assert_eq!(
        (two.member_count, two.ready_now_count, two.ready_1_year_count),
        (2, 1, 1)
    );
}

#[test]
fn duplicate_member_rejected() {
    let (store, pools) = setup();
    let pool = pools
        .create_talent_pool(&store, pool_input("Bench", ReviewCycle::Quarterly), "hr")
        .unwrap();
    pools
        .add_member(&store, &pool.pool_id, member("emp-1", ReadinessLevel::ReadyNow), "hr")
        .unwrap();

    let err = pools
        .add_member(
            &store,
            &pool.pool_id,
            member("emp-1", ReadinessLevel::NotReady),
            "hr",
        )
        .unwrap_err();
    match err {
        EngineError::DuplicateMember { employee_id, .. } => assert_eq!(employee_id, "emp-1"),
        other => panic!("expected DuplicateMember, got {other:?}"),
    }

    let current = pools.get_talent_pool(&store, &pool.pool_id).unwrap();
    assert_eq!(current.member_count, 1, "the failed add must not change the pool");
    assert_eq!(current.ready_now_count, 1);
}

#[test]
fn remove_member_recounts() {
    let (store, pools) = setup();
    let pool = pools
        .create_talent_pool(&store, pool_input("Bench", ReviewCycle::Quarterly), "hr")
        .unwrap();
    pools
        .add_member(&store, &pool.pool_id, member("emp-1", ReadinessLevel::ReadyNow), "hr")
        .unwrap();
    pools
        .add_member(
            &store,
            &pool.pool_id,
            member("emp-2", ReadinessLevel::Ready1Year),
            "hr",
        )
        .unwrap();

    let after = pools
        .remove_member(&store, &pool.pool_id, "emp-1", "hr")
        .unwrap();
    assert_eq!(
        (after.member_count, after.ready_now_count, after.ready_1_year_count),
        (1, 0, 1)
    );
}

#[test]
fn removing_a_non_member_is_idempotent() {
    let (store, pools) = setup();
    let pool = pools
        .create_talent_pool(&store, pool_input("Bench", ReviewCycle::Quarterly), "hr")
        .unwrap();
    pools
        .add_member(&store, &pool.pool_id, member("emp-1", ReadinessLevel::ReadyNow), "hr")
        .unwrap();

    // Not an error; the pool contents do not change.
    let after = pools
        .remove_member(&store, &pool.pool_id, "emp-ghost", "hr")
        .unwrap();
    assert_eq!(after.member_count, 1);
    assert_eq!(after.ready_now_count, 1);
    assert_eq!(
        store
            .document_version(Collection::TalentPools, &pool.pool_id)
            .unwrap(),
        3,
        "the no-op remove still writes through the versioned path"
    );
}

#[test]
fn reassessment_updates_snapshot_and_counters() {
    let store = DocStore::in_memory().unwrap();
    store.migrate().unwrap();
    let added_at = PoolManager::new(EngineClock::fixed_at("2026-01-10T00:00:00Z"));
    let reassessed_at = PoolManager::new(EngineClock::fixed_at("2026-02-20T00:00:00Z"));

    let pool = added_at
        .create_talent_pool(&store, pool_input("Bench", ReviewCycle::Quarterly), "hr")
        .unwrap();
    added_at
        .add_member(
            &store,
            &pool.pool_id,
            member("emp-1", ReadinessLevel::Ready1Year),
            "hr",
        )
        .unwrap();

    let after = reassessed_at
        .update_member_assessment(
            &store,
            &pool.pool_id,
            "emp-1",
            NineBoxCategory::Star,
            ReadinessLevel::ReadyNow,
            "cpo",
        )
        .unwrap();

    let refreshed = &after.members[0];
    assert_eq!(refreshed.nine_box_category, NineBoxCategory::Star);
    assert_eq!(refreshed.readiness_level, ReadinessLevel::ReadyNow);
    assert_eq!(
        refreshed.added_date,
        EngineClock::fixed_at("2026-01-10T00:00:00Z").now(),
        "joining date never moves"
    );
    assert_eq!(
        refreshed.last_assessed_date,
        EngineClock::fixed_at("2026-02-20T00:00:00Z").now()
    );
    assert_eq!((after.ready_now_count, after.ready_1_year_count), (1, 0));
}

#[test]
fn reassessing_a_missing_member_is_not_found() {
    let (store, pools) = setup();
    let pool = pools
        .create_talent_pool(&store, pool_input("Bench", ReviewCycle::Quarterly), "hr")
        .unwrap();

    let err = pools
        .update_member_assessment(
            &store,
            &pool.pool_id,
            "emp-ghost",
            NineBoxCategory::Star,
            ReadinessLevel::ReadyNow,
            "cpo",
        )
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::NotFound {
            entity: "pool member",
            ..
        }
    ));
}

#[test]
fn pools_list_per_company() {
    let (store, pools) = setup();
    pools
        .create_talent_pool(&store, pool_input("Bench A", ReviewCycle::Quarterly), "hr")
        .unwrap();
    pools
        .create_talent_pool(&store, pool_input("Bench B", ReviewCycle::Annual), "hr")
        .unwrap();
    let mut foreign = pool_input("Other Co", ReviewCycle::Annual);
    foreign.company_id = "globex".into();
    pools.create_talent_pool(&store, foreign, "hr").unwrap();

    let acme = pools.list_talent_pools(&store, "acme").unwrap();
    assert_eq!(acme.len(), 2);
    let names: Vec<&str> = acme.iter().map(|p| p.pool_name.as_str()).collect();
    assert_eq!(names, vec!["Bench A", "Bench B"]);
}
