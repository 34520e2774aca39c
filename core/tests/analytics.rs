//! Analytics aggregator tests: distribution counting, coverage
//! arithmetic, plan health banding, and the active-roles-only rule.

use succession_core::analytics_aggregator::{
    AnalyticsAggregator, PlanHealth, ReadinessDistribution, RiskDistribution, TalentDistribution,
};
use succession_core::clock::EngineClock;
use succession_core::config::EngineConfig;
use succession_core::development_tracker::{
    ActionInput, ActionStatus, CreatePlanInput, DevelopmentTracker,
};
use succession_core::role_registry::{CreateRoleInput, RoleRegistry, SuccessorInput};
use succession_core::scoring::{CriticalityFactor, ReadinessAssessment, ReadinessLevel};
use succession_core::store::DocStore;
use succession_core::types::EntityId;

struct Fixture {
    store: DocStore,
    registry: RoleRegistry,
    tracker: DevelopmentTracker,
    aggregator: AnalyticsAggregator,
}

fn fixture() -> Fixture {
    let store = DocStore::in_memory().unwrap();
    store.migrate().unwrap();
    let config = EngineConfig::default();
    Fixture {
        store,
        registry: RoleRegistry::new(&config, EngineClock::default()),
        tracker: DevelopmentTracker::new(EngineClock::default()),
        aggregator: AnalyticsAggregator::new(&config, EngineClock::default()),
    }
}

fn successor(
    employee: &str,
    level: ReadinessLevel,
    performance: f64,
    potential: &str,
    rank: u32,
) -> SuccessorInput {
    SuccessorInput {
        employee_id: employee.into(),
        employee_name: format!("Employee {employee}"),
        current_position: "Senior Manager".into(),
        current_department: "Operations".into(),
        readiness_level: level,
        readiness_assessment: ReadinessAssessment {
            leadership: 75.0,
            technical: 75.0,
            strategic_thinking: 75.0,
            communication: 75.0,
            cultural_fit: 75.0,
            experience: 75.0,
            regional_knowledge: None,
        },
        performance_rating: performance,
        potential_rating: potential.into(),
        competency_gaps: Vec::new(),
        rank,
    }
}

fn make_role(f: &Fixture, company: &str) -> EntityId {
    f.registry
        .create_critical_role(
            &f.store,
            CreateRoleInput {
                company_id: company.into(),
                position_id: "pos-001".into(),
                position_title: "Head of Something".into(),
                department: "Operations".into(),
                criticality_factors: vec![CriticalityFactor {
                    factor: "revenue_impact".into(),
                    score: 4.0,
                    weight: 100.0,
                }],
            },
            "hr-admin",
        )
        .unwrap()
        .role_id
}

fn make_plan(f: &Fixture, employee: &str, progress: u32) -> EntityId {
    let plan = f
        .tracker
        .create_development_plan(
            &f.store,
            CreatePlanInput {
                company_id: "acme".into(),
                employee_id: employee.into(),
                employee_name: format!("Employee {employee}"),
                target_role_id: "role-target".into(),
                actions: vec![ActionInput {
                    action_type: "training".into(),
                    title: "Leadership intensive".into(),
                    start_date: None,
                    due_date: None,
                    resources: Vec::new(),
                    cost: None,
                    expected_outcome: "Ready for the target role".into(),
                }],
            },
            "vp-talent",
        )
        .unwrap();
    f.tracker
        .update_action_progress(
            &f.store,
            &plan.plan_id,
            "act-1",
            progress,
            Some(ActionStatus::InProgress),
            None,
            "vp-talent",
        )
        .unwrap();
    plan.plan_id
}

#[test]
fn distributions_count_every_active_role_and_successor() {
    let f = fixture();

    let role1 = make_role(&f, "acme");
    f.registry
        .add_successor(
            &f.store,
            &role1,
            successor("emp-1", ReadinessLevel::ReadyNow, 4.5, "high", 1),
            "vp",
        )
        .unwrap();
    f.registry
        .add_successor(
            &f.store,
            &role1,
            successor("emp-2", ReadinessLevel::NotReady, 2.0, "low", 2),
            "vp",
        )
        .unwrap();

    let role2 = make_role(&f, "acme");
    f.registry
        .add_successor(
            &f.store,
            &role2,
            successor("emp-3", ReadinessLevel::Ready1Year, 4.5, "medium", 1),
            "vp",
        )
        .unwrap();

    // A reorged-away role with a ready successor must not count anywhere.
    let gone = make_role(&f, "acme");
    f.registry
        .add_successor(
            &f.store,
            &gone,
            successor("emp-4", ReadinessLevel::ReadyNow, 4.5, "high", 1),
            "vp",
        )
        .unwrap();
    f.registry
        .deactivate_critical_role(&f.store, &gone, "hr-admin")
        .unwrap();

    let analytics = f.aggregator.aggregate(&f.store, "acme").unwrap();

    assert_eq!(analytics.total_critical_roles, 2);
    assert_eq!(analytics.roles_with_ready_now, 1);
    assert!((analytics.ready_now_coverage_pct - 50.0).abs() < 1e-9);
    assert_eq!(
        analytics.risk_distribution,
        RiskDistribution {
            low: 1,
            medium: 1,
            ..RiskDistribution::default()
        }
    );
    assert_eq!(
        analytics.readiness_distribution,
        ReadinessDistribution {
            ready_now: 1,
            ready_1_year: 1,
            not_ready: 1,
            ..ReadinessDistribution::default()
        }
    );
    assert_eq!(
        analytics.talent_distribution,
        TalentDistribution {
            star: 1,
            high_performer: 1,
            risk: 1,
            ..TalentDistribution::default()
        }
    );
}

#[test]
fn coverage_is_reported_to_one_decimal() {
    let f = fixture();
    let covered = make_role(&f, "acme");
    make_role(&f, "acme");
    make_role(&f, "acme");
    f.registry
        .add_successor(
            &f.store,
            &covered,
            successor("emp-1", ReadinessLevel::ReadyNow, 4.0, "high", 1),
            "vp",
        )
        .unwrap();

    let analytics = f.aggregator.aggregate(&f.store, "acme").unwrap();
    assert!(
        (analytics.ready_now_coverage_pct - 33.3).abs() < 1e-9,
        "1 of 3 roles covered reads 33.3, got {}",
        analytics.ready_now_coverage_pct
    );
}

#[test]
fn plan_health_judges_active_plans_only() {
    let f = fixture();
    make_plan(&f, "emp-1", 75); // active, on track
    let middling = make_plan(&f, "emp-2", 40); // active, neither band
    f.tracker
        .create_development_plan(
            &f.store,
            CreatePlanInput {
                company_id: "acme".into(),
                employee_id: "emp-3".into(),
                employee_name: "Employee emp-3".into(),
                target_role_id: "role-target".into(),
                actions: Vec::new(),
            },
            "vp",
        )
        .unwrap(); // stays draft

    let analytics = f.aggregator.aggregate(&f.store, "acme").unwrap();
    assert_eq!(
        analytics.plan_health,
        PlanHealth {
            total_plans: 3,
            active_plans: 2,
            on_track: 1,
            at_risk: 0,
        }
    );

    // Stalling the middling plan below the floor flips it to at-risk.
    f.tracker
        .update_action_progress(&f.store, &middling, "act-1", 10, None, None, "vp")
        .unwrap();
    let analytics = f.aggregator.aggregate(&f.store, "acme").unwrap();
    assert_eq!(analytics.plan_health.at_risk, 1);
    assert_eq!(analytics.plan_health.on_track, 1);
}

#[test]
fn empty_company_reads_all_zero() {
    let f = fixture();
    let analytics = f.aggregator.aggregate(&f.store, "nobody").unwrap();

    assert_eq!(analytics.total_critical_roles, 0);
    assert_eq!(analytics.roles_with_ready_now, 0);
    assert_eq!(analytics.ready_now_coverage_pct, 0.0);
    assert_eq!(analytics.risk_distribution, RiskDistribution::default());
    assert_eq!(analytics.talent_distribution, TalentDistribution::default());
    assert_eq!(
        analytics.readiness_distribution,
        ReadinessDistribution::default()
    );
    assert_eq!(analytics.plan_health, PlanHealth::default());
}

#[test]
fn companies_do_not_bleed_into_each_other() {
    let f = fixture();
    let ours = make_role(&f, "acme");
    f.registry
        .add_successor(
            &f.store,
            &ours,
            successor("emp-1", ReadinessLevel::ReadyNow, 4.0, "high", 1),
            "vp",
        )
        .unwrap();
    let theirs = make_role(&f, "globex");
    f.registry
        .add_successor(
            &f.store,
            &theirs,
            successor("emp-9", ReadinessLevel::ReadyNow, 4.0, "high", 1),
            "vp",
        )
        .unwrap();

    let acme = f.aggregator.aggregate(&f.store, "acme").unwrap();
    assert_eq!(acme.total_critical_roles, 1);
    assert_eq!(acme.readiness_distribution.ready_now, 1);

    let globex = f.aggregator.aggregate(&f.store, "globex").unwrap();
    assert_eq!(globex.total_critical_roles, 1);
}
