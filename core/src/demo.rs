//! Deterministic demo company generation using curated pools.
//!
//! Same seed = same company. Every record is created strictly through
//! the public service APIs, so the seeded data exercises the same code
//! paths real callers do. Powers the runner binary and integration
//! tests that need a populated store without hand-building records.

use crate::{
    clock::EngineClock,
    config::EngineConfig,
    development_tracker::{ActionInput, ActionStatus, CreatePlanInput, DevelopmentTracker},
    error::EngineResult,
    plan_compiler::{CompilePlanInput, SuccessionPlanCompiler},
    pool_manager::{AddMemberInput, CreatePoolInput, PoolManager, ReviewCycle},
    role_registry::{CreateRoleInput, RoleRegistry, SuccessorInput},
    scoring::{self, CriticalityFactor, ReadinessAssessment, ReadinessLevel},
    store::DocStore,
    types::EntityId,
};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A single deterministic RNG stream for the seeder.
pub struct SeedRng {
    inner: Pcg64Mcg,
}

impl SeedRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    pub fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }
}

// ── Curated pools ────────────────────────────────────────────────────────────

const FIRST_NAMES: &[&str] = &[
    "Imogen", "Theo", "Priya", "Marcus", "Lena", "Dmitri", "Aisha", "Callum", "Noor", "Felix",
    "Ingrid", "Rafael", "Mei", "Stefan", "Amara", "Jonas", "Yuki", "Tomas", "Zara", "Elias",
    "Freya", "Omar", "Carmen", "Viktor", "Leila", "Magnus", "Sofia", "Andrei", "Tara", "Ruben",
    "Anika", "Declan", "Rosa", "Henrik", "Naomi", "Pablo", "Esther", "Lukas", "Farah", "Cormac",
];

const LAST_NAMES: &[&str] = &[
    "Ashworth", "Beaumont", "Calloway", "Drummond", "Eriksen", "Fontaine", "Granger", "Holloway",
    "Ivanova", "Jansen", "Kowalski", "Lindqvist", "Moreau", "Nakamura", "Okafor", "Pemberton",
    "Quintero", "Rostova", "Santiago", "Thackeray", "Ulrich", "Vasquez", "Whitfield", "Yamada",
    "Zielinski", "Abernathy", "Bergstrom", "Castellano", "Donohue", "Eastwood", "Farrell",
    "Galloway", "Hartmann", "Ibrahim", "Jorgensen", "Kavanagh", "Larsson", "Mendelsohn",
    "Novak", "Oyelaran",
];

const DEPARTMENTS: &[&str] = &[
    "Engineering", "Finance", "Operations", "Sales", "Marketing", "Product", "Legal",
    "Human Resources",
];

const TITLE_PREFIXES: &[&str] = &["Head of", "VP of", "Director of", "Senior Director of"];

const CANDIDATE_POSITIONS: &[&str] = &[
    "Senior Manager",
    "Principal Specialist",
    "Regional Lead",
    "Deputy Director",
    "Staff Lead",
    "Program Manager",
];

const POTENTIAL_TIERS: &[&str] = &["high", "medium", "low"];

const ACTION_TYPES: &[&str] = &[
    "mentoring",
    "training",
    "stretch_assignment",
    "executive_coaching",
    "rotation",
];

const ACTION_TITLES: &[&str] = &[
    "Shadow the incumbent for one quarter",
    "Lead the annual planning cycle",
    "Complete the leadership intensive",
    "Run the cross-regional task force",
    "Own a board-level presentation",
    "Rotate through a partner function",
];

/// Weights sum to 100 by construction.
const FACTOR_WEIGHTS: &[(&str, f64)] = &[
    ("revenue_impact", 30.0),
    ("operational_continuity", 30.0),
    ("specialized_knowledge", 20.0),
    ("market_scarcity", 20.0),
];

// ── Seeder ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub company_id: String,
    pub seed: u64,
    pub roles: usize,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            company_id: "demo-co".to_string(),
            seed: 42,
            roles: 12,
        }
    }
}

/// What the seeder built, for the runner's summary block and for tests.
#[derive(Debug, Clone)]
pub struct DemoSummary {
    pub company_id: String,
    pub roles_created: u32,
    pub roles_deactivated: u32,
    pub successors_added: u32,
    pub plans_created: u32,
    pub pools_created: u32,
    pub compiled_plan_id: EntityId,
}

/// Seed a believable company: critical roles with factor lists and
/// ranked successor benches, development plans in mixed states, two
/// talent pools, and one compiled succession plan over all roles.
pub fn seed_company(
    store: &DocStore,
    config: &EngineConfig,
    options: &DemoOptions,
) -> EngineResult<DemoSummary> {
    const ACTOR: &str = "demo-seeder";
    let clock = EngineClock::default();
    let registry = RoleRegistry::new(config, clock.clone());
    let tracker = DevelopmentTracker::new(clock.clone());
    let pools = PoolManager::new(clock.clone());
    let compiler = SuccessionPlanCompiler::new(clock);
    let mut rng = SeedRng::new(options.seed);

    let mut role_ids: Vec<EntityId> = Vec::with_capacity(options.roles);
    let mut bench: Vec<AddMemberInput> = Vec::new();
    let mut employee_counter = 0u32;
    let mut summary = DemoSummary {
        company_id: options.company_id.clone(),
        roles_created: 0,
        roles_deactivated: 0,
        successors_added: 0,
        plans_created: 0,
        pools_created: 0,
        compiled_plan_id: String::new(),
    };

    for _ in 0..options.roles {
        let department = rng.pick(DEPARTMENTS).to_string();
        let title = format!("{} {}", rng.pick(TITLE_PREFIXES), department);
        let factors = FACTOR_WEIGHTS
            .iter()
            .map(|(factor, weight)| CriticalityFactor {
                factor: (*factor).to_string(),
                score: (2 + rng.below(4)) as f64,
                weight: *weight,
            })
            .collect();
        let role = registry.create_critical_role(
            store,
            CreateRoleInput {
                company_id: options.company_id.clone(),
                position_id: format!("pos-{:03}", summary.roles_created + 1),
                position_title: title,
                department: department.clone(),
                criticality_factors: factors,
            },
            ACTOR,
        )?;
        summary.roles_created += 1;
        role_ids.push(role.role_id.clone());

        let successor_count = rng.below(4);
        for rank in 0..successor_count {
            employee_counter += 1;
            let employee_id = format!("emp-{employee_counter:04}");
            let name = format!("{} {}", rng.pick(FIRST_NAMES), rng.pick(LAST_NAMES));
            let performance = ((2.0 + rng.next_f64() * 3.0) * 10.0).round() / 10.0;
            let potential = rng.pick(POTENTIAL_TIERS).to_string();
            let input = SuccessorInput {
                employee_id: employee_id.clone(),
                employee_name: name.clone(),
                current_position: rng.pick(CANDIDATE_POSITIONS).to_string(),
                current_department: department.clone(),
                readiness_level: pick_readiness(&mut rng),
                readiness_assessment: random_assessment(&mut rng),
                performance_rating: performance,
                potential_rating: potential.clone(),
                competency_gaps: Vec::new(),
                rank: rank as u32 + 1,
            };
            bench.push(AddMemberInput {
                employee_id,
                employee_name: name,
                current_position: input.current_position.clone(),
                nine_box_category: scoring::nine_box_category(performance, &potential),
                readiness_level: input.readiness_level,
            });
            let updated = registry.add_successor(store, &role.role_id, input, ACTOR)?;
            summary.successors_added += 1;

            // A not-yet-ready front-runner gets a development plan.
            if rank == 0 && updated.bench_strength == 0 && rng.chance(0.7) {
                let candidate = &updated.successors[0];
                let plan = tracker.create_development_plan(
                    store,
                    CreatePlanInput {
                        company_id: options.company_id.clone(),
                        employee_id: candidate.employee_id.clone(),
                        employee_name: candidate.employee_name.clone(),
                        target_role_id: role.role_id.clone(),
                        actions: (0..2 + rng.below(2))
                            .map(|_| ActionInput {
                                action_type: rng.pick(ACTION_TYPES).to_string(),
                                title: rng.pick(ACTION_TITLES).to_string(),
                                start_date: None,
                                due_date: None,
                                resources: Vec::new(),
                                cost: None,
                                expected_outcome: "Ready for the target role".to_string(),
                            })
                            .collect(),
                    },
                    ACTOR,
                )?;
                summary.plans_created += 1;
                if rng.chance(0.8) {
                    let progress = 20 + rng.below(70) as u32;
                    tracker.update_action_progress(
                        store,
                        &plan.plan_id,
                        "act-1",
                        progress,
                        Some(ActionStatus::InProgress),
                        None,
                        ACTOR,
                    )?;
                }
            }
        }

        // The occasional reorged-away role keeps soft deletion honest.
        if summary.roles_created > 1 && rng.chance(0.08) {
            registry.deactivate_critical_role(store, &role.role_id, ACTOR)?;
            summary.roles_deactivated += 1;
        }
    }

    let executive = pools.create_talent_pool(
        store,
        CreatePoolInput {
            company_id: options.company_id.clone(),
            pool_name: "Executive Bench".to_string(),
            pool_type: "executive".to_string(),
            review_cycle: ReviewCycle::Quarterly,
        },
        ACTOR,
    )?;
    let emerging = pools.create_talent_pool(
        store,
        CreatePoolInput {
            company_id: options.company_id.clone(),
            pool_name: "Emerging Leaders".to_string(),
            pool_type: "emerging_leaders".to_string(),
            review_cycle: ReviewCycle::SemiAnnual,
        },
        ACTOR,
    )?;
    summary.pools_created = 2;
    for (i, member) in bench.into_iter().enumerate() {
        let pool_id = if i % 2 == 0 {
            &executive.pool_id
        } else {
            &emerging.pool_id
        };
        pools.add_member(store, pool_id, member, ACTOR)?;
    }

    let compiled = compiler.compile_succession_plan(
        store,
        CompilePlanInput {
            company_id: options.company_id.clone(),
            plan_name: "Annual Succession Review".to_string(),
            role_ids: role_ids.clone(),
        },
        ACTOR,
    )?;
    summary.compiled_plan_id = compiled.plan_id;

    log::info!(
        "demo: seeded '{}' with {} roles, {} successors, {} plans (seed={})",
        summary.company_id,
        summary.roles_created,
        summary.successors_added,
        summary.plans_created,
        options.seed
    );
    Ok(summary)
}

fn pick_readiness(rng: &mut SeedRng) -> ReadinessLevel {
    let roll = rng.next_f64();
    if roll < 0.25 {
        ReadinessLevel::ReadyNow
    } else if roll < 0.50 {
        ReadinessLevel::Ready1Year
    } else if roll < 0.80 {
        ReadinessLevel::Ready2To3Years
    } else {
        ReadinessLevel::NotReady
    }
}

fn random_assessment(rng: &mut SeedRng) -> ReadinessAssessment {
    let dim = |rng: &mut SeedRng| 40.0 + rng.below(56) as f64;
    ReadinessAssessment {
        leadership: dim(rng),
        technical: dim(rng),
        strategic_thinking: dim(rng),
        communication: dim(rng),
        cultural_fit: dim(rng),
        experience: dim(rng),
        regional_knowledge: if rng.chance(0.3) {
            Some(40.0 + rng.below(56) as f64)
        } else {
            None
        },
    }
}
