//! pipeline-runner: headless succession pipeline runner.
//!
//! Usage:
//!   pipeline-runner --seed 12345 --roles 20 --db talent.db
//!   pipeline-runner --db talent.db --company demo-co --report-only
//!   pipeline-runner --config engine.json --json

use anyhow::Result;
use std::env;
use succession_core::{
    analytics_aggregator::{AnalyticsAggregator, SuccessionAnalytics},
    clock::EngineClock,
    config::EngineConfig,
    demo::{self, DemoOptions},
    plan_compiler::{SuccessionPlanCompiler, SuccessionPlanRecord},
    store::DocStore,
};

#[derive(serde::Serialize)]
struct RunReport<'a> {
    analytics: &'a SuccessionAnalytics,
    succession_plan: Option<&'a SuccessionPlanRecord>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let roles = parse_arg(&args, "--roles", 12usize);
    let report_only = args.iter().any(|a| a == "--report-only");
    let json = args.iter().any(|a| a == "--json");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let company = args
        .windows(2)
        .find(|w| w[0] == "--company")
        .map(|w| w[1].as_str())
        .unwrap_or("demo-co");

    if !json {
        println!("pipeline-runner");
        println!("  company: {company}");
        println!("  seed:    {seed}");
        println!("  roles:   {roles}");
        println!("  db:      {db}");
        println!("  at:      {}", chrono::Utc::now().format("%Y-%m-%d %H:%M UTC"));
        println!();
    }

    // For :memory: use a SQLite shared-memory URI so a reopened handle
    // would still see the same database.
    let db_effective: String = if db == ":memory:" {
        format!("file:pipeline_{}?mode=memory&cache=shared", epoch_secs())
    } else {
        db.to_string()
    };
    let store = DocStore::open(&db_effective)?;
    store.migrate()?;

    let config = match args.windows(2).find(|w| w[0] == "--config") {
        Some(w) => EngineConfig::load(&w[1])?,
        None => EngineConfig::default(),
    };

    if !report_only {
        let options = DemoOptions {
            company_id: company.to_string(),
            seed,
            roles,
        };
        let seeded = demo::seed_company(&store, &config, &options)?;
        log::info!(
            "runner: seeded '{company}' with {} roles, {} successors, {} dev plans",
            seeded.roles_created,
            seeded.successors_added,
            seeded.plans_created
        );
    }

    let aggregator = AnalyticsAggregator::new(&config, EngineClock::default());
    let analytics = aggregator.aggregate(&store, company)?;
    log::info!(
        "runner: aggregated {} critical roles for '{company}'",
        analytics.total_critical_roles
    );

    let compiler = SuccessionPlanCompiler::new(EngineClock::default());
    let plans = compiler.list_succession_plans(&store, company)?;
    let latest_plan = plans.last();

    if json {
        let report = RunReport {
            analytics: &analytics,
            succession_plan: latest_plan,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&analytics, latest_plan);
    }
    Ok(())
}

fn print_summary(analytics: &SuccessionAnalytics, plan: Option<&SuccessionPlanRecord>) {
    println!("=== TALENT REVIEW: {} ===", analytics.company_id);
    println!("  critical roles:  {}", analytics.total_critical_roles);
    println!("  with ready-now:  {}", analytics.roles_with_ready_now);
    println!("  coverage:        {:.1}%", analytics.ready_now_coverage_pct);
    let r = &analytics.risk_distribution;
    println!(
        "  risk mix:        {} low / {} medium / {} high / {} critical",
        r.low, r.medium, r.high, r.critical
    );
    let b = &analytics.readiness_distribution;
    println!(
        "  bench readiness: {} now / {} in 1yr / {} in 2-3yr / {} not ready",
        b.ready_now, b.ready_1_year, b.ready_2_3_years, b.not_ready
    );
    let t = &analytics.talent_distribution;
    println!(
        "  nine-box (top):  {} star / {} high performer / {} high potential",
        t.star, t.high_performer, t.high_potential
    );
    println!(
        "  nine-box (rest): {} solid perf / {} core / {} solid contrib / {} rough / {} inconsistent / {} risk",
        t.solid_performer, t.core_player, t.solid_contributor, t.rough_diamond,
        t.inconsistent_player, t.risk
    );
    let p = &analytics.plan_health;
    println!(
        "  dev plans:       {} total / {} active / {} on track / {} at risk",
        p.total_plans, p.active_plans, p.on_track, p.at_risk
    );

    println!();
    println!("=== SUCCESSION PLAN ===");
    match plan {
        None => println!("  (no compiled plan)"),
        Some(plan) => {
            println!("  plan:            {} [{}]", plan.plan_name, plan.status.as_str());
            println!("  compiled at:     {}", plan.compiled_at.format("%Y-%m-%d %H:%M UTC"));
            let roll = &plan.rollup;
            println!("  roles compiled:  {}", roll.total_critical_roles);
            println!("  with successors: {}", roll.roles_with_successors);
            println!("  now-coverage:    {}%", roll.ready_now_coverage_pct);
            println!("  avg bench:       {:.1}", roll.average_bench_strength);
            println!("  high-risk roles: {}", roll.high_risk_roles);
        }
    }
}

/// Parse a `--flag value` pair. A missing flag silently takes the
/// default; a present-but-unparseable value is warned about first.
fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    match args.windows(2).find(|w| w[0] == flag) {
        None => default,
        Some(w) => match w[1].parse() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("runner: ignoring {flag} value '{}', using default", w[1]);
                default
            }
        },
    }
}

fn epoch_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
