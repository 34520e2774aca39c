//! Succession planning engine: a registry of critical roles with ranked
//! successor benches, development plan tracking, talent pools, compiled
//! succession plans, and company-wide analytics.
//!
//! Layering rule: services own the domain semantics, `scoring` owns
//! every derived number, and only `store` talks to the database.

pub mod analytics_aggregator;
pub mod clock;
pub mod config;
pub mod demo;
pub mod development_tracker;
pub mod error;
pub mod plan_compiler;
pub mod pool_manager;
pub mod role_registry;
pub mod scoring;
pub mod store;
pub mod types;
