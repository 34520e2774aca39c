//! Engine clock: the single source of wall-clock time.
//!
//! RULE: Services never call `Utc::now()` directly. All timestamps flow
//! through the `EngineClock` handed to each service, so tests can pin a
//! fixed instant and assert exact review dates.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub enum EngineClock {
    /// Real wall-clock time. What production callers use.
    Wall,
    /// A frozen instant. What tests use.
    Fixed(DateTime<Utc>),
}

impl EngineClock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            EngineClock::Wall => Utc::now(),
            EngineClock::Fixed(instant) => *instant,
        }
    }

    /// Convenience constructor for tests: a fixed clock at the given
    /// RFC 3339 instant. Panics on an unparseable literal.
    pub fn fixed_at(rfc3339: &str) -> Self {
        let instant = DateTime::parse_from_rfc3339(rfc3339)
            .unwrap_or_else(|e| panic!("bad fixed clock literal '{rfc3339}': {e}"))
            .with_timezone(&Utc);
        EngineClock::Fixed(instant)
    }
}

impl Default for EngineClock {
    fn default() -> Self {
        EngineClock::Wall
    }
}
