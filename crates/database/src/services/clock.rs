use chrono::Utc;
use sea_orm::prelude::DateTime;

/// Source of "now" for every temporal rule in the services. Injected so
/// tests control time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime;
}

/// Wall-clock time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime {
        Utc::now().naive_utc()
    }
}

/// Always reports the instant it was built with.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime);

impl Clock for FixedClock {
    fn now(&self) -> DateTime {
        self.0
    }
}
