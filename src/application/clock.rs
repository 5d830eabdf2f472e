//! Time source injected into components whose behaviour depends on elapsed time.

use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use time::OffsetDateTime;

pub trait Clock: Send + Sync {
    /// Monotonic time used for freshness checks.
    fn now(&self) -> Instant;

    /// Wall-clock time stamped onto records.
    fn now_utc(&self) -> OffsetDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn now_utc(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    state: Mutex<(Instant, OffsetDateTime)>,
}

impl ManualClock {
    pub fn new(wall: OffsetDateTime) -> Self {
        Self {
            state: Mutex::new((Instant::now(), wall)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.0 += by;
        state.1 += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).0
    }

    fn now_utc(&self) -> OffsetDateTime {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).1
    }
}
