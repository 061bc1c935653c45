//! Wall-clock adapter.
//!
//! Reads the local time of day from the host clock.  Timezone handling is
//! whatever the host is configured with.

use chrono::{Local, NaiveTime};

use crate::app::ports::Clock;

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl LocalClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for LocalClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// A clock pinned to one instant, for dry runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}
