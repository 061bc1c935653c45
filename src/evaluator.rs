//! Window evaluator — pure decision logic, zero I/O.
//!
//! Given the current time of day, the persisted window and the tolerance
//! buffer, decide whether the light should be on.
//!
//! ```text
//!          on_edge            on_time            off_time           off_edge
//!  ─────────┼──────buffer───────┼───── window ──────┼──────buffer───────┼─────────
//!    OFF    │◀──────────────────────────── ON ────────────────────────▶│   OFF
//! ```
//!
//! Evaluation runs at whole-second granularity: `now` is truncated to the
//! second and the buffer is applied in whole seconds.  Edges are clamped to
//! the day; nothing wraps past midnight.

use core::fmt;
use core::time::Duration;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::schedule::ScheduleWindow;

/// Last second of the day, as seconds since midnight.
const LAST_SECOND: u32 = 86_399;

/// The two physical output levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputState {
    Off,
    On,
}

impl OutputState {
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    /// Numeric level as reported to status consumers (0 = off, 1 = on).
    pub fn level(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::On => 1,
        }
    }
}

impl fmt::Display for OutputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "OFF"),
            Self::On => write!(f, "ON"),
        }
    }
}

/// The buffered window, in seconds since midnight (inclusive on both ends).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edges {
    pub on_edge: u32,
    pub off_edge: u32,
}

impl Edges {
    pub fn new(window: &ScheduleWindow, buffer: Duration) -> Self {
        let buffer_secs = u32::try_from(buffer.as_secs()).unwrap_or(u32::MAX);
        let on = window.on_time().num_seconds_from_midnight();
        let off = window.off_time().num_seconds_from_midnight();
        Self {
            on_edge: on.saturating_sub(buffer_secs),
            off_edge: off.saturating_add(buffer_secs).min(LAST_SECOND),
        }
    }

    pub fn contains(&self, now: NaiveTime) -> bool {
        let now = now.num_seconds_from_midnight();
        self.on_edge <= now && now <= self.off_edge
    }

    /// Edges rendered back as times of day.
    pub fn as_times(&self) -> (NaiveTime, NaiveTime) {
        (seconds_to_time(self.on_edge), seconds_to_time(self.off_edge))
    }
}

fn seconds_to_time(secs: u32) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(secs.min(LAST_SECOND), 0)
        .unwrap_or(NaiveTime::MIN)
}

/// Decide the output level for `now`.
///
/// No window → [`OutputState::Off`] (fail-safe default).
pub fn desired_state(
    now: NaiveTime,
    window: Option<&ScheduleWindow>,
    buffer: Duration,
) -> OutputState {
    match window {
        Some(w) if Edges::new(w, buffer).contains(now) => OutputState::On,
        _ => OutputState::Off,
    }
}
