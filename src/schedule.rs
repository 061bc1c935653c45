//! The persisted ON/OFF window and its text record.
//!
//! A schedule is a pair of wall-clock times of day at whole-minute
//! resolution.  On disk it is a single human-diffable line:
//!
//! ```text
//! 08:00,20:00
//! ```
//!
//! Both halves are always present together.  "No schedule" is modelled as
//! `Option<ScheduleWindow>::None`, never as a half-filled window.

use core::fmt::{self, Write};

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Text encoding of a single time of day (`HH:MM`).
pub const TIME_FORMAT: &str = "%H:%M";

/// Longest record we ever emit: `HH:MM,HH:MM\n`.
pub const RECORD_CAPACITY: usize = 16;

// ───────────────────────────────────────────────────────────────
// Validation errors
// ───────────────────────────────────────────────────────────────

/// Why a proposed schedule was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// A time field is not a valid `HH:MM` value.  Carries the field name.
    Malformed(&'static str),
    /// A time carries seconds; schedules are whole minutes.
    NotWholeMinute(&'static str),
    /// ON and OFF are the same instant.
    EmptyWindow,
    /// ON is after OFF.  Windows spanning midnight are not supported.
    WrappingWindow,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(field) => write!(f, "{field} must be a time in HH:MM form"),
            Self::NotWholeMinute(field) => write!(f, "{field} must be a whole minute"),
            Self::EmptyWindow => write!(f, "on and off times must differ"),
            Self::WrappingWindow => {
                write!(f, "on time must be earlier than off time (no overnight windows)")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

// ───────────────────────────────────────────────────────────────
// ScheduleWindow
// ───────────────────────────────────────────────────────────────

/// A validated, non-wrapping daily window.
///
/// Fields are private so the `on < off` invariant cannot be bypassed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWindow", into = "RawWindow")]
pub struct ScheduleWindow {
    on_time: NaiveTime,
    off_time: NaiveTime,
}

impl ScheduleWindow {
    pub fn new(on_time: NaiveTime, off_time: NaiveTime) -> Result<Self, ValidationError> {
        if on_time.second() != 0 || on_time.nanosecond() != 0 {
            return Err(ValidationError::NotWholeMinute("on time"));
        }
        if off_time.second() != 0 || off_time.nanosecond() != 0 {
            return Err(ValidationError::NotWholeMinute("off time"));
        }
        if on_time == off_time {
            return Err(ValidationError::EmptyWindow);
        }
        if on_time > off_time {
            return Err(ValidationError::WrappingWindow);
        }
        Ok(Self { on_time, off_time })
    }

    /// Build a window from two `HH:MM` strings, as typed by an operator.
    pub fn parse(on: &str, off: &str) -> Result<Self, ValidationError> {
        let on_time = parse_time(on, "on time")?;
        let off_time = parse_time(off, "off time")?;
        Self::new(on_time, off_time)
    }

    pub fn on_time(&self) -> NaiveTime {
        self.on_time
    }

    pub fn off_time(&self) -> NaiveTime {
        self.off_time
    }

    /// Encode as the persisted `HH:MM,HH:MM` record (no trailing newline).
    pub fn to_record(&self) -> heapless::String<RECORD_CAPACITY> {
        let mut s = heapless::String::new();
        // Cannot overflow: 11 bytes into a 16-byte buffer.
        let _ = write!(
            s,
            "{},{}",
            self.on_time.format(TIME_FORMAT),
            self.off_time.format(TIME_FORMAT)
        );
        s
    }

    /// Decode a persisted record.
    ///
    /// Returns `Ok(None)` for an empty record (a file that exists but was
    /// never filled in), matching the "unconfigured" meaning of a missing
    /// file.
    pub fn from_record(record: &str) -> Result<Option<Self>, ValidationError> {
        let record = record.trim();
        if record.is_empty() {
            return Ok(None);
        }
        let (on, off) = record
            .split_once(',')
            .ok_or(ValidationError::Malformed("schedule record"))?;
        Self::parse(on, off).map(Some)
    }
}

impl fmt::Display for ScheduleWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.on_time.format(TIME_FORMAT),
            self.off_time.format(TIME_FORMAT)
        )
    }
}

/// Parse one `HH:MM` field.  Surrounding whitespace is tolerated; anything
/// else (seconds, 24:00, single-digit minutes) is rejected.
pub fn parse_time(s: &str, field: &'static str) -> Result<NaiveTime, ValidationError> {
    let s = s.trim();
    let (h, m) = s.split_once(':').ok_or(ValidationError::Malformed(field))?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return Err(ValidationError::Malformed(field));
    }
    if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::Malformed(field));
    }
    let hour: u32 = h.parse().map_err(|_| ValidationError::Malformed(field))?;
    let minute: u32 = m.parse().map_err(|_| ValidationError::Malformed(field))?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or(ValidationError::Malformed(field))
}

// ── serde shape ───────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct RawWindow {
    on: String,
    off: String,
}

impl TryFrom<RawWindow> for ScheduleWindow {
    type Error = ValidationError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        Self::parse(&raw.on, &raw.off)
    }
}

impl From<ScheduleWindow> for RawWindow {
    fn from(w: ScheduleWindow) -> Self {
        Self {
            on: w.on_time.format(TIME_FORMAT).to_string(),
            off: w.off_time.format(TIME_FORMAT).to_string(),
        }
    }
}
