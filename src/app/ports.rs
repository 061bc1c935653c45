//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Reconciler / ScheduleService (domain)
//! ```
//!
//! Driven adapters (schedule storage, the relay, the wall clock, event
//! sinks) implement these traits.  The domain consumes them via generics,
//! so the evaluator and the loop never touch hardware or the filesystem
//! directly.
//!
//! ## Contract notes
//!
//! - **ScheduleStore** writes MUST be atomic: a concurrent `load` sees
//!   either the previous record or the new one.
//! - **OutputPort** MUST be idempotent: asserting the current state again
//!   performs no physical write.

use core::fmt;

use chrono::NaiveTime;

use crate::evaluator::OutputState;
use crate::schedule::ScheduleWindow;

// ───────────────────────────────────────────────────────────────
// Schedule store port (driven adapter: domain ↔ durable record)
// ───────────────────────────────────────────────────────────────

/// Durable home of the single [`ScheduleWindow`].
///
/// Shared between the reconciliation thread and any number of mutation
/// callers, hence `&self` receivers and the `Send + Sync` bound.
pub trait ScheduleStore: Send + Sync {
    /// Atomically replace the stored window.
    fn save(&self, window: &ScheduleWindow) -> Result<(), StoreError>;

    /// Read the stored window.
    ///
    /// `Ok(None)` means nothing was ever saved.  A record that exists but
    /// cannot be decoded is [`StoreError::Corrupted`]; the caller picks
    /// the fallback.
    fn load(&self) -> Result<Option<ScheduleWindow>, StoreError>;
}

impl<T: ScheduleStore + ?Sized> ScheduleStore for std::sync::Arc<T> {
    fn save(&self, window: &ScheduleWindow) -> Result<(), StoreError> {
        (**self).save(window)
    }

    fn load(&self) -> Result<Option<ScheduleWindow>, StoreError> {
        (**self).load()
    }
}

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → relay)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the single switched output.
pub trait OutputPort {
    /// Drive the output to `state`.  Repeating the current state is a no-op.
    fn set_state(&mut self, state: OutputState) -> Result<(), DriverError>;

    /// Last state successfully asserted, `None` before the first write.
    fn state(&self) -> Option<OutputState>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Local wall-clock time of day.
pub trait Clock {
    fn now(&self) -> NaiveTime;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`ControllerEvent`](super::events::ControllerEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::ControllerEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ScheduleStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// The record could not be read or written.
    Io(std::io::ErrorKind),
    /// The record exists but does not decode to a valid window.
    Corrupted(&'static str),
}

/// Errors from [`OutputPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// The pin refused the level change.
    PinWrite(embedded_hal::digital::ErrorKind),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(kind) => write!(f, "schedule store I/O error: {}", kind),
            Self::Corrupted(why) => write!(f, "schedule record corrupted: {}", why),
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinWrite(kind) => write!(f, "relay pin write failed: {}", kind),
        }
    }
}

impl std::error::Error for StoreError {}
impl std::error::Error for DriverError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.kind())
    }
}
