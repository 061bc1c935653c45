//! Schedule mutation API and the collaborator-facing controller facade.
//!
//! [`ScheduleService`] is the only writer of the schedule store.  It
//! validates operator input and commits it under a lock so concurrent
//! callers never interleave their saves.
//!
//! [`Controller`] bundles the service with the output snapshot published
//! by the reconciliation loop.  It is everything an outer UI layer needs:
//!
//! ```text
//!   UI / CLI ──▶ Controller ──▶ ScheduleService ──▶ ScheduleStore
//!                    │
//!                    └──────▶ OutputStatus ◀── Reconciler (publishes)
//! ```

use core::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use log::{info, warn};
use serde::Serialize;

use crate::evaluator::OutputState;
use crate::reconciler::OutputStatus;
use crate::schedule::{ScheduleWindow, ValidationError};

use super::events::ControllerEvent;
use super::ports::{EventSink, ScheduleStore, StoreError};

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

/// Failure of a schedule mutation, surfaced synchronously to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    /// Input rejected before anything was persisted.
    Validation(ValidationError),
    /// The store refused the write; the previous schedule is still in effect.
    Store(StoreError),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "invalid schedule: {e}"),
            Self::Store(e) => write!(f, "could not save schedule: {e}"),
        }
    }
}

impl std::error::Error for ScheduleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Store(e) => Some(e),
        }
    }
}

impl From<ValidationError> for ScheduleError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<StoreError> for ScheduleError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

// ───────────────────────────────────────────────────────────────
// ScheduleService
// ───────────────────────────────────────────────────────────────

/// Validating, serializing front door to the schedule store.
pub struct ScheduleService<S> {
    store: S,
    commit: Mutex<()>,
}

impl<S: ScheduleStore> ScheduleService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            commit: Mutex::new(()),
        }
    }

    /// Validate two `HH:MM` strings and commit them as the new window.
    pub fn set_schedule(
        &self,
        on: &str,
        off: &str,
        sink: &mut impl EventSink,
    ) -> Result<ScheduleWindow, ScheduleError> {
        let window = ScheduleWindow::parse(on, off).inspect_err(|e| {
            warn!("Schedule rejected ({on}, {off}): {e}");
        })?;
        self.set_window(window, sink)?;
        Ok(window)
    }

    /// Commit an already-validated window.
    pub fn set_window(
        &self,
        window: ScheduleWindow,
        sink: &mut impl EventSink,
    ) -> Result<(), ScheduleError> {
        {
            // A poisoned lock only means another committer panicked; the
            // store itself is still consistent, so keep going.
            let _guard = self.commit.lock().unwrap_or_else(PoisonError::into_inner);
            self.store.save(&window).inspect_err(|e| {
                warn!("Schedule save failed: {e}");
            })?;
        }
        info!("Schedule committed: {window}");
        sink.emit(&ControllerEvent::ScheduleUpdated(window));
        Ok(())
    }

    /// Most recently committed window.
    pub fn schedule(&self) -> Result<Option<ScheduleWindow>, StoreError> {
        self.store.load()
    }

    /// The underlying store (the reconciler reads through this).
    pub fn store(&self) -> &S {
        &self.store
    }
}

// ───────────────────────────────────────────────────────────────
// Controller facade
// ───────────────────────────────────────────────────────────────

/// Light-state snapshot for status consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LightStatus {
    /// 1 when the output is on, 0 otherwise (including "not yet driven").
    pub light_state: u8,
    /// Exact output state, `None` before the loop's first assertion.
    pub output: Option<OutputState>,
    /// Currently committed window, `None` if unconfigured or unreadable.
    pub schedule: Option<ScheduleWindow>,
}

impl LightStatus {
    pub fn new(output: Option<OutputState>, schedule: Option<ScheduleWindow>) -> Self {
        Self {
            light_state: output.map_or(0, OutputState::level),
            output,
            schedule,
        }
    }
}

/// The touchpoints an outer UI/auth layer needs against the core.
pub struct Controller<S> {
    schedules: Arc<ScheduleService<S>>,
    output: Arc<OutputStatus>,
}

impl<S> Clone for Controller<S> {
    fn clone(&self) -> Self {
        Self {
            schedules: Arc::clone(&self.schedules),
            output: Arc::clone(&self.output),
        }
    }
}

impl<S: ScheduleStore> Controller<S> {
    pub fn new(schedules: Arc<ScheduleService<S>>, output: Arc<OutputStatus>) -> Self {
        Self { schedules, output }
    }

    pub fn set_schedule(
        &self,
        on: &str,
        off: &str,
        sink: &mut impl EventSink,
    ) -> Result<ScheduleWindow, ScheduleError> {
        self.schedules.set_schedule(on, off, sink)
    }

    /// Committed window; an unreadable store reads as unconfigured.
    pub fn get_schedule(&self) -> Option<ScheduleWindow> {
        self.schedules.schedule().unwrap_or_else(|e| {
            warn!("Schedule read failed ({e}), reporting as unconfigured");
            None
        })
    }

    /// Level most recently asserted by the reconciliation loop.
    pub fn current_output_state(&self) -> Option<OutputState> {
        self.output.get()
    }

    pub fn status(&self) -> LightStatus {
        LightStatus::new(self.current_output_state(), self.get_schedule())
    }
}
