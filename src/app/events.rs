//! Outbound controller events.
//!
//! The reconciler and the schedule service emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::app::ports::{DriverError, StoreError};
use crate::evaluator::OutputState;
use crate::schedule::ScheduleWindow;

/// Structured events emitted by the controller core.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// The reconciliation loop has started.
    Started {
        poll_interval_secs: u64,
        buffer_secs: u64,
    },

    /// The physical output changed level.  `from` is `None` on the first
    /// assertion after startup.
    OutputChanged {
        from: Option<OutputState>,
        to: OutputState,
    },

    /// A new window was committed to the store.
    ScheduleUpdated(ScheduleWindow),

    /// The store could not be read this cycle; the output fell back to OFF.
    StoreFallback(StoreError),

    /// The driver rejected a level change; retried on the next poll.
    DriverFault(DriverError),

    /// The loop has stopped and the output was released.
    Stopped { polls: u64 },
}
