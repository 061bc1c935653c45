//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured controller events to the
//! `log` facade, one tagged line per event.

use log::{info, warn};

use crate::app::events::ControllerEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`ControllerEvent`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &ControllerEvent) {
        match event {
            ControllerEvent::Started {
                poll_interval_secs,
                buffer_secs,
            } => {
                info!(
                    "START | poll={}s buffer={}s",
                    poll_interval_secs, buffer_secs
                );
            }
            ControllerEvent::OutputChanged { from: None, to } => {
                info!("OUTPUT | initial -> {}", to);
            }
            ControllerEvent::OutputChanged { from: Some(from), to } => {
                info!("OUTPUT | {} -> {}", from, to);
            }
            ControllerEvent::ScheduleUpdated(window) => {
                info!("SCHED | window={}", window);
            }
            ControllerEvent::StoreFallback(e) => {
                warn!("FAULT | store: {} (fail-safe OFF)", e);
            }
            ControllerEvent::DriverFault(e) => {
                warn!("FAULT | driver: {}", e);
            }
            ControllerEvent::Stopped { polls } => {
                info!("STOP | after {} polls, output released", polls);
            }
        }
    }
}
