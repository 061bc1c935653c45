//! Mock hardware adapters for integration tests.
//!
//! Every mock keeps its history behind an `Arc` so a test can keep a probe
//! while the adapter itself moves onto the reconcile thread.

use std::sync::{Arc, Mutex};

use chrono::NaiveTime;
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

use lightwindow::app::events::ControllerEvent;
use lightwindow::app::ports::{Clock, EventSink, ScheduleStore, StoreError};
use lightwindow::schedule::ScheduleWindow;

pub fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, s).unwrap()
}

// ── MockPin ───────────────────────────────────────────────────

#[derive(Debug, Default)]
struct PinInner {
    levels: Vec<bool>,
    failures_left: u32,
}

/// Relay pin that records every level written to it.
#[derive(Clone, Default)]
pub struct MockPin {
    inner: Arc<Mutex<PinInner>>,
}

#[allow(dead_code)]
impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next `n` writes with `ErrorKind::Other`.
    pub fn fail_next(&self, n: u32) {
        self.inner.lock().unwrap().failures_left = n;
    }

    /// Every level successfully written, oldest first.
    pub fn levels(&self) -> Vec<bool> {
        self.inner.lock().unwrap().levels.clone()
    }

    pub fn is_high(&self) -> bool {
        self.levels().last().copied().unwrap_or(false)
    }

    fn write(&mut self, high: bool) -> Result<(), ErrorKind> {
        let mut inner = self.inner.lock().unwrap();
        if inner.failures_left > 0 {
            inner.failures_left -= 1;
            return Err(ErrorKind::Other);
        }
        inner.levels.push(high);
        Ok(())
    }
}

impl ErrorType for MockPin {
    type Error = ErrorKind;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}

// ── MockClock ─────────────────────────────────────────────────

/// Wall clock the test can move while the loop is running.
#[derive(Clone)]
pub struct MockClock {
    now: Arc<Mutex<NaiveTime>>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn at(now: NaiveTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: NaiveTime) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for MockClock {
    fn now(&self) -> NaiveTime {
        *self.now.lock().unwrap()
    }
}

// ── FailingStore ──────────────────────────────────────────────

/// Store whose saves are refused; loads report a corrupted record.
pub struct FailingStore;

impl ScheduleStore for FailingStore {
    fn save(&self, _window: &ScheduleWindow) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::ErrorKind::PermissionDenied))
    }

    fn load(&self) -> Result<Option<ScheduleWindow>, StoreError> {
        Err(StoreError::Corrupted("mock"))
    }
}

// ── RecordingSink ─────────────────────────────────────────────

/// Event sink shared between the test and the loop thread.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<ControllerEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ControllerEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&ControllerEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &ControllerEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
