//! Reconciliation loop.
//!
//! Keeps the relay consistent with the persisted schedule.  Every tick it
//! reloads the window from the store, asks the evaluator for the desired
//! level and asserts it on the output port.
//!
//! ```text
//!            timer tick                     poll done
//!   ┌──────┐ ─────────▶ ┌────────────┐ ───────────────┐
//!   │ Idle │            │ Evaluating │                │
//!   └──────┘ ◀───────── └────────────┘ ◀──────────────┘
//!      │                   load → evaluate → apply
//!      │ shutdown
//!      ▼
//!   output OFF, driver handed back
//! ```
//!
//! Failures never stop the loop.  An unreadable store counts as "no
//! schedule" for that cycle (fail-safe OFF); a driver error is reported and
//! the next poll asserts the level again.
//!
//! The loop runs on its own thread.  `futures_lite::future::block_on` drives
//! it, the `async-io-mini` reactor supplies the tick timer, and an
//! `embassy-sync` [`Signal`] carries shutdown requests in from any thread.

use core::sync::atomic::{AtomicU8, Ordering};
use core::time::Duration;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use futures_lite::future;
use log::{debug, info};

use crate::app::events::ControllerEvent;
use crate::app::ports::{Clock, EventSink, OutputPort, ScheduleStore};
use crate::config::ControllerConfig;
use crate::evaluator::{OutputState, desired_state};
use crate::schedule::ScheduleWindow;

/// Cross-thread shutdown request for a running loop.
pub type ShutdownSignal = Signal<CriticalSectionRawMutex, ()>;

// ═══════════════════════════════════════════════════════════════
//  Published output snapshot
// ═══════════════════════════════════════════════════════════════

const STATUS_UNKNOWN: u8 = 0;
const STATUS_OFF: u8 = 1;
const STATUS_ON: u8 = 2;

/// Last level the loop asserted, readable from any thread.
///
/// Written only by the reconciler.  Readers get a snapshot, never a handle
/// to the driver.
#[derive(Debug)]
pub struct OutputStatus(AtomicU8);

impl OutputStatus {
    pub const fn new() -> Self {
        Self(AtomicU8::new(STATUS_UNKNOWN))
    }

    pub fn publish(&self, state: OutputState) {
        let raw = match state {
            OutputState::Off => STATUS_OFF,
            OutputState::On => STATUS_ON,
        };
        self.0.store(raw, Ordering::Release);
    }

    /// Mark the physical level as unknown (after a failed write).
    pub fn invalidate(&self) {
        self.0.store(STATUS_UNKNOWN, Ordering::Release);
    }

    pub fn get(&self) -> Option<OutputState> {
        match self.0.load(Ordering::Acquire) {
            STATUS_OFF => Some(OutputState::Off),
            STATUS_ON => Some(OutputState::On),
            _ => None,
        }
    }
}

impl Default for OutputStatus {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Reconciler
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Evaluating,
}

/// What one poll saw and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    /// Window in effect for this poll (`None` if unconfigured or unreadable).
    pub schedule: Option<ScheduleWindow>,
    /// Level the evaluator asked for.
    pub desired: OutputState,
    /// The store could not be read and the fail-safe default was used.
    pub store_fallback: bool,
    /// The driver accepted the level.
    pub applied: bool,
}

enum Wake {
    Tick,
    Shutdown,
}

pub struct Reconciler<S, O, C> {
    store: S,
    output: O,
    clock: C,
    interval: Duration,
    buffer: Duration,
    state: LoopState,
    polls: u64,
    status: Arc<OutputStatus>,
}

impl<S, O, C> Reconciler<S, O, C>
where
    S: ScheduleStore,
    O: OutputPort,
    C: Clock,
{
    pub fn new(store: S, output: O, clock: C, config: &ControllerConfig) -> Self {
        Self::with_timing(store, output, clock, config.poll_interval(), config.buffer())
    }

    pub fn with_timing(store: S, output: O, clock: C, interval: Duration, buffer: Duration) -> Self {
        Self {
            store,
            output,
            clock,
            interval,
            buffer,
            state: LoopState::Idle,
            polls: 0,
            status: Arc::new(OutputStatus::new()),
        }
    }

    /// Shared snapshot of the asserted level, for the controller facade.
    pub fn status_handle(&self) -> Arc<OutputStatus> {
        Arc::clone(&self.status)
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Run one Idle → Evaluating → Idle cycle.
    pub fn poll_once(&mut self, sink: &mut impl EventSink) -> PollReport {
        self.state = LoopState::Evaluating;
        self.polls += 1;

        // 1. Load (fail-safe: unreadable == unconfigured, this cycle only)
        let (schedule, store_fallback) = match self.store.load() {
            Ok(window) => (window, false),
            Err(e) => {
                sink.emit(&ControllerEvent::StoreFallback(e));
                (None, true)
            }
        };

        // 2. Evaluate
        let now = self.clock.now();
        let desired = desired_state(now, schedule.as_ref(), self.buffer);
        debug!(
            "Poll #{}: now={} window={:?} -> {}",
            self.polls,
            now.format("%H:%M:%S"),
            schedule.map(|w| w.to_record()),
            desired
        );

        // 3. Apply
        let before = self.output.state();
        let applied = match self.output.set_state(desired) {
            Ok(()) => {
                if before != Some(desired) {
                    sink.emit(&ControllerEvent::OutputChanged {
                        from: before,
                        to: desired,
                    });
                }
                self.status.publish(desired);
                true
            }
            Err(e) => {
                sink.emit(&ControllerEvent::DriverFault(e));
                self.status.invalidate();
                false
            }
        };

        self.state = LoopState::Idle;
        PollReport {
            schedule,
            desired,
            store_fallback,
            applied,
        }
    }

    /// Poll immediately, then once per interval, until `shutdown` fires.
    ///
    /// Returns the output driver after switching it OFF.
    pub async fn run(mut self, shutdown: &ShutdownSignal, sink: &mut impl EventSink) -> O {
        sink.emit(&ControllerEvent::Started {
            poll_interval_secs: self.interval.as_secs(),
            buffer_secs: self.buffer.as_secs(),
        });

        let interval = self.interval;
        while !shutdown.signaled() {
            self.poll_once(sink);

            let wake = future::or(
                async {
                    shutdown.wait().await;
                    Wake::Shutdown
                },
                async {
                    async_io_mini::Timer::after(interval).await;
                    Wake::Tick
                },
            )
            .await;

            if let Wake::Shutdown = wake {
                break;
            }
        }

        self.finish(sink)
    }

    fn finish(mut self, sink: &mut impl EventSink) -> O {
        info!("Reconciler: shutting down after {} polls", self.polls);
        match self.output.set_state(OutputState::Off) {
            Ok(()) => self.status.publish(OutputState::Off),
            Err(e) => {
                sink.emit(&ControllerEvent::DriverFault(e));
                self.status.invalidate();
            }
        }
        sink.emit(&ControllerEvent::Stopped { polls: self.polls });
        self.output
    }
}

// ═══════════════════════════════════════════════════════════════
//  Thread spawn
// ═══════════════════════════════════════════════════════════════

/// Handle to a loop running on its own thread.
pub struct LoopHandle<O> {
    shutdown: Arc<ShutdownSignal>,
    thread: JoinHandle<O>,
}

impl<O> LoopHandle<O> {
    /// Signal usable from other threads (e.g. a termination handler).
    pub fn shutdown_signal(&self) -> Arc<ShutdownSignal> {
        Arc::clone(&self.shutdown)
    }

    /// Request shutdown and wait for the loop to hand the driver back.
    pub fn stop(self) -> thread::Result<O> {
        self.shutdown.signal(());
        self.thread.join()
    }

    /// Wait for the loop to end after shutdown was signalled elsewhere.
    pub fn join(self) -> thread::Result<O> {
        self.thread.join()
    }
}

/// Spawn `reconciler` on a dedicated `reconcile` thread.
pub fn spawn<S, O, C, E>(reconciler: Reconciler<S, O, C>, sink: E) -> std::io::Result<LoopHandle<O>>
where
    S: ScheduleStore + 'static,
    O: OutputPort + Send + 'static,
    C: Clock + Send + 'static,
    E: EventSink + Send + 'static,
{
    spawn_with_signal(reconciler, Arc::new(ShutdownSignal::new()), sink)
}

/// Spawn against a caller-owned `shutdown` signal.
///
/// Lets termination handlers be installed before the loop exists; a signal
/// raised before the thread starts stops it without a single poll.
pub fn spawn_with_signal<S, O, C, E>(
    reconciler: Reconciler<S, O, C>,
    shutdown: Arc<ShutdownSignal>,
    mut sink: E,
) -> std::io::Result<LoopHandle<O>>
where
    S: ScheduleStore + 'static,
    O: OutputPort + Send + 'static,
    C: Clock + Send + 'static,
    E: EventSink + Send + 'static,
{
    let signal = Arc::clone(&shutdown);
    let thread = thread::Builder::new()
        .name("reconcile".into())
        .spawn(move || future::block_on(reconciler.run(&signal, &mut sink)))?;
    Ok(LoopHandle { shutdown, thread })
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
