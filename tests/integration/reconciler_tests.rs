//! Reconciler against a mock relay pin, clock and event sink.
//!
//! Covers the load → evaluate → apply cycle end to end, fault recovery and
//! the threaded loop's shutdown path.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use lightwindow::adapters::memory_store::MemoryScheduleStore;
use lightwindow::app::events::ControllerEvent;
use lightwindow::app::ports::{OutputPort, ScheduleStore};
use lightwindow::app::service::{Controller, ScheduleService};
use lightwindow::drivers::relay::RelayDriver;
use lightwindow::evaluator::OutputState;
use lightwindow::reconciler::{self, Reconciler, ShutdownSignal};
use lightwindow::schedule::ScheduleWindow;

use crate::mock_hw::{FailingStore, MockClock, MockPin, RecordingSink, hms};

const BUFFER: Duration = Duration::from_secs(10);

fn day_window() -> ScheduleWindow {
    ScheduleWindow::parse("08:00", "20:00").unwrap()
}

fn make_reconciler<S: ScheduleStore>(
    store: S,
    pin: &MockPin,
    clock: &MockClock,
    interval: Duration,
) -> Reconciler<S, RelayDriver<MockPin>, MockClock> {
    Reconciler::with_timing(
        store,
        RelayDriver::new(pin.clone(), false),
        clock.clone(),
        interval,
        BUFFER,
    )
}

/// Poll `cond` until it holds or two seconds pass.
fn wait_for(cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

// ── Single polls ──────────────────────────────────────────────

#[test]
fn light_follows_the_clock_across_a_day() {
    let pin = MockPin::new();
    let clock = MockClock::at(hms(7, 59, 49));
    let store = MemoryScheduleStore::with_window(&day_window());
    let mut r = make_reconciler(store, &pin, &clock, Duration::from_secs(10));
    let mut sink = RecordingSink::new();

    assert_eq!(r.poll_once(&mut sink).desired, OutputState::Off);
    clock.set(hms(7, 59, 55));
    assert_eq!(r.poll_once(&mut sink).desired, OutputState::On);
    clock.set(hms(20, 0, 5));
    assert_eq!(r.poll_once(&mut sink).desired, OutputState::On);
    clock.set(hms(20, 10, 0));
    assert_eq!(r.poll_once(&mut sink).desired, OutputState::Off);

    assert_eq!(pin.levels(), vec![false, true, false]);
    assert_eq!(
        sink.count(|e| matches!(e, ControllerEvent::OutputChanged { .. })),
        3
    );
}

#[test]
fn committed_schedule_is_picked_up_on_next_poll() {
    let store = Arc::new(MemoryScheduleStore::new());
    let service = ScheduleService::new(Arc::clone(&store));
    let pin = MockPin::new();
    let clock = MockClock::at(hms(12, 0, 0));
    let mut r = make_reconciler(Arc::clone(&store), &pin, &clock, Duration::from_secs(10));
    let mut sink = RecordingSink::new();

    assert_eq!(r.poll_once(&mut sink).desired, OutputState::Off);

    service.set_schedule("11:00", "13:00", &mut sink).unwrap();
    let report = r.poll_once(&mut sink);
    assert_eq!(report.schedule, Some(ScheduleWindow::parse("11:00", "13:00").unwrap()));
    assert_eq!(report.desired, OutputState::On);
    assert!(pin.is_high());
}

#[test]
fn unreadable_store_forces_light_off() {
    let pin = MockPin::new();
    let clock = MockClock::at(hms(12, 0, 0));
    let mut r = make_reconciler(FailingStore, &pin, &clock, Duration::from_secs(10));
    let mut sink = RecordingSink::new();

    let report = r.poll_once(&mut sink);
    assert!(report.store_fallback);
    assert_eq!(report.desired, OutputState::Off);
    assert!(!pin.is_high());
    assert_eq!(
        sink.count(|e| matches!(e, ControllerEvent::StoreFallback(_))),
        1
    );
}

#[test]
fn driver_fault_is_retried_on_next_poll() {
    let pin = MockPin::new();
    let clock = MockClock::at(hms(12, 0, 0));
    let store = MemoryScheduleStore::with_window(&day_window());
    let mut r = make_reconciler(store, &pin, &clock, Duration::from_secs(10));
    let status = r.status_handle();
    let mut sink = RecordingSink::new();

    pin.fail_next(1);
    let report = r.poll_once(&mut sink);
    assert!(!report.applied);
    assert_eq!(status.get(), None);
    assert_eq!(r.output().state(), None);
    assert_eq!(
        sink.count(|e| matches!(e, ControllerEvent::DriverFault(_))),
        1
    );

    let report = r.poll_once(&mut sink);
    assert!(report.applied);
    assert_eq!(status.get(), Some(OutputState::On));
    assert_eq!(pin.levels(), vec![true]);
}

// ── Threaded loop ─────────────────────────────────────────────

#[test]
fn spawned_loop_drives_relay_and_switches_off_on_stop() {
    let pin = MockPin::new();
    let clock = MockClock::at(hms(12, 0, 0));
    let store = MemoryScheduleStore::with_window(&day_window());
    let r = make_reconciler(store, &pin, &clock, Duration::from_millis(10));
    let status = r.status_handle();
    let sink = RecordingSink::new();

    let handle = reconciler::spawn(r, sink.clone()).unwrap();
    assert!(wait_for(|| status.get() == Some(OutputState::On)));

    // Window ends while the loop is running.
    clock.set(hms(21, 0, 0));
    assert!(wait_for(|| status.get() == Some(OutputState::Off)));

    let driver = handle.stop().unwrap();
    assert_eq!(driver.state(), Some(OutputState::Off));
    assert!(!pin.is_high());

    let events = sink.events();
    assert!(matches!(events.first(), Some(ControllerEvent::Started { .. })));
    assert!(matches!(events.last(), Some(ControllerEvent::Stopped { polls }) if *polls >= 2));
}

#[test]
fn stop_during_window_turns_light_off() {
    let pin = MockPin::new();
    let clock = MockClock::at(hms(12, 0, 0));
    let store = MemoryScheduleStore::with_window(&day_window());
    let r = make_reconciler(store, &pin, &clock, Duration::from_secs(3600));
    let status = r.status_handle();

    let handle = reconciler::spawn(r, RecordingSink::new()).unwrap();
    assert!(wait_for(|| status.get() == Some(OutputState::On)));

    // The hour-long timer must not delay shutdown.
    let started = Instant::now();
    let driver = handle.stop().unwrap();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(driver.state(), Some(OutputState::Off));
    assert_eq!(pin.levels(), vec![true, false]);
    assert_eq!(status.get(), Some(OutputState::Off));
}

#[test]
fn controller_reports_loop_output() {
    let store = Arc::new(MemoryScheduleStore::with_window(&day_window()));
    let service = Arc::new(ScheduleService::new(Arc::clone(&store)));
    let pin = MockPin::new();
    let clock = MockClock::at(hms(12, 0, 0));
    let r = make_reconciler(Arc::clone(&store), &pin, &clock, Duration::from_millis(10));
    let controller = Controller::new(service, r.status_handle());

    assert_eq!(controller.current_output_state(), None);
    let handle = reconciler::spawn(r, RecordingSink::new()).unwrap();
    assert!(wait_for(|| controller.current_output_state() == Some(OutputState::On)));
    assert_eq!(controller.status().light_state, 1);

    handle.stop().unwrap();
    assert_eq!(controller.status().light_state, 0);
}

#[test]
fn shutdown_raised_before_spawn_still_switches_off() {
    let pin = MockPin::new();
    let clock = MockClock::at(hms(12, 0, 0));
    let store = MemoryScheduleStore::with_window(&day_window());
    let r = make_reconciler(store, &pin, &clock, Duration::from_secs(3600));
    let sink = RecordingSink::new();

    let shutdown = Arc::new(ShutdownSignal::new());
    shutdown.signal(());
    let handle = reconciler::spawn_with_signal(r, shutdown, sink.clone()).unwrap();

    let driver = handle.join().unwrap();
    assert_eq!(driver.state(), Some(OutputState::Off));
    assert_eq!(pin.levels(), vec![false]);
    assert_eq!(sink.events().last(), Some(&ControllerEvent::Stopped { polls: 0 }));
}
