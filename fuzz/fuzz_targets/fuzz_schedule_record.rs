//! Fuzz target: schedule record decoder
//!
//! Feeds arbitrary bytes to `ScheduleWindow::from_record` (the path every
//! load from disk takes) and checks:
//! - No panics on any input
//! - Every accepted record describes a non-wrapping window
//! - Re-encoding an accepted record decodes to the same window
//!
//! cargo fuzz run fuzz_schedule_record

#![no_main]

use libfuzzer_sys::fuzz_target;
use lightwindow::schedule::ScheduleWindow;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(Some(window)) = ScheduleWindow::from_record(text) else {
        return;
    };

    assert!(
        window.on_time() < window.off_time(),
        "decoded wrapping window {window}"
    );

    let record = window.to_record();
    assert_eq!(ScheduleWindow::from_record(&record), Ok(Some(window)));
});
