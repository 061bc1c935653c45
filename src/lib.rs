//! Lightwindow controller library.
//!
//! Drives a single relay-switched light from a daily ON/OFF window.  The
//! pure logic (window evaluation, schedule validation) and the
//! reconciliation loop are exposed here for integration testing and for
//! embedding behind an outer UI layer.  Hardware, storage and time sit
//! behind the port traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod evaluator;
pub mod pins;
pub mod reconciler;
pub mod schedule;
