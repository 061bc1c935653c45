//! Application core — domain logic behind port traits.
//!
//! The schedule mutation API and the controller facade live here.  All
//! interaction with storage, hardware and time happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
