//! Output drivers.

pub mod relay;
pub mod sim_pin;
