//! GPIO assignments for the relay board.
//!
//! Single source of truth for the default wiring.  The configured value in
//! [`ControllerConfig`](crate::config::ControllerConfig) overrides it.

/// Digital output driving the light relay coil (BCM numbering).
pub const RELAY_GPIO: u8 = 17;

/// Highest GPIO number accepted in configuration.
pub const MAX_GPIO: u8 = 63;
