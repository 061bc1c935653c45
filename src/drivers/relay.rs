//! Relay driver for the switched light output.
//!
//! Drives any `embedded-hal` output pin wired to a relay coil.  Relay
//! boards come in both polarities, so the active level is configurable.
//!
//! ## Idempotence
//!
//! The driver remembers the last level it asserted and skips the pin write
//! when asked for the same state again.  After a failed write the cached
//! state is forgotten so the next request always reaches the pin.

use embedded_hal::digital::{Error as _, OutputPin};
use log::warn;

use crate::app::ports::{DriverError, OutputPort};
use crate::evaluator::OutputState;

pub struct RelayDriver<P> {
    pin: P,
    active_low: bool,
    state: Option<OutputState>,
    transitions: u64,
}

impl<P: OutputPin> RelayDriver<P> {
    pub fn new(pin: P, active_low: bool) -> Self {
        Self {
            pin,
            active_low,
            state: None,
            transitions: 0,
        }
    }

    /// Drive the relay OFF unconditionally.  Call once at startup before the
    /// first poll so the light never inherits a stale level.
    pub fn setup(&mut self) -> Result<(), DriverError> {
        self.state = None;
        self.set_state(OutputState::Off)
    }

    /// Switch the relay OFF and hand the pin back.
    pub fn release(mut self) -> P {
        if self.state != Some(OutputState::Off) {
            if let Err(e) = self.write_hw(OutputState::Off) {
                warn!("Relay: release could not switch off: {}", e);
            }
        }
        self.pin
    }

    /// Physical level changes performed so far.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    fn write_hw(&mut self, state: OutputState) -> Result<(), DriverError> {
        let high = state.is_on() != self.active_low;
        let res = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        res.map_err(|e| DriverError::PinWrite(e.kind()))
    }
}

impl<P: OutputPin> OutputPort for RelayDriver<P> {
    fn set_state(&mut self, state: OutputState) -> Result<(), DriverError> {
        if self.state == Some(state) {
            return Ok(());
        }
        match self.write_hw(state) {
            Ok(()) => {
                self.state = Some(state);
                self.transitions += 1;
                Ok(())
            }
            Err(e) => {
                self.state = None;
                Err(e)
            }
        }
    }

    fn state(&self) -> Option<OutputState> {
        self.state
    }
}
