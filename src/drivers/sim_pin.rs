//! Simulated GPIO output.
//!
//! Stands in for a real pin on hosts without GPIO access.  Tracks the level
//! in memory and logs every change so a dry run shows what the relay would
//! have done.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use log::info;

#[derive(Debug)]
pub struct SimulatedPin {
    gpio: u8,
    high: bool,
    writes: u64,
}

impl SimulatedPin {
    pub fn new(gpio: u8) -> Self {
        Self {
            gpio,
            high: false,
            writes: 0,
        }
    }

    pub fn is_high(&self) -> bool {
        self.high
    }

    /// Number of level writes received.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    fn write(&mut self, high: bool) {
        self.high = high;
        self.writes += 1;
        info!(
            "GPIO{}(sim) -> {}",
            self.gpio,
            if high { "HIGH" } else { "LOW" }
        );
    }
}

impl ErrorType for SimulatedPin {
    type Error = Infallible;
}

impl OutputPin for SimulatedPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true);
        Ok(())
    }
}
