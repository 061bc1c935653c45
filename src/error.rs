//! Unified error type for the controller.
//!
//! Each subsystem keeps its own small error enum close to the code that
//! raises it.  This module gathers them into one `Error` so outer layers
//! (the binary, an embedding UI) can handle every failure uniformly.

use core::fmt;

use crate::app::ports::{DriverError, StoreError};
use crate::app::service::ScheduleError;
use crate::config::ConfigError;
use crate::schedule::ValidationError;

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug)]
pub enum Error {
    /// A proposed schedule was rejected before persistence.
    Validation(ValidationError),
    /// The schedule store could not be read or written.
    Store(StoreError),
    /// The relay refused a level change.
    Driver(DriverError),
    /// The controller configuration is invalid or unreadable.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "validation: {e}"),
            Self::Store(e) => write!(f, "store: {e}"),
            Self::Driver(e) => write!(f, "driver: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Store(e) => Some(e),
            Self::Driver(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<DriverError> for Error {
    fn from(e: DriverError) -> Self {
        Self::Driver(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ScheduleError> for Error {
    fn from(e: ScheduleError) -> Self {
        match e {
            ScheduleError::Validation(v) => Self::Validation(v),
            ScheduleError::Store(s) => Self::Store(s),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
