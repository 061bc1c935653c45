//! In-memory schedule store.
//!
//! Simulation backend for tests and dry runs.  The record is kept in its
//! encoded text form so loads exercise the same decoder as the file store.

use std::sync::{Mutex, PoisonError};

use crate::app::ports::{ScheduleStore, StoreError};
use crate::schedule::{RECORD_CAPACITY, ScheduleWindow};

#[derive(Default)]
pub struct MemoryScheduleStore {
    record: Mutex<Option<heapless::String<RECORD_CAPACITY>>>,
}

impl MemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded with `window`.
    pub fn with_window(window: &ScheduleWindow) -> Self {
        Self {
            record: Mutex::new(Some(window.to_record())),
        }
    }
}

impl ScheduleStore for MemoryScheduleStore {
    fn save(&self, window: &ScheduleWindow) -> Result<(), StoreError> {
        let mut record = self.record.lock().unwrap_or_else(PoisonError::into_inner);
        *record = Some(window.to_record());
        Ok(())
    }

    fn load(&self) -> Result<Option<ScheduleWindow>, StoreError> {
        let record = self.record.lock().unwrap_or_else(PoisonError::into_inner);
        match record.as_deref() {
            Some(text) => ScheduleWindow::from_record(text)
                .map_err(|_| StoreError::Corrupted("undecodable record")),
            None => Ok(None),
        }
    }
}
