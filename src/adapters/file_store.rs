//! File-backed schedule store.
//!
//! Implements [`ScheduleStore`] over a single text file holding
//! `HH:MM,HH:MM`.
//!
//! # Atomicity
//!
//! Every save writes a fresh, uniquely named temp file in the record's
//! directory, fsyncs it, then `rename(2)`s it over the record.  Rename
//! within one directory is atomic on POSIX filesystems, so a concurrent
//! reader (or a reboot mid-save) sees either the old record or the new one.
//! Writers never share a temp file, which keeps this true across processes
//! (`lightwindow set` racing a running loop) as well as threads; the last
//! rename wins.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::app::ports::{ScheduleStore, StoreError};
use crate::schedule::ScheduleWindow;

pub struct FileScheduleStore {
    path: PathBuf,
}

impl FileScheduleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("FileScheduleStore: record at {}", path.display());
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the record (and its temp files).
    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }

    /// Persist the rename itself.  Not every platform lets a directory be
    /// opened for syncing, so failures here are only logged.
    fn sync_dir(&self) {
        if let Err(e) = File::open(self.dir()).and_then(|d| d.sync_all()) {
            debug!("FileScheduleStore: directory sync skipped: {}", e);
        }
    }
}

impl ScheduleStore for FileScheduleStore {
    fn save(&self, window: &ScheduleWindow) -> Result<(), StoreError> {
        let dir = self.dir();
        fs::create_dir_all(dir)?;

        let record = window.to_record();
        // Dropping `tmp` on any error path removes the temp file.
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(record.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        self.sync_dir();

        debug!("FileScheduleStore: saved {}", record);
        Ok(())
    }

    fn load(&self) -> Result<Option<ScheduleWindow>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(StoreError::Corrupted("record is not UTF-8"));
            }
            Err(e) => return Err(e.into()),
        };
        ScheduleWindow::from_record(&text).map_err(|_| StoreError::Corrupted("undecodable record"))
    }
}
