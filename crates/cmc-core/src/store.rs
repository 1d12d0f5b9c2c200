//! Append-only CSV table of records
//!
//! Appending reads the whole table, adds one row and writes the table back
//! through a temporary file that is renamed over the original, so a crash
//! mid-write never leaves a truncated table behind. There is no locking:
//! two processes appending to the same table at once can lose a row. Run
//! one scraper per table.

use crate::error::{Result, ScrapeError};
use crate::record::{COLUMNS, Record};
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Destination for scraped records
pub trait RecordStore {
    fn append(&self, record: &Record) -> Result<()>;
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn append(&self, record: &Record) -> Result<()> {
        (**self).append(record)
    }
}

/// CSV file with the canonical 8-column header
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in table order; an absent table is empty
    pub fn read_all(&self) -> Result<Vec<Record>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::Reader::from_reader(file);
        let headers = reader.headers()?.clone();
        if !headers.is_empty() && headers.iter().ne(COLUMNS) {
            return Err(ScrapeError::Schema {
                expected: COLUMNS.iter().map(ToString::to_string).collect(),
                found: headers.iter().map(ToString::to_string).collect(),
            });
        }

        reader
            .deserialize()
            .map(|row| row.map_err(ScrapeError::from))
            .collect()
    }

    fn write_all(&self, records: &[Record]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(tmp.as_file());
            writer.write_record(COLUMNS)?;
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
        // The rename would otherwise leave the table with the temp file's 0600
        match std::fs::metadata(&self.path) {
            Ok(existing) => tmp.as_file().set_permissions(existing.permissions())?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| ScrapeError::Io(e.error))?;
        Ok(())
    }
}

impl RecordStore for CsvStore {
    fn append(&self, record: &Record) -> Result<()> {
        let mut records = self.read_all()?;
        if records.is_empty() {
            debug!("Initialising table {}", self.path.display());
        }
        records.push(record.clone());
        self.write_all(&records)?;
        info!("Saved row to {} ({} rows)", self.path.display(), records.len());
        Ok(())
    }
}
