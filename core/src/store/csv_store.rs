use crate::codec::{parse_table, write_table};
use crate::model::Measurement;
use crate::prelude::{PointStore, StoreError, StoreResult};
use crate::telemetry::{LogManager, MetricsRecorder};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Point store persisted as one CSV file.
///
/// Writes go to a sibling temporary file that is renamed over the target, so
/// an interrupted write leaves the previous table in place. A failed write
/// also rolls the in-memory table back.
pub struct CsvPointStore {
    path: PathBuf,
    records: Vec<Measurement>,
    logger: LogManager,
    metrics: Arc<MetricsRecorder>,
}

impl CsvPointStore {
    /// Binds to `path` and loads it. A missing file is an empty table.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::open_with_metrics(path, Arc::new(MetricsRecorder::new()))
    }

    pub fn open_with_metrics(
        path: impl Into<PathBuf>,
        metrics: Arc<MetricsRecorder>,
    ) -> StoreResult<Self> {
        let mut store = Self {
            path: path.into(),
            records: Vec::new(),
            logger: LogManager::new(),
            metrics,
        };
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metrics(&self) -> Arc<MetricsRecorder> {
        self.metrics.clone()
    }

    fn read_backing_file(&self) -> StoreResult<Vec<Measurement>> {
        match fs::read(&self.path) {
            Ok(bytes) => parse_table(&bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(StoreError::io(&self.path, err)),
        }
    }

    fn write_through(&self, operation: &str) -> StoreResult<()> {
        let bytes = write_table(&self.records)?;
        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(directory).map_err(|err| StoreError::io(directory, err))?;

        let mut staging =
            NamedTempFile::new_in(directory).map_err(|err| StoreError::io(directory, err))?;
        staging
            .write_all(&bytes)
            .and_then(|_| staging.as_file().sync_all())
            .map_err(|err| StoreError::io(staging.path(), err))?;
        staging
            .persist(&self.path)
            .map_err(|err| StoreError::io(&self.path, err.error))?;

        self.logger
            .record_write(operation, &self.path, self.records.len());
        Ok(())
    }

    fn track<T>(&self, result: StoreResult<T>) -> StoreResult<T> {
        if result.is_err() {
            self.metrics.record_error();
        }
        result
    }
}

impl PointStore for CsvPointStore {
    fn load(&mut self) -> StoreResult<()> {
        let loaded = self.read_backing_file();
        let records = self.track(loaded)?;
        self.logger.flag_foreign_units(&records);
        self.logger.record(&format!(
            "loaded {} rows from {}",
            records.len(),
            self.path.display()
        ));
        self.records = records;
        Ok(())
    }

    fn records(&self) -> &[Measurement] {
        &self.records
    }

    fn append(&mut self, record: Measurement) -> StoreResult<()> {
        self.logger.flag_foreign_units(std::slice::from_ref(&record));
        self.records.push(record);
        if let Err(err) = self.write_through("append") {
            self.records.pop();
            return self.track(Err(err));
        }
        self.metrics.record_appended();
        Ok(())
    }

    fn remove_last(&mut self) -> StoreResult<Option<Measurement>> {
        let Some(removed) = self.records.pop() else {
            return Ok(None);
        };
        if let Err(err) = self.write_through("remove_last") {
            self.records.push(removed);
            return self.track(Err(err));
        }
        self.metrics.record_removed();
        Ok(Some(removed))
    }

    fn replace_all(&mut self, records: Vec<Measurement>) -> StoreResult<()> {
        self.logger.flag_foreign_units(&records);
        let previous = std::mem::replace(&mut self.records, records);
        if let Err(err) = self.write_through("replace_all") {
            self.records = previous;
            return self.track(Err(err));
        }
        self.metrics.record_replaced();
        Ok(())
    }

    fn clear(&mut self) -> StoreResult<()> {
        let removed = match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::io(&self.path, err)),
        };
        self.track(removed)?;
        self.records.clear();
        self.logger
            .record(&format!("cleared table, removed {}", self.path.display()));
        self.metrics.record_cleared();
        Ok(())
    }

    fn export(&self) -> StoreResult<Vec<u8>> {
        write_table(&self.records)
    }
}
