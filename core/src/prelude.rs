use crate::model::Measurement;
use std::path::PathBuf;

/// Common error type for store and codec operations.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("i/o failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed table: {0}")]
    Malformed(String),
    #[error("table encoding failed: {0}")]
    Encoding(#[from] csv::Error),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the failure was caused by caller-supplied data rather than
    /// the environment.
    pub fn is_bad_input(&self) -> bool {
        matches!(self, StoreError::Malformed(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Ordered, persisted collection of measurements.
///
/// Insertion order is significant: `remove_last` drops the newest record and
/// the map centers on it. Every mutating call persists the full table before
/// returning.
pub trait PointStore {
    /// Re-reads the backing storage, replacing the in-memory table.
    fn load(&mut self) -> StoreResult<()>;
    fn records(&self) -> &[Measurement];
    fn append(&mut self, record: Measurement) -> StoreResult<()>;
    /// Drops the newest record. Returns `None` without touching storage when
    /// the table is already empty.
    fn remove_last(&mut self) -> StoreResult<Option<Measurement>>;
    fn replace_all(&mut self, records: Vec<Measurement>) -> StoreResult<()>;
    /// Empties the table and removes the backing storage.
    fn clear(&mut self) -> StoreResult<()>;
    /// Serializes the table in the storage format without touching storage.
    fn export(&self) -> StoreResult<Vec<u8>>;

    fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    fn len(&self) -> usize {
        self.records().len()
    }

    fn last(&self) -> Option<&Measurement> {
        self.records().last()
    }
}
