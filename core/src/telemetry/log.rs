use crate::model::Measurement;
use log::{info, warn};
use std::path::Path;

/// Thin wrapper that keeps store event lines uniform.
pub struct LogManager {
    scope: &'static str,
}

impl LogManager {
    pub fn new() -> Self {
        Self::scoped("store")
    }

    pub fn scoped(scope: &'static str) -> Self {
        Self { scope }
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.scope, message);
    }

    pub fn record_write(&self, operation: &str, path: &Path, rows: usize) {
        info!(
            "[{}] {} -> {} ({} rows)",
            self.scope,
            operation,
            path.display(),
            rows
        );
    }

    /// Warns once per call about labels outside the known unit set.
    /// Returns how many records carried one.
    pub fn flag_foreign_units(&self, records: &[Measurement]) -> usize {
        let foreign = records
            .iter()
            .filter(|record| record.dose_unit().is_none())
            .collect::<Vec<_>>();
        if let Some(first) = foreign.first() {
            warn!(
                "[{}] {} record(s) use an unrecognised unit (first: `{}`); kept as-is",
                self.scope,
                foreign.len(),
                first.unit
            );
        }
        foreign.len()
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GeoPoint;

    #[test]
    fn counts_foreign_units() {
        let records = vec![
            Measurement::new(GeoPoint::new(1.0, 1.0), 1.0, "µSv/h", "a"),
            Measurement::new(GeoPoint::new(1.0, 1.0), 1.0, "CPM", "b"),
            Measurement::new(GeoPoint::new(1.0, 1.0), 1.0, "", "c"),
        ];
        assert_eq!(LogManager::new().flag_foreign_units(&records), 2);
    }
}
