use serde::Serialize;
use std::sync::Mutex;

/// Counters for store mutations, shared between the store and its host.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub appended: usize,
    pub removed: usize,
    pub replaced: usize,
    pub cleared: usize,
    pub errors: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_appended(&self) {
        self.bump(|metrics| metrics.appended += 1);
    }

    pub fn record_removed(&self) {
        self.bump(|metrics| metrics.removed += 1);
    }

    pub fn record_replaced(&self) {
        self.bump(|metrics| metrics.replaced += 1);
    }

    pub fn record_cleared(&self) {
        self.bump(|metrics| metrics.cleared += 1);
    }

    pub fn record_error(&self) {
        self.bump(|metrics| metrics.errors += 1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }

    fn bump(&self, update: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            update(&mut metrics);
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_events() {
        let metrics = MetricsRecorder::new();
        metrics.record_appended();
        metrics.record_appended();
        metrics.record_removed();
        metrics.record_error();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.appended, 2);
        assert_eq!(snapshot.removed, 1);
        assert_eq!(snapshot.errors, 1);
        assert_eq!(snapshot.cleared, 0);
    }
}
