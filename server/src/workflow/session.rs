use crate::workflow::config::AppConfig;
use anyhow::Context;
use radcore::codec::parse_table;
use radcore::presentation::{capture_location, map_center, CaptureForm, MapView, TimeLabeler};
use radcore::report::{render_snapshot, report_file_name, SnapshotOptions};
use radcore::telemetry::{MetricsRecorder, MetricsSnapshot};
use radcore::{CsvPointStore, GeoPoint, Measurement, PointStore};
use std::sync::Arc;

/// A rendered report ready for download.
pub struct Snapshot {
    pub file_name: String,
    pub html: String,
}

/// One user's working state: the injected store plus the pending map click.
pub struct Session {
    store: Box<dyn PointStore + Send>,
    last_click: Option<GeoPoint>,
    labeler: TimeLabeler,
    zoom: u8,
    report: SnapshotOptions,
    metrics: Arc<MetricsRecorder>,
}

impl Session {
    pub fn new(
        store: Box<dyn PointStore + Send>,
        config: &AppConfig,
        metrics: Arc<MetricsRecorder>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            store,
            last_click: None,
            labeler: config.labeler()?,
            zoom: config.zoom,
            report: SnapshotOptions {
                title: config.report_title.clone(),
                zoom: config.report_zoom,
            },
            metrics,
        })
    }

    /// Opens the CSV store named by `config`.
    pub fn open(config: &AppConfig) -> anyhow::Result<Self> {
        let metrics = Arc::new(MetricsRecorder::new());
        let store = CsvPointStore::open_with_metrics(&config.database, metrics.clone())
            .with_context(|| format!("opening point store {}", config.database.display()))?;
        Self::new(Box::new(store), config, metrics)
    }

    pub fn records(&self) -> &[Measurement] {
        self.store.records()
    }

    pub fn last_click(&self) -> Option<GeoPoint> {
        self.last_click
    }

    pub fn view(&self) -> MapView {
        MapView::build(
            self.store.records(),
            self.last_click,
            self.zoom,
            self.labeler.now_label(),
        )
    }

    pub fn record_click(&mut self, point: GeoPoint) {
        self.last_click = Some(point);
    }

    /// Appends a point at the last click (or the map center) and consumes the
    /// click.
    pub fn submit(&mut self, form: CaptureForm) -> anyhow::Result<Measurement> {
        let location = capture_location(self.last_click, map_center(self.store.records()));
        let record = form
            .into_measurement(location, self.labeler.now_label())
            .context("building measurement from form")?;
        self.store
            .append(record.clone())
            .context("appending measurement")?;
        self.last_click = None;
        Ok(record)
    }

    pub fn undo(&mut self) -> anyhow::Result<Option<Measurement>> {
        self.store.remove_last().context("removing last measurement")
    }

    pub fn clear(&mut self) -> anyhow::Result<()> {
        self.store.clear().context("clearing measurements")?;
        self.last_click = None;
        Ok(())
    }

    /// Replaces the table with an uploaded CSV. The table is untouched when
    /// the upload does not parse.
    pub fn upload(&mut self, bytes: &[u8]) -> anyhow::Result<usize> {
        let records = parse_table(bytes).context("parsing uploaded table")?;
        let count = records.len();
        self.store
            .replace_all(records)
            .context("replacing measurements")?;
        Ok(count)
    }

    pub fn export_csv(&self) -> anyhow::Result<Vec<u8>> {
        self.store.export().context("exporting table")
    }

    /// `None` for an empty table; there is nothing to map.
    pub fn export_snapshot(&self) -> anyhow::Result<Option<Snapshot>> {
        if self.store.is_empty() {
            return Ok(None);
        }
        let html =
            render_snapshot(self.store.records(), &self.report).context("rendering snapshot")?;
        Ok(Some(Snapshot {
            file_name: report_file_name(self.labeler.today()),
            html,
        }))
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radcore::StoreError;
    use tempfile::TempDir;

    fn session_in(dir: &TempDir) -> Session {
        let config = AppConfig {
            database: dir.path().join("database.csv"),
            utc_offset_hours: Some(2),
            ..Default::default()
        };
        Session::open(&config).unwrap()
    }

    fn form(value: f64) -> CaptureForm {
        CaptureForm {
            value: Some(value),
            unit: Some("µSv/h".into()),
            time: Some(format!("t{value}")),
        }
    }

    #[test]
    fn submit_without_click_uses_map_center() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        let record = session.submit(form(0.1)).unwrap();
        assert_eq!(record.position(), GeoPoint::new(50.45, 30.52));
    }

    #[test]
    fn submit_consumes_click() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        session.record_click(GeoPoint::new(48.5, 35.0));
        let record = session.submit(form(0.2)).unwrap();
        assert_eq!(record.position(), GeoPoint::new(48.5, 35.0));
        assert!(session.last_click().is_none());

        let next = session.submit(form(0.3)).unwrap();
        assert_eq!(next.position(), GeoPoint::new(48.5, 35.0));
    }

    #[test]
    fn bad_unit_is_rejected_without_append() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        let err = session
            .submit(CaptureForm {
                unit: Some("rad".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.downcast_ref::<radcore::model::UnknownUnit>().is_some());
        assert!(session.records().is_empty());
    }

    #[test]
    fn malformed_upload_leaves_table_untouched() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        session.submit(form(0.1)).unwrap();

        let err = session.upload(b"foo,bar\n1,2\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Malformed(_))
        ));
        assert_eq!(session.records().len(), 1);
    }

    #[test]
    fn upload_replaces_table() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        session.submit(form(0.1)).unwrap();
        let body = "lat,lon,value,unit,time\n1,2,3,mSv/h,x\n4,5,6,mSv/h,y\n";
        assert_eq!(session.upload(body.as_bytes()).unwrap(), 2);
        assert_eq!(session.records()[1].value, 6.0);
        assert_eq!(session.view().center, GeoPoint::new(4.0, 5.0));
        assert_eq!(session.metrics().replaced, 1);
    }

    #[test]
    fn snapshot_requires_points() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        assert!(session.export_snapshot().unwrap().is_none());

        session.submit(form(0.5)).unwrap();
        let snapshot = session.export_snapshot().unwrap().unwrap();
        assert!(snapshot.file_name.starts_with("Rad_Report_"));
        assert!(snapshot.html.contains("0.50 µSv/h"));
    }

    #[test]
    fn clear_drops_points_and_click() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        session.submit(form(0.1)).unwrap();
        session.record_click(GeoPoint::new(1.0, 1.0));
        session.clear().unwrap();
        assert!(session.records().is_empty());
        assert!(session.last_click().is_none());
        assert!(!dir.path().join("database.csv").exists());
    }
}
