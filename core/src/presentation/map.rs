use crate::model::{GeoPoint, Measurement};
use serde::{Deserialize, Serialize};

/// Center used when there is nothing to center on.
pub const FALLBACK_CENTER: GeoPoint = GeoPoint {
    lat: 50.45,
    lon: 30.52,
};

/// Decimal places shown for dose values on the map.
pub const LABEL_PRECISION: usize = 2;

/// A marker ready to hand to a map widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerView {
    pub position: GeoPoint,
    pub label: String,
}

/// The newest record's coordinates, or [`FALLBACK_CENTER`] for an empty table.
pub fn map_center(records: &[Measurement]) -> GeoPoint {
    records
        .last()
        .map(Measurement::position)
        .unwrap_or(FALLBACK_CENTER)
}

/// Arithmetic mean of all coordinates, used to frame report snapshots.
pub fn mean_center(records: &[Measurement]) -> GeoPoint {
    if records.is_empty() {
        return FALLBACK_CENTER;
    }
    let count = records.len() as f64;
    let (lat, lon) = records.iter().fold((0.0, 0.0), |(lat, lon), record| {
        (lat + record.latitude, lon + record.longitude)
    });
    GeoPoint::new(lat / count, lon / count)
}

pub fn marker_label(record: &Measurement, include_time: bool) -> String {
    let mut label = format!(
        "{:.prec$} {}",
        record.value,
        record.unit,
        prec = LABEL_PRECISION
    );
    if include_time {
        label.push_str(" | ");
        label.push_str(&record.time);
    }
    label
}

/// One marker per record, in table order.
pub fn markers(records: &[Measurement], include_time: bool) -> Vec<MarkerView> {
    records
        .iter()
        .map(|record| MarkerView {
            position: record.position(),
            label: marker_label(record, include_time),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(lat: f64, lon: f64, value: f64) -> Measurement {
        Measurement::new(GeoPoint::new(lat, lon), value, "µSv/h", "01.01.2025 10:00")
    }

    #[test]
    fn center_uses_last_record() {
        let table = vec![record(50.1, 30.1, 0.12)];
        assert_eq!(map_center(&table), GeoPoint::new(50.1, 30.1));

        let table = vec![record(1.0, 2.0, 0.1), record(3.0, 4.0, 0.2)];
        assert_eq!(map_center(&table), GeoPoint::new(3.0, 4.0));
    }

    #[test]
    fn empty_table_falls_back() {
        assert_eq!(map_center(&[]), GeoPoint::new(50.45, 30.52));
        assert_eq!(mean_center(&[]), FALLBACK_CENTER);
    }

    #[test]
    fn mean_center_averages_coordinates() {
        let table = vec![record(50.0, 30.0, 0.1), record(52.0, 31.0, 0.1)];
        assert_eq!(mean_center(&table), GeoPoint::new(51.0, 30.5));
    }

    #[test]
    fn label_rounds_value_and_appends_time() {
        let point = record(0.0, 0.0, 0.1234);
        assert_eq!(marker_label(&point, false), "0.12 µSv/h");
        assert_eq!(marker_label(&point, true), "0.12 µSv/h | 01.01.2025 10:00");

        let point = record(0.0, 0.0, 3.0);
        assert_eq!(marker_label(&point, false), "3.00 µSv/h");
    }

    #[test]
    fn markers_preserve_order() {
        let table = vec![record(1.0, 1.0, 0.1), record(2.0, 2.0, 0.2)];
        let views = markers(&table, false);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].position, GeoPoint::new(1.0, 1.0));
        assert_eq!(views[1].label, "0.20 µSv/h");
    }
}
