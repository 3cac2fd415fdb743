use crate::model::{DoseUnit, GeoPoint, Measurement};
use crate::presentation::capture::capture_location;
use crate::presentation::map::{map_center, markers, MarkerView};
use serde::{Deserialize, Serialize};

/// Everything a map front end needs to draw one render cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: u8,
    pub markers: Vec<MarkerView>,
    /// Click recorded since the last append, if any.
    pub pending_click: Option<GeoPoint>,
    /// Location the next append will use.
    pub capture_at: GeoPoint,
    pub point_count: usize,
    pub units: Vec<String>,
    pub default_time: String,
}

impl MapView {
    pub fn build(
        records: &[Measurement],
        last_click: Option<GeoPoint>,
        zoom: u8,
        default_time: String,
    ) -> Self {
        let center = map_center(records);
        Self {
            center,
            zoom,
            markers: markers(records, true),
            pending_click: last_click,
            capture_at: capture_location(last_click, center),
            point_count: records.len(),
            units: DoseUnit::labels().into_iter().map(String::from).collect(),
            default_time,
        }
    }

    /// Undo is only offered when there is something to undo.
    pub fn can_undo(&self) -> bool {
        self.point_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_of_empty_table() {
        let view = MapView::build(&[], None, 13, "now".into());
        assert_eq!(view.center, GeoPoint::new(50.45, 30.52));
        assert_eq!(view.capture_at, view.center);
        assert!(view.markers.is_empty());
        assert!(!view.can_undo());
        assert_eq!(view.units, vec!["µSv/h", "mSv/h"]);
    }

    #[test]
    fn view_tracks_click_and_last_record() {
        let records = vec![Measurement::new(
            GeoPoint::new(50.1, 30.1),
            0.12,
            "µSv/h",
            "01.01.2025 10:00",
        )];
        let click = GeoPoint::new(48.0, 35.0);
        let view = MapView::build(&records, Some(click), 13, "now".into());
        assert_eq!(view.center, GeoPoint::new(50.1, 30.1));
        assert_eq!(view.capture_at, click);
        assert_eq!(view.markers[0].label, "0.12 µSv/h | 01.01.2025 10:00");
        assert!(view.can_undo());
    }
}
