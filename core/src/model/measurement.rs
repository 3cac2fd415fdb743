use crate::model::unit::DoseUnit;
use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair. No range checks are applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// One dose reading taken at a location.
///
/// Field order matches the storage columns `lat,lon,value,unit,time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    pub value: f64,
    pub unit: String,
    pub time: String,
}

impl Measurement {
    pub fn new(
        position: GeoPoint,
        value: f64,
        unit: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            latitude: position.lat,
            longitude: position.lon,
            value,
            unit: unit.into(),
            time: time.into(),
        }
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Parsed unit, or `None` for labels outside the known set.
    pub fn dose_unit(&self) -> Option<DoseUnit> {
        self.unit.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measurement_exposes_position_and_unit() {
        let record = Measurement::new(
            GeoPoint::new(50.1, 30.1),
            0.12,
            DoseUnit::MicroSievertPerHour.label(),
            "01.01.2025 10:00",
        );
        assert_eq!(record.position(), GeoPoint::new(50.1, 30.1));
        assert_eq!(record.dose_unit(), Some(DoseUnit::MicroSievertPerHour));
    }

    #[test]
    fn foreign_unit_labels_are_kept_verbatim() {
        let record = Measurement::new(GeoPoint::new(0.0, 0.0), 1.0, "cpm", "t");
        assert_eq!(record.unit, "cpm");
        assert!(record.dose_unit().is_none());
    }
}
