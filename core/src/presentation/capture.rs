use crate::model::unit::UnknownUnit;
use crate::model::{DoseUnit, GeoPoint, Measurement};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Layout of auto-generated capture timestamps, e.g. `01.01.2025 12:00`.
pub const TIME_LABEL_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Where the next point goes: the last map click, or the map center when the
/// user has not clicked yet.
pub fn capture_location(last_click: Option<GeoPoint>, center: GeoPoint) -> GeoPoint {
    last_click.unwrap_or(center)
}

/// Fields submitted with the capture form. Every field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureForm {
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub time: Option<String>,
}

impl CaptureForm {
    /// Builds the record to append. A missing value becomes `0.0`, a missing
    /// unit the default unit, and a blank time the supplied `auto_time`.
    pub fn into_measurement(
        self,
        location: GeoPoint,
        auto_time: String,
    ) -> Result<Measurement, UnknownUnit> {
        let unit = match self.unit.as_deref().map(str::trim) {
            None | Some("") => DoseUnit::default(),
            Some(label) => label.parse()?,
        };
        let time = self
            .time
            .map(|time| time.trim().to_string())
            .filter(|time| !time.is_empty())
            .unwrap_or(auto_time);
        Ok(Measurement::new(
            location,
            self.value.unwrap_or(0.0),
            unit.label(),
            time,
        ))
    }
}

/// Produces capture timestamps in a fixed UTC offset, or in the host's local
/// zone when none is configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeLabeler {
    offset: Option<FixedOffset>,
}

impl TimeLabeler {
    pub fn local() -> Self {
        Self { offset: None }
    }

    /// `None` when the offset is outside ±23 hours.
    pub fn with_utc_offset_hours(hours: i32) -> Option<Self> {
        FixedOffset::east_opt(hours.checked_mul(3600)?).map(|offset| Self {
            offset: Some(offset),
        })
    }

    pub fn now_label(&self) -> String {
        self.label_for(Utc::now())
    }

    pub fn label_for(&self, instant: DateTime<Utc>) -> String {
        match self.offset {
            Some(offset) => instant
                .with_timezone(&offset)
                .format(TIME_LABEL_FORMAT)
                .to_string(),
            None => instant
                .with_timezone(&Local)
                .format(TIME_LABEL_FORMAT)
                .to_string(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        let now = Utc::now();
        match self.offset {
            Some(offset) => now.with_timezone(&offset).date_naive(),
            None => now.with_timezone(&Local).date_naive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn click_wins_over_center() {
        let center = GeoPoint::new(50.45, 30.52);
        let click = GeoPoint::new(49.0, 24.0);
        assert_eq!(capture_location(Some(click), center), click);
        assert_eq!(capture_location(None, center), center);
    }

    #[test]
    fn empty_form_uses_defaults() {
        let record = CaptureForm::default()
            .into_measurement(GeoPoint::new(1.0, 2.0), "auto".into())
            .unwrap();
        assert_eq!(record.value, 0.0);
        assert_eq!(record.unit, "µSv/h");
        assert_eq!(record.time, "auto");
        assert_eq!(record.position(), GeoPoint::new(1.0, 2.0));
    }

    #[test]
    fn form_fields_are_normalised() {
        let form = CaptureForm {
            value: Some(0.42),
            unit: Some("мЗв/год".into()),
            time: Some("  05.05.2025 09:30 ".into()),
        };
        let record = form
            .into_measurement(GeoPoint::new(0.0, 0.0), "auto".into())
            .unwrap();
        assert_eq!(record.value, 0.42);
        assert_eq!(record.unit, "mSv/h");
        assert_eq!(record.time, "05.05.2025 09:30");
    }

    #[test]
    fn form_rejects_unknown_unit() {
        let form = CaptureForm {
            unit: Some("rem".into()),
            ..Default::default()
        };
        assert!(form
            .into_measurement(GeoPoint::new(0.0, 0.0), "auto".into())
            .is_err());
    }

    #[test]
    fn labeler_formats_in_fixed_offset() {
        let labeler = TimeLabeler::with_utc_offset_hours(2).unwrap();
        let instant = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(labeler.label_for(instant), "01.01.2025 12:00");
    }

    #[test]
    fn labeler_rejects_out_of_range_offset() {
        assert!(TimeLabeler::with_utc_offset_hours(30).is_none());
    }
}
