use crate::model::Measurement;
use crate::presentation::map::{markers, mean_center};
use crate::prelude::StoreResult;
use chrono::NaiveDate;

/// Download name for the CSV export.
pub const CSV_EXPORT_FILE_NAME: &str = "radiation_db.csv";

/// Radiation sign drawn for every marker; the stem tip is the anchor.
pub const MARKER_ICON_SVG: &str = r#"<svg width="35" height="45" viewBox="0 0 40 50" xmlns="http://www.w3.org/2000/svg"><line x1="20" y1="35" x2="20" y2="45" stroke="blue" stroke-width="3"/><polygon points="2,5 38,5 20,35" fill="blue" stroke="white" stroke-width="1"/><circle cx="20" cy="18" r="8" fill="yellow"/><circle cx="20" cy="18" r="1.5" fill="black"/><path d="M20,18 L17,13 A7,7 0 0,1 23,13 Z" fill="black"/><path d="M20,18 L24,22 A7,7 0 0,1 16,22 Z" fill="black"/><path d="M13,18 A7,7 0 0,1 15,13 L20,18 Z" fill="black"/><path d="M25,13 A7,7 0 0,1 27,18 L20,18 Z" fill="black"/></svg>"#;

const SNAPSHOT_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>__TITLE__</title>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css" crossorigin="anonymous" />
  <script src="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js" crossorigin="anonymous"></script>
  <style>
    html, body, #map { height: 100%; margin: 0; }
    .dose-marker { display: flex; align-items: center; width: 220px; }
    .dose-label {
      margin-left: 4px; color: blue; font-family: sans-serif; font-size: 10pt;
      font-weight: bold; text-shadow: 1px 1px 2px white; white-space: nowrap;
    }
  </style>
</head>
<body>
  <div id="map"></div>
  <script>
    const center = __CENTER__;
    const points = __POINTS__;
    const icon = __ICON__;
    const map = L.map("map").setView(center, __ZOOM__);
    L.tileLayer("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png", {
      maxZoom: 19,
      attribution: "&copy; OpenStreetMap contributors"
    }).addTo(map);
    for (const point of points) {
      const wrapper = document.createElement("div");
      wrapper.className = "dose-marker";
      wrapper.innerHTML = icon;
      const label = document.createElement("div");
      label.className = "dose-label";
      label.textContent = point.label;
      wrapper.appendChild(label);
      L.marker([point.position.lat, point.position.lon], {
        icon: L.divIcon({ html: wrapper, className: "", iconAnchor: [17, 45] })
      }).addTo(map);
    }
  </script>
</body>
</html>
"#;

/// Rendering knobs for [`render_snapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    pub title: String,
    pub zoom: u8,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            title: "Radiation dose report".into(),
            zoom: 12,
        }
    }
}

/// Renders a standalone HTML map of `records`, framed on their mean position.
///
/// Built purely from the slice passed in; nothing is read from disk.
pub fn render_snapshot(records: &[Measurement], options: &SnapshotOptions) -> StoreResult<String> {
    let center = mean_center(records);
    let points = script_json(&markers(records, true))?;
    let icon = script_json(&MARKER_ICON_SVG)?;

    Ok(SNAPSHOT_TEMPLATE
        .replace("__TITLE__", &escape_html(&options.title))
        .replace("__CENTER__", &format!("[{}, {}]", center.lat, center.lon))
        .replace("__ZOOM__", &options.zoom.to_string())
        .replace("__ICON__", &icon)
        .replace("__POINTS__", &points))
}

/// `Rad_Report_DD_MM_YYYY.html`
pub fn report_file_name(date: NaiveDate) -> String {
    format!("Rad_Report_{}.html", date.format("%d_%m_%Y"))
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

// JSON inlined into a <script> block must not contain a closing tag.
fn script_json<T: serde::Serialize + ?Sized>(value: &T) -> StoreResult<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GeoPoint;

    #[test]
    fn snapshot_embeds_every_marker() {
        let records = vec![
            Measurement::new(GeoPoint::new(50.0, 30.0), 0.15, "µSv/h", "01.01.2025 12:00"),
            Measurement::new(GeoPoint::new(52.0, 32.0), 1.0, "mSv/h", "01.01.2025 12:05"),
        ];
        let html = render_snapshot(&records, &SnapshotOptions::default()).unwrap();
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("const center = [51, 31];"));
        assert!(html.contains("setView(center, 12)"));
        assert!(html.contains("0.15 µSv/h | 01.01.2025 12:00"));
        assert!(html.contains("1.00 mSv/h | 01.01.2025 12:05"));
        assert!(!html.contains("__POINTS__"));
    }

    #[test]
    fn snapshot_neutralises_script_breakout() {
        let records = vec![Measurement::new(
            GeoPoint::new(0.0, 0.0),
            1.0,
            "µSv/h",
            "</script><script>alert(1)</script>",
        )];
        let options = SnapshotOptions {
            title: "<b>report</b>".into(),
            zoom: 10,
        };
        let html = render_snapshot(&records, &options).unwrap();
        assert_eq!(html.matches("</script>").count(), 2);
        assert!(html.contains("<title>&lt;b&gt;report&lt;/b&gt;</title>"));
    }

    #[test]
    fn report_name_uses_day_month_year() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(report_file_name(date), "Rad_Report_07_03_2025.html");
    }
}
