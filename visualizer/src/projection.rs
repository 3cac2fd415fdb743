use radcore::GeoPoint;

const TILE_SIZE: f64 = 256.0;

/// Local equirectangular approximation of a web-mercator view, good enough
/// for the few kilometres a capture session spans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    center: GeoPoint,
    width: f64,
    height: f64,
    lon_per_px: f64,
    lat_per_px: f64,
}

impl Projection {
    pub fn new(center: GeoPoint, zoom: u8, width: f32, height: f32) -> Self {
        let lon_per_px = 360.0 / (TILE_SIZE * 2f64.powi(i32::from(zoom)));
        let lat_per_px = lon_per_px * center.lat.to_radians().cos().abs().max(1e-6);
        Self {
            center,
            width: f64::from(width),
            height: f64::from(height),
            lon_per_px,
            lat_per_px,
        }
    }

    pub fn to_screen(&self, point: GeoPoint) -> (f32, f32) {
        let x = self.width / 2.0 + (point.lon - self.center.lon) / self.lon_per_px;
        let y = self.height / 2.0 - (point.lat - self.center.lat) / self.lat_per_px;
        (x as f32, y as f32)
    }

    pub fn to_geo(&self, x: f32, y: f32) -> GeoPoint {
        GeoPoint::new(
            self.center.lat + (self.height / 2.0 - f64::from(y)) * self.lat_per_px,
            self.center.lon + (f64::from(x) - self.width / 2.0) * self.lon_per_px,
        )
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        (0.0..=self.width as f32).contains(&x) && (0.0..=self.height as f32).contains(&y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_maps_to_middle_of_canvas() {
        let projection = Projection::new(GeoPoint::new(50.45, 30.52), 13, 400.0, 300.0);
        assert_eq!(projection.to_screen(GeoPoint::new(50.45, 30.52)), (200.0, 150.0));
        assert!(projection.contains(200.0, 150.0));
        assert!(!projection.contains(-1.0, 150.0));
    }

    #[test]
    fn screen_and_geo_are_inverse() {
        let projection = Projection::new(GeoPoint::new(50.45, 30.52), 13, 400.0, 300.0);
        let geo = projection.to_geo(120.0, 40.0);
        let (x, y) = projection.to_screen(geo);
        assert!((x - 120.0).abs() < 1e-3);
        assert!((y - 40.0).abs() < 1e-3);
    }

    #[test]
    fn north_is_up_and_east_is_right() {
        let projection = Projection::new(GeoPoint::new(0.0, 0.0), 10, 100.0, 100.0);
        let north_east = projection.to_geo(100.0, 0.0);
        assert!(north_east.lat > 0.0);
        assert!(north_east.lon > 0.0);
    }
}
