pub mod capture;
pub mod map;
pub mod view;

pub use capture::{capture_location, CaptureForm, TimeLabeler, TIME_LABEL_FORMAT};
pub use map::{
    map_center, marker_label, markers, mean_center, MarkerView, FALLBACK_CENTER, LABEL_PRECISION,
};
pub use view::MapView;
