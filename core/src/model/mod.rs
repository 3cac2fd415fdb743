pub mod measurement;
pub mod unit;

pub use measurement::{GeoPoint, Measurement};
pub use unit::{DoseUnit, UnknownUnit};
