//! Core point store and presentation logic for the RadMap dose-mapping tool.
//!
//! The store owns an ordered table of geotagged dose measurements backed by a
//! single CSV file; every mutation writes the whole table through before it
//! returns. The presentation helpers turn that table into map markers, capture
//! defaults and a standalone HTML snapshot.

pub mod codec;
pub mod model;
pub mod prelude;
pub mod presentation;
pub mod report;
pub mod store;
pub mod telemetry;

pub use model::{DoseUnit, GeoPoint, Measurement};
pub use prelude::{PointStore, StoreError, StoreResult};
pub use store::CsvPointStore;
