//! Core data models for the map service.

pub mod color;
pub mod region;
pub mod request;

pub use color::FillColor;
pub use region::{Classification, ClassifiedRegion, Region};
pub use request::{MapRequest, MapResponse, RawMapRequest};
