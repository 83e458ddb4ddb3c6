//! Place name to coordinate resolution.

mod nominatim;

pub use nominatim::{parse_results, GeoLocation, Geocoder};
