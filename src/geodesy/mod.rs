//! Projection math and geodesic buffers.

mod circle;
mod projection;

pub use circle::GeodesicCircle;
pub use projection::{AzimuthalEquidistant, LambertEqualArea, Projection, MEAN_EARTH_RADIUS_M};
