//! Geometric selection of regions around a point.
//!
//! Loads the region dataset once, indexes it with an R-tree and classifies
//! regions as included or bordering for each request's geodesic circle.

mod dataset;
mod index;
mod selector;

#[cfg(test)]
pub(crate) mod fixtures;

pub use dataset::{load_regions, parse_regions};
pub use index::RegionIndex;
pub use selector::{classify, equal_area_centroid, RegionSelector, Selection};
