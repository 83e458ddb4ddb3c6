//! Administrative regions and their classification against a circle.

use geo::{BoundingRect, MultiPolygon, Point};
use std::sync::Arc;

/// A named administrative polygon, immutable once loaded.
#[derive(Debug, Clone)]
pub struct Region {
    pub name: String,
    /// Name of the admin-1 region (province, state) this one belongs to
    pub parent: String,
    pub geometry: MultiPolygon<f64>,
}

impl Region {
    pub fn new(name: impl Into<String>, parent: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        Self {
            name: name.into(),
            parent: parent.into(),
            geometry,
        }
    }

    /// Get the bounding box of this region
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        self.geometry
            .bounding_rect()
            .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Centroid inside the circle
    Included,
    /// Geometry touches the circle, centroid outside
    Bordering,
}

/// A region with its per-request classification.
#[derive(Debug, Clone)]
pub struct ClassifiedRegion {
    pub region: Arc<Region>,
    pub classification: Classification,
    /// Equal-area centroid in lon/lat
    pub centroid: Point<f64>,
    /// Great-circle distance from the request center to the centroid
    pub distance_km: f64,
}

impl ClassifiedRegion {
    pub fn name(&self) -> &str {
        &self.region.name
    }
}
