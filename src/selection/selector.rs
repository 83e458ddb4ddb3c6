//! Classification of regions against a geodesic circle.

use geo::{Centroid, Distance, Haversine, MultiPolygon, Point};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

use super::RegionIndex;
use crate::geodesy::{GeodesicCircle, LambertEqualArea, Projection};
use crate::models::{Classification, ClassifiedRegion, Region};

/// Result of classifying every candidate region for one request.
#[derive(Debug, Clone)]
pub struct Selection {
    pub circle: GeodesicCircle,
    /// Sorted by name
    pub included: Vec<ClassifiedRegion>,
    /// Sorted by name
    pub bordering: Vec<ClassifiedRegion>,
}

impl Selection {
    pub fn center(&self) -> Point<f64> {
        self.circle.center()
    }

    pub fn included_names(&self) -> Vec<String> {
        self.included.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn bordering_names(&self) -> Vec<String> {
        self.bordering.iter().map(|c| c.name().to_string()).collect()
    }
}

/// Selects regions around a point from a shared, read-only index.
pub struct RegionSelector {
    index: RegionIndex,
    circle_segments: usize,
}

impl RegionSelector {
    pub fn new(index: RegionIndex, circle_segments: usize) -> Self {
        Self {
            index,
            circle_segments,
        }
    }

    pub fn index(&self) -> &RegionIndex {
        &self.index
    }

    /// Classify every region against a circle of `radius_km` around `center`.
    pub fn select(&self, center: Point<f64>, radius_km: f64) -> Selection {
        let circle = GeodesicCircle::new(center, radius_km, self.circle_segments);
        let candidates = circle
            .bounding_rect()
            .map(|rect| self.index.candidates(&rect))
            .unwrap_or_default();
        let equal_area = LambertEqualArea::new(center);

        let mut classified: Vec<ClassifiedRegion> = candidates
            .into_par_iter()
            .filter_map(|region| classify(region, &circle, &equal_area))
            .collect();
        classified.sort_by(|a, b| a.region.name.cmp(&b.region.name));

        let (included, bordering): (Vec<_>, Vec<_>) = classified
            .into_iter()
            .partition(|c| c.classification == Classification::Included);

        debug!(
            "Selection at ({}, {}) r={}km: {} included, {} bordering",
            center.x(),
            center.y(),
            radius_km,
            included.len(),
            bordering.len()
        );

        Selection {
            circle,
            included,
            bordering,
        }
    }
}

/// Area-weighted centroid computed in an equal-area plane, returned in lon/lat.
pub fn equal_area_centroid(
    geometry: &MultiPolygon<f64>,
    projection: &LambertEqualArea,
) -> Option<Point<f64>> {
    let planar = projection.project(geometry);
    planar
        .centroid()
        .map(|p| Point::from(projection.inverse(p.0)))
}

/// Included when the centroid is inside the circle, bordering when only the
/// geometry touches it, `None` otherwise.
pub fn classify(
    region: Arc<Region>,
    circle: &GeodesicCircle,
    equal_area: &LambertEqualArea,
) -> Option<ClassifiedRegion> {
    let centroid = equal_area_centroid(&region.geometry, equal_area)?;

    let classification = if circle.contains_point(&centroid) {
        Classification::Included
    } else if circle.intersects(&region.geometry) {
        Classification::Bordering
    } else {
        return None;
    };

    let distance_km = Haversine.distance(circle.center(), centroid) / 1000.0;

    Some(ClassifiedRegion {
        region,
        classification,
        centroid,
        distance_km,
    })
}
