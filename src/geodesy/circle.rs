//! True-distance buffers around a geographic point.

use geo::{BoundingRect, Contains, Coord, Intersects, LineString, MultiPolygon, Point, Polygon, Rect};
use std::f64::consts::TAU;

use super::projection::{AzimuthalEquidistant, Projection};

/// Disc of every point within a great-circle distance of a center.
///
/// The disc is buffered in a local azimuthal-equidistant plane and then
/// projected back, never buffered in raw degrees.
#[derive(Debug, Clone)]
pub struct GeodesicCircle {
    center: Point<f64>,
    radius_km: f64,
    projection: AzimuthalEquidistant,
    planar: Polygon<f64>,
    geographic: Polygon<f64>,
}

impl GeodesicCircle {
    pub fn new(center: Point<f64>, radius_km: f64, segments: usize) -> Self {
        let projection = AzimuthalEquidistant::new(center);
        let origin = projection.forward(center.0);
        let planar = planar_disc(origin, radius_km * 1000.0, segments.max(8));
        let geographic = projection.unproject(&planar);

        Self {
            center,
            radius_km,
            projection,
            planar,
            geographic,
        }
    }

    pub fn center(&self) -> Point<f64> {
        self.center
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Projection the disc was buffered in, centered on the circle center
    pub fn projection(&self) -> &AzimuthalEquidistant {
        &self.projection
    }

    /// Disc in the local equidistant plane (meters)
    pub fn planar(&self) -> &Polygon<f64> {
        &self.planar
    }

    /// Disc in geographic lon/lat degrees
    pub fn polygon(&self) -> &Polygon<f64> {
        &self.geographic
    }

    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.geographic.bounding_rect()
    }

    pub fn contains_point(&self, point: &Point<f64>) -> bool {
        self.geographic.contains(point)
    }

    pub fn intersects(&self, geometry: &MultiPolygon<f64>) -> bool {
        self.geographic.intersects(geometry)
    }
}

/// Regular polygon inscribed in a planar circle, counter-clockwise and closed.
fn planar_disc(origin: Coord<f64>, radius_m: f64, segments: usize) -> Polygon<f64> {
    let ring: Vec<Coord<f64>> = (0..=segments)
        .map(|i| {
            let theta = TAU * (i % segments) as f64 / segments as f64;
            Coord {
                x: origin.x + radius_m * theta.cos(),
                y: origin.y + radius_m * theta.sin(),
            }
        })
        .collect();
    Polygon::new(LineString::new(ring), vec![])
}
