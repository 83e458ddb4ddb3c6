//! Local azimuthal projections on a spherical Earth.
//!
//! Both projections are centered on an arbitrary point and map lon/lat
//! degrees (`Coord { x: lon, y: lat }`) to meters in a tangent plane.

use geo::{Coord, MapCoords, Point};

/// Mean Earth radius in meters (IUGG), same value `geo` uses for haversine.
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;

const EPSILON: f64 = 1e-12;

pub trait Projection {
    /// Geographic degrees to planar meters
    fn forward(&self, coord: Coord<f64>) -> Coord<f64>;

    /// Planar meters back to geographic degrees
    fn inverse(&self, coord: Coord<f64>) -> Coord<f64>;

    fn project<G>(&self, geometry: &G) -> G::Output
    where
        G: MapCoords<f64, f64>,
        Self: Sized,
    {
        geometry.map_coords(|c| self.forward(c))
    }

    fn unproject<G>(&self, geometry: &G) -> G::Output
    where
        G: MapCoords<f64, f64>,
        Self: Sized,
    {
        geometry.map_coords(|c| self.inverse(c))
    }
}

/// Trigonometric terms of the projection center, computed once.
#[derive(Debug, Clone, Copy)]
struct Origin {
    lon0: f64,
    sin_lat0: f64,
    cos_lat0: f64,
}

impl Origin {
    fn new(center: Point<f64>) -> Self {
        let lat0 = center.y().to_radians();
        Self {
            lon0: center.x().to_radians(),
            sin_lat0: lat0.sin(),
            cos_lat0: lat0.cos(),
        }
    }

    /// Returns (cos of angular distance, x numerator, y numerator)
    fn terms(&self, coord: Coord<f64>) -> (f64, f64, f64) {
        let lat = coord.y.to_radians();
        let dlon = coord.x.to_radians() - self.lon0;
        let (sin_lat, cos_lat) = lat.sin_cos();
        let cos_c = self.sin_lat0 * sin_lat + self.cos_lat0 * cos_lat * dlon.cos();
        let x = cos_lat * dlon.sin();
        let y = self.cos_lat0 * sin_lat - self.sin_lat0 * cos_lat * dlon.cos();
        (cos_c.clamp(-1.0, 1.0), x, y)
    }

    /// Shared inverse for azimuthal projections given the angular distance `c`.
    ///
    /// Longitudes come back within ±180° of the center longitude and are
    /// deliberately not wrapped, so rings around the center stay continuous.
    fn invert(&self, x: f64, y: f64, rho: f64, c: f64) -> Coord<f64> {
        if rho < EPSILON {
            return Coord {
                x: self.lon0.to_degrees(),
                y: self.sin_lat0.atan2(self.cos_lat0).to_degrees(),
            };
        }
        let (sin_c, cos_c) = c.sin_cos();
        let lat = (cos_c * self.sin_lat0 + y * sin_c * self.cos_lat0 / rho)
            .clamp(-1.0, 1.0)
            .asin();
        let lon = self.lon0
            + (x * sin_c).atan2(rho * self.cos_lat0 * cos_c - y * self.sin_lat0 * sin_c);
        Coord {
            x: lon.to_degrees(),
            y: lat.to_degrees(),
        }
    }
}

/// Azimuthal equidistant projection: distance and azimuth from the center
/// are preserved exactly, so a planar circle of radius r is the set of
/// points at great-circle distance r.
#[derive(Debug, Clone, Copy)]
pub struct AzimuthalEquidistant {
    origin: Origin,
    radius: f64,
}

impl AzimuthalEquidistant {
    pub fn new(center: Point<f64>) -> Self {
        Self {
            origin: Origin::new(center),
            radius: MEAN_EARTH_RADIUS_M,
        }
    }

    /// Great-circle distance in meters from the projection center.
    pub fn distance_from_center(&self, coord: Coord<f64>) -> f64 {
        let (cos_c, _, _) = self.origin.terms(coord);
        self.radius * cos_c.acos()
    }
}

impl Projection for AzimuthalEquidistant {
    fn forward(&self, coord: Coord<f64>) -> Coord<f64> {
        let (cos_c, x, y) = self.origin.terms(coord);
        let c = cos_c.acos();
        let k = if c.abs() < EPSILON { 1.0 } else { c / c.sin() };
        Coord {
            x: self.radius * k * x,
            y: self.radius * k * y,
        }
    }

    fn inverse(&self, coord: Coord<f64>) -> Coord<f64> {
        let rho = coord.x.hypot(coord.y);
        self.origin
            .invert(coord.x, coord.y, rho, rho / self.radius)
    }
}

/// Lambert azimuthal equal-area projection. Areas are preserved, which
/// makes planar centroids meaningful for geographic polygons.
#[derive(Debug, Clone, Copy)]
pub struct LambertEqualArea {
    origin: Origin,
    radius: f64,
}

impl LambertEqualArea {
    pub fn new(center: Point<f64>) -> Self {
        Self {
            origin: Origin::new(center),
            radius: MEAN_EARTH_RADIUS_M,
        }
    }
}

impl Projection for LambertEqualArea {
    fn forward(&self, coord: Coord<f64>) -> Coord<f64> {
        let (cos_c, x, y) = self.origin.terms(coord);
        // Antipode is a singularity; pin it to the outer rim.
        let k = (2.0 / (1.0 + cos_c).max(EPSILON)).sqrt();
        Coord {
            x: self.radius * k * x,
            y: self.radius * k * y,
        }
    }

    fn inverse(&self, coord: Coord<f64>) -> Coord<f64> {
        let rho = coord.x.hypot(coord.y);
        let c = 2.0 * (rho / (2.0 * self.radius)).clamp(-1.0, 1.0).asin();
        self.origin.invert(coord.x, coord.y, rho, c)
    }
}
