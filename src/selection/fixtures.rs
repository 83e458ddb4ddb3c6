//! Synthetic regions laid out at known distances from a center.

use geo::{Coord, LineString, MultiPolygon, Point, Polygon};

use crate::geodesy::{AzimuthalEquidistant, Projection};
use crate::models::Region;

pub const CENTER: (f64, f64) = (-61.5, -31.25);

pub fn center() -> Point<f64> {
    Point::new(CENTER.0, CENTER.1)
}

/// Square of side `2 * half_km` whose center sits `distance_km` from
/// `center` along `bearing_deg`, with one edge facing the center.
pub fn square_at(
    name: &str,
    center: Point<f64>,
    bearing_deg: f64,
    distance_km: f64,
    half_km: f64,
) -> Region {
    let aeqd = AzimuthalEquidistant::new(center);
    let theta = bearing_deg.to_radians();
    // Radial unit vector (east = x, north = y) and its perpendicular
    let (ux, uy) = (theta.sin(), theta.cos());
    let (vx, vy) = (-uy, ux);
    let d = distance_km * 1000.0;
    let h = half_km * 1000.0;

    let corners = [(-h, -h), (h, -h), (h, h), (-h, h)];
    let mut ring = Vec::new();
    for i in 0..4 {
        let (a0, b0) = corners[i];
        let (a1, b1) = corners[(i + 1) % 4];
        for step in 0..10 {
            let t = step as f64 / 10.0;
            let a = a0 + (a1 - a0) * t;
            let b = b0 + (b1 - b0) * t;
            let planar = Coord {
                x: ux * (d + a) + vx * b,
                y: uy * (d + a) + vy * b,
            };
            ring.push(aeqd.inverse(planar));
        }
    }
    ring.push(ring[0]);

    Region::new(
        name,
        "SANTA FE",
        MultiPolygon::new(vec![Polygon::new(LineString::new(ring), vec![])]),
    )
}

/// Five regions with centroids at 10, 40, 60, 55 and 200 km. The 60 km and
/// 55 km squares are large enough to reach 45 km from the center.
pub fn five_regions() -> Vec<Region> {
    let c = center();
    vec![
        square_at("d10", c, 0.0, 10.0, 3.0),
        square_at("d40", c, 90.0, 40.0, 3.0),
        square_at("d60", c, 180.0, 60.0, 15.0),
        square_at("d55", c, 270.0, 55.0, 10.0),
        square_at("d200", c, 45.0, 200.0, 10.0),
    ]
}
