use geo::{Distance, Geodesic, InterpolatePoint};

use crate::foundation::core::{Point, Polyline};
use crate::foundation::spatial::SpatialReference;

const MAX_DENSIFY_SEGMENTS: usize = 100_000;

fn lon_lat(p: Point, sr: SpatialReference) -> geo::Point {
    let ll = sr.to_lon_lat(p);
    geo::Point::new(ll.x, ll.y)
}

/// Length in metres of the geodesic between `a` and `b`, both given in `sr`.
pub fn geodesic_length(a: Point, b: Point, sr: SpatialReference) -> f64 {
    Geodesic.distance(lon_lat(a, sr), lon_lat(b, sr))
}

/// Straight line from `a` to `b` following the geodesic, with vertices no more
/// than `max_segment_m` metres apart.
///
/// The result always starts at `a` and ends at `b` exactly; intermediate
/// vertices are computed on the ellipsoid and projected back into `sr`.
pub fn densify_geodesic(a: Point, b: Point, sr: SpatialReference, max_segment_m: f64) -> Polyline {
    let length = geodesic_length(a, b, sr);
    let segments = if length > 0.0 && max_segment_m > 0.0 && max_segment_m.is_finite() {
        ((length / max_segment_m).ceil() as usize).clamp(1, MAX_DENSIFY_SEGMENTS)
    } else {
        1
    };
    densify_geodesic_segments(a, b, sr, segments)
}

/// Geodesic line from `a` to `b` split into `segments` equal-length pieces.
///
/// A line that crosses the antimeridian is split there into two parts, one
/// ending on the map edge and one starting on the opposite edge, so no segment
/// spans the width of the map.
pub fn densify_geodesic_segments(
    a: Point,
    b: Point,
    sr: SpatialReference,
    segments: usize,
) -> Polyline {
    if a == b {
        return Polyline::straight(a, b);
    }
    let segments = segments.max(1);
    let start = lon_lat(a, sr);
    let end = lon_lat(b, sr);

    // (lon/lat, position in `sr`) per vertex; the endpoints stay exact.
    let mut vertices = Vec::with_capacity(segments + 1);
    vertices.push((sr.to_lon_lat(a), a));
    for i in 1..segments {
        let ratio = i as f64 / segments as f64;
        let mid = Geodesic.point_at_ratio_between(start, end, ratio);
        let ll = Point::new(mid.x(), mid.y());
        vertices.push((ll, sr.from_lon_lat(ll)));
    }
    vertices.push((sr.to_lon_lat(b), b));

    let mut parts = Vec::new();
    let mut current = vec![a];
    for pair in vertices.windows(2) {
        let ((p, _), (q, q_sr)) = (pair[0], pair[1]);
        let dlon = q.x - p.x;
        if dlon.abs() > 180.0 {
            // Heading east past +180 wraps to a large negative step.
            let (edge, unwrapped) = if dlon < 0.0 {
                (180.0, q.x + 360.0)
            } else {
                (-180.0, q.x - 360.0)
            };
            let t = (edge - p.x) / (unwrapped - p.x);
            let lat = p.y + t * (q.y - p.y);
            current.push(sr.from_lon_lat(Point::new(edge, lat)));
            parts.push(std::mem::take(&mut current));
            current.push(sr.from_lon_lat(Point::new(-edge, lat)));
        }
        current.push(q_sr);
    }
    parts.push(current);
    Polyline::new(parts)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/geodesic.rs"]
mod tests;
