pub use kurbo::{Point, Rect};

/// A multi-part polyline: an ordered sequence of disjoint paths.
///
/// Every geometry that flows through the tour pipeline (route segments, hop
/// paths, partially drawn frames) uses this shape. Coordinates are planar and
/// expressed in the tour's [`SpatialReference`](crate::SpatialReference).
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Polyline {
    /// Ordered paths, each an ordered list of vertices.
    pub paths: Vec<Vec<Point>>,
}

impl Polyline {
    /// Build a polyline from its parts. Empty parts are dropped.
    pub fn new(paths: Vec<Vec<Point>>) -> Self {
        Self {
            paths: paths.into_iter().filter(|p| !p.is_empty()).collect(),
        }
    }

    /// Build a single-part polyline.
    pub fn from_points(points: Vec<Point>) -> Self {
        Self::new(vec![points])
    }

    /// Two-vertex polyline from `a` to `b`.
    pub fn straight(a: Point, b: Point) -> Self {
        Self::from_points(vec![a, b])
    }

    /// `true` when the polyline has no vertices at all.
    pub fn is_empty(&self) -> bool {
        self.paths.iter().all(Vec::is_empty)
    }

    /// Total number of vertices across all parts.
    pub fn vertex_count(&self) -> usize {
        self.paths.iter().map(Vec::len).sum()
    }

    /// Euclidean length summed over every part.
    pub fn planar_length(&self) -> f64 {
        self.paths.iter().map(|p| path_length(p)).sum()
    }

    /// Axis-aligned bounds of all vertices, or `None` for an empty polyline.
    pub fn bounds(&self) -> Option<Rect> {
        let mut points = self.paths.iter().flatten();
        let first = *points.next()?;
        Some(points.fold(Rect::from_points(first, first), |r, p| r.union_pt(*p)))
    }

    /// Append the parts of `other` after the existing parts.
    pub fn append(&mut self, other: Polyline) {
        self.paths
            .extend(other.paths.into_iter().filter(|p| !p.is_empty()));
    }

    /// First vertex of the first part.
    pub fn first_point(&self) -> Option<Point> {
        self.paths.iter().flatten().next().copied()
    }

    /// Last vertex of the last part.
    pub fn last_point(&self) -> Option<Point> {
        self.paths.iter().rev().flat_map(|p| p.last()).next().copied()
    }
}

/// Euclidean length of a single path.
pub fn path_length(path: &[Point]) -> f64 {
    path.windows(2).map(|w| w[0].distance(w[1])).sum()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
