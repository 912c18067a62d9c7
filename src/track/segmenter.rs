use crate::foundation::core::{Point, Polyline};
use crate::foundation::error::{TourError, TourResult};
use crate::source::{Geometry, Record};

/// A raw route point: its sequence number and optional geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutePoint {
    /// Position in the recorded route.
    pub sequence: i64,
    /// `None` marks a record with no geometry.
    pub geometry: Option<Geometry>,
}

impl RoutePoint {
    /// Route point with a position.
    pub fn at(sequence: i64, p: Point) -> Self {
        Self {
            sequence,
            geometry: Some(Geometry::Point(p)),
        }
    }

    /// Route point without geometry.
    pub fn absent(sequence: i64) -> Self {
        Self {
            sequence,
            geometry: None,
        }
    }

    /// Read a route point from a record, taking its sequence from `sequence_field`.
    pub fn from_record(record: &Record, sequence_field: &str) -> TourResult<Self> {
        let sequence = record.int_attribute(sequence_field).ok_or_else(|| {
            TourError::validation(format!(
                "route record is missing an integer '{sequence_field}' field"
            ))
        })?;
        Ok(Self {
            sequence,
            geometry: record.geometry.clone(),
        })
    }
}

/// A contiguous run of route points that becomes one hop's path.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutePointBatch {
    /// Sequence number of the first point in the run.
    pub first_sequence: i64,
    /// Sequence number of the last point in the run.
    pub last_sequence: i64,
    parts: Vec<Vec<Point>>,
    // Whether the last part is still being extended by point records.
    point_run: bool,
}

impl RoutePointBatch {
    fn open(sequence: i64) -> Self {
        Self {
            first_sequence: sequence,
            last_sequence: sequence,
            parts: Vec::new(),
            point_run: false,
        }
    }

    fn push(&mut self, sequence: i64, geometry: &Geometry) {
        self.last_sequence = sequence;
        match geometry {
            Geometry::Point(p) => match self.parts.last_mut() {
                Some(part) if self.point_run => part.push(*p),
                _ => {
                    self.parts.push(vec![*p]);
                    self.point_run = true;
                }
            },
            Geometry::Polyline(line) => {
                self.parts
                    .extend(line.paths.iter().filter(|p| !p.is_empty()).cloned());
                self.point_run = false;
            }
        }
    }

    /// Path accumulated for this run.
    pub fn path(&self) -> Polyline {
        Polyline::new(self.parts.clone())
    }

    fn into_path(self) -> Polyline {
        Polyline::new(self.parts)
    }
}

/// Group ordered route points into runs.
///
/// A run opens at the first point carrying geometry and closes when the next
/// sequence number jumps by more than one, when a point without geometry is
/// seen, or at the end of input. Runs with no vertices are dropped. Input with
/// fewer than two points yields no runs.
pub fn segment_batches(points: &[RoutePoint]) -> Vec<RoutePointBatch> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut batches = Vec::new();
    let mut open: Option<RoutePointBatch> = None;

    for point in points {
        if let Some(batch) = open.take() {
            let gap = point.sequence.saturating_sub(batch.last_sequence);
            if gap > 1 || point.geometry.is_none() {
                batches.push(batch);
            } else {
                open = Some(batch);
            }
        }

        if let Some(geometry) = &point.geometry {
            open.get_or_insert_with(|| RoutePointBatch::open(point.sequence))
                .push(point.sequence, geometry);
        }
    }
    batches.extend(open);

    batches.retain(|b| !b.parts.is_empty());
    batches
}

/// Split ordered route points into per-hop paths. See [`segment_batches`].
pub fn segment(points: &[RoutePoint]) -> Vec<Polyline> {
    segment_batches(points)
        .into_iter()
        .map(RoutePointBatch::into_path)
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/track/segmenter.rs"]
mod tests;
