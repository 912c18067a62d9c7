use std::collections::BTreeSet;
use std::time::Duration;

use crate::config::schema::{LabelPositions, TourConfig};
use crate::foundation::core::Polyline;
use crate::foundation::error::{TourError, TourResult};
use crate::foundation::spatial::SpatialReference;
use crate::geometry::geodesic::densify_geodesic_segments;
use crate::hop::model::{
    HorizontalAlignment, Hop, LABEL_OFFSET_BELOW, LABEL_OFFSET_DEFAULT, LabelPlacement, Stop,
};
use crate::source::{Geometry, Record};

const MAX_FRAMES_PER_HOP: f64 = 100_000.0;

/// Label placement for the stop with `sequence`.
///
/// Left alignment wins when a stop is listed in both alignment sets.
pub fn label_placement(sequence: i64, positions: &LabelPositions) -> LabelPlacement {
    let y_offset = if positions.offset_below.contains(&sequence) {
        LABEL_OFFSET_BELOW
    } else {
        LABEL_OFFSET_DEFAULT
    };
    let alignment = if positions.left_align.contains(&sequence) {
        HorizontalAlignment::Left
    } else if positions.right_align.contains(&sequence) {
        HorizontalAlignment::Right
    } else {
        HorizontalAlignment::Center
    };
    LabelPlacement {
        y_offset,
        alignment,
    }
}

/// Turns stop records and route segments into the ordered hop list.
#[derive(Clone, Debug)]
pub struct HopBuilder {
    name_field: String,
    sequence_field: String,
    labels: LabelPositions,
    use_actual_route: bool,
    duration: Duration,
    target_frame_rate: f64,
    spatial_reference: SpatialReference,
}

impl HopBuilder {
    /// Builder for `config`, producing geometry in `spatial_reference`.
    pub fn new(config: &TourConfig, spatial_reference: SpatialReference) -> Self {
        Self {
            name_field: config.data.stop_name_field.clone(),
            sequence_field: config.data.stop_sequence_field.clone(),
            labels: config.label_positions.clone(),
            use_actual_route: config.use_actual_route(),
            duration: config.animation_duration(),
            target_frame_rate: config.animation.target_frame_rate,
            spatial_reference,
        }
    }

    /// Validate stop records and turn them into stops ordered by sequence.
    pub fn build_stops(&self, records: &[Record]) -> TourResult<Vec<Stop>> {
        if records.is_empty() {
            return Err(TourError::validation(
                "no stops were returned by the stop source",
            ));
        }

        let mut seen = BTreeSet::new();
        let mut stops = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if !record.has_field(&self.name_field) {
                return Err(TourError::validation(format!(
                    "stop record {i} is missing the name field '{}'",
                    self.name_field
                )));
            }
            let sequence = record.int_attribute(&self.sequence_field).ok_or_else(|| {
                TourError::validation(format!(
                    "stop record {i} is missing an integer sequence field '{}'",
                    self.sequence_field
                ))
            })?;
            let position = match &record.geometry {
                Some(Geometry::Point(p)) => *p,
                _ => {
                    return Err(TourError::validation(format!(
                        "stop {sequence} has no point geometry"
                    )));
                }
            };
            if !seen.insert(sequence) {
                return Err(TourError::validation(format!(
                    "stop sequence {sequence} appears more than once"
                )));
            }
            stops.push(Stop {
                sequence,
                name: record.text_attribute(&self.name_field).unwrap_or_default(),
                position,
                label: label_placement(sequence, &self.labels),
            });
        }
        stops.sort_by_key(|s| s.sequence);
        Ok(stops)
    }

    /// Frames available to each hop: the tour duration split evenly across
    /// hops, times the target frame rate.
    pub fn frames_per_hop(&self, stop_count: usize) -> f64 {
        let hops = stop_count.saturating_sub(1).max(1) as f64;
        self.duration.as_secs_f64() / hops * self.target_frame_rate
    }

    /// Build one hop per consecutive pair of stops.
    ///
    /// With the actual route in use, `segments` supplies each hop's path and
    /// must hold exactly one segment per hop. Without route data the hops fall
    /// back to geodesic lines densified to one vertex per frame.
    #[tracing::instrument(skip_all, fields(stops = stops.len()))]
    pub fn build(&self, stops: &[Stop], segments: Option<&[Polyline]>) -> TourResult<Vec<Hop>> {
        let hop_count = stops.len().saturating_sub(1);
        if hop_count == 0 {
            return Ok(Vec::new());
        }

        let route = match segments {
            Some(segments) if self.use_actual_route && !segments.is_empty() => {
                if segments.len() != hop_count {
                    return Err(TourError::validation(format!(
                        "route has {} segments but the tour has {hop_count} hops",
                        segments.len()
                    )));
                }
                Some(segments)
            }
            Some(_) if self.use_actual_route => {
                tracing::warn!("route source returned no segments, using great-circle hops");
                None
            }
            _ => None,
        };

        let frames = self.frames_per_hop(stops.len());
        let densify_segments = if frames.is_finite() {
            frames.ceil().clamp(1.0, MAX_FRAMES_PER_HOP) as usize
        } else {
            1
        };

        let hops = stops
            .windows(2)
            .enumerate()
            .map(|(i, pair)| {
                let (origin, destination) = (&pair[0], &pair[1]);
                let (display_path, animation_path) = match route {
                    Some(segments) => (segments[i].clone(), segments[i].clone()),
                    None => (
                        Polyline::straight(origin.position, destination.position),
                        densify_geodesic_segments(
                            origin.position,
                            destination.position,
                            self.spatial_reference,
                            densify_segments,
                        ),
                    ),
                };
                Hop {
                    origin: origin.clone(),
                    destination: destination.clone(),
                    display_path,
                    animation_path,
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            hops = hops.len(),
            actual_route = route.is_some(),
            frames_per_hop = frames,
            "built hops"
        );
        Ok(hops)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/hop/builder.rs"]
mod tests;
