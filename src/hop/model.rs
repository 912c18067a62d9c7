use crate::foundation::core::{Point, Polyline, Rect};

/// Label offset for stops listed in the "offset below" set.
pub const LABEL_OFFSET_BELOW: f64 = -14.0;
/// Label offset for every other stop.
pub const LABEL_OFFSET_DEFAULT: f64 = 7.0;

/// Horizontal anchoring of a stop label relative to its position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlignment {
    /// Text starts at the stop.
    Left,
    /// Text ends at the stop.
    Right,
    /// Text is centered on the stop.
    #[default]
    Center,
}

/// Where a stop's label is drawn.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct LabelPlacement {
    /// Vertical offset in display units; negative is below the stop.
    pub y_offset: f64,
    /// Horizontal anchoring.
    pub alignment: HorizontalAlignment,
}

impl Default for LabelPlacement {
    fn default() -> Self {
        Self {
            y_offset: LABEL_OFFSET_DEFAULT,
            alignment: HorizontalAlignment::Center,
        }
    }
}

/// A named, ordered waypoint on the tour.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Stop {
    /// Unique sequence number defining tour order.
    pub sequence: i64,
    /// Display name.
    pub name: String,
    /// Position in the tour's spatial reference.
    pub position: Point,
    /// Derived label placement.
    pub label: LabelPlacement,
}

/// One directed leg of the tour between two consecutive stops.
#[derive(Clone, Debug, PartialEq)]
pub struct Hop {
    /// Stop the hop leaves from.
    pub origin: Stop,
    /// Stop the hop arrives at; the next hop's origin.
    pub destination: Stop,
    /// Authoritative geometry: the recorded route or a straight line.
    pub display_path: Polyline,
    /// Geometry walked during animation, densified for smooth interpolation.
    pub animation_path: Polyline,
}

impl Hop {
    /// Bounds of the display path, falling back to the two stop positions.
    pub fn bounds(&self) -> Rect {
        self.display_path.bounds().unwrap_or_else(|| {
            Rect::from_points(self.origin.position, self.destination.position)
        })
    }
}
