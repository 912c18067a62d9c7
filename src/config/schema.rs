use std::collections::BTreeSet;
use std::time::Duration;

use crate::foundation::error::{TourError, TourResult};
use crate::foundation::spatial::SpatialReference;

/// Effective tour configuration.
///
/// Deserializes from camelCase JSON; every field is optional and falls back to
/// [`TourConfig::default`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TourConfig {
    /// Follow the recorded route instead of great-circle lines. `None` derives
    /// it from whether a route source is configured.
    pub use_actual_route: Option<bool>,
    /// Animate automatically once loaded and the display is idle.
    pub auto_start: bool,
    /// Delay before an automatic start, in milliseconds.
    #[serde(rename = "autoStartDelay")]
    pub auto_start_delay_ms: u64,
    /// Reference for all tour geometry. `None` adopts the display's.
    pub spatial_reference: Option<SpatialReference>,
    /// Where stops and route points come from.
    pub data: DataConfig,
    /// Pace of the animation.
    pub animation: AnimationConfig,
    /// Per-stop label overrides.
    pub label_positions: LabelPositions,
}

/// Record sources and the fields read from them.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataConfig {
    /// Locator of the stop records.
    #[serde(alias = "stopServiceURL")]
    pub stop_source: Option<String>,
    /// Layer id appended to a route-result locator for stops.
    pub stop_layer_id: u32,
    /// Field holding a stop's display name.
    pub stop_name_field: String,
    /// Field holding a stop's sequence number.
    pub stop_sequence_field: String,
    /// Locator of the recorded route points.
    #[serde(alias = "trackServiceURL")]
    pub route_source: Option<String>,
    /// Layer id appended to a route-result locator for route points.
    #[serde(alias = "trackLayerID")]
    pub route_layer_id: u32,
    /// Field holding a route point's sequence number.
    #[serde(alias = "trackSequenceField")]
    pub route_sequence_field: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            stop_source: None,
            stop_layer_id: 1,
            stop_name_field: "Name".to_string(),
            stop_sequence_field: "Sequence".to_string(),
            route_source: None,
            route_layer_id: 3,
            route_sequence_field: "Sequence".to_string(),
        }
    }
}

/// Total duration and frame budget of a tour.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationConfig {
    /// Whole-tour duration in seconds, shared evenly between hops.
    #[serde(rename = "duration")]
    pub duration_secs: f64,
    /// Frames per second the animation path is densified for.
    #[serde(alias = "maxFPS")]
    pub target_frame_rate: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_secs: 30.0,
            target_frame_rate: 30.0,
        }
    }
}

/// Sequence numbers of stops whose labels leave the default placement.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelPositions {
    /// Labels drawn below the stop.
    pub offset_below: BTreeSet<i64>,
    /// Labels anchored left. Wins over `right_align`.
    pub left_align: BTreeSet<i64>,
    /// Labels anchored right.
    pub right_align: BTreeSet<i64>,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            use_actual_route: None,
            auto_start: false,
            auto_start_delay_ms: 0,
            spatial_reference: None,
            data: DataConfig::default(),
            animation: AnimationConfig::default(),
            label_positions: LabelPositions::default(),
        }
    }
}

impl TourConfig {
    /// Load a configuration from a JSON file.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> TourResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            TourError::configuration(format!("read config '{}': {e}", path.display()))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            TourError::configuration(format!("parse config '{}': {e}", path.display()))
        })
    }

    /// Whether hops follow the recorded route.
    pub fn use_actual_route(&self) -> bool {
        self.use_actual_route
            .unwrap_or(self.data.route_source.is_some())
    }

    /// Whole-tour duration.
    pub fn animation_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.animation.duration_secs).unwrap_or_default()
    }

    /// Delay before an automatic start.
    pub fn auto_start_delay(&self) -> Duration {
        Duration::from_millis(self.auto_start_delay_ms)
    }

    /// Check that the configuration can drive a tour.
    pub fn validate(&self) -> TourResult<()> {
        match &self.data.stop_source {
            Some(s) if !s.trim().is_empty() => {}
            _ => {
                return Err(TourError::configuration(
                    "no stop source configured; set stopSource or pass stopServiceURL/agolRouteResultURL",
                ));
            }
        }
        if self.use_actual_route == Some(true) && self.data.route_source.is_none() {
            return Err(TourError::configuration(
                "useActualRoute is set but no route source is configured",
            ));
        }
        let duration = self.animation.duration_secs;
        if !(duration.is_finite() && duration > 0.0) {
            return Err(TourError::configuration(
                "animation duration must be a positive number of seconds",
            ));
        }
        if Duration::try_from_secs_f64(duration).is_err() {
            return Err(TourError::configuration(format!(
                "animation duration of {duration} seconds is out of range"
            )));
        }
        let fps = self.animation.target_frame_rate;
        if !(fps.is_finite() && fps > 0.0) {
            return Err(TourError::configuration(
                "target frame rate must be a positive number",
            ));
        }
        if self.data.stop_name_field.is_empty() || self.data.stop_sequence_field.is_empty() {
            return Err(TourError::configuration("stop field names must be non-empty"));
        }
        if let Some(sr) = self.spatial_reference {
            sr.validate()?;
        }
        Ok(())
    }
}
