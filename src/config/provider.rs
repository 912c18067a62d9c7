use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use crate::config::schema::TourConfig;
use crate::foundation::error::{TourError, TourResult};
use crate::foundation::spatial::SpatialReference;

/// Parameter naming a saved route result; expands to its stop and route layers.
pub const PARAM_ROUTE_RESULT: &str = "agolRouteResultURL";
/// Parameter naming the stop source directly.
pub const PARAM_STOP_SOURCE: &str = "stopServiceURL";
/// Parameter overriding the stop name field.
pub const PARAM_STOP_NAME_FIELD: &str = "stopNameField";
/// Parameter overriding the stop sequence field.
pub const PARAM_STOP_SEQUENCE_FIELD: &str = "stopSequenceField";
/// Parameter that drops the route layer of a route result.
pub const PARAM_FORCE_GREAT_CIRCLE: &str = "forceGreatCircleArcs";

const WHITELIST: [&str; 5] = [
    PARAM_ROUTE_RESULT,
    PARAM_STOP_SOURCE,
    PARAM_STOP_NAME_FIELD,
    PARAM_STOP_SEQUENCE_FIELD,
    PARAM_FORCE_GREAT_CIRCLE,
];

/// Whitelisted, externally supplied named parameters (for example from a page
/// URL or the command line). Names outside the whitelist are dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExternalParams {
    values: BTreeMap<String, String>,
}

impl ExternalParams {
    /// Collect `(name, value)` pairs, keeping only whitelisted names.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut values = BTreeMap::new();
        for (k, v) in pairs {
            let k = k.into();
            if WHITELIST.contains(&k.as_str()) {
                values.insert(k, v.into());
            } else {
                tracing::debug!(param = %k, "ignoring parameter outside the whitelist");
            }
        }
        Self { values }
    }

    /// Parse `name=value` strings. A bare `name` has an empty value.
    pub fn parse<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_pairs(items.into_iter().map(|item| {
            let item = item.as_ref();
            match item.split_once('=') {
                Some((k, v)) => (k.trim().to_string(), v.trim().to_string()),
                None => (item.trim().to_string(), String::new()),
            }
        }))
    }

    /// Non-empty value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// `true` when `name` has a value other than `false`/`0`.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name)
            .is_some_and(|v| !matches!(v.to_ascii_lowercase().as_str(), "false" | "0"))
    }
}

/// Caller-supplied settings. Every field left `None` falls through to external
/// parameters and then to defaults.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TourOverrides {
    /// Follow the recorded route.
    pub use_actual_route: Option<bool>,
    /// Start animating once ready.
    pub auto_start: Option<bool>,
    /// Auto-start delay in milliseconds.
    #[serde(rename = "autoStartDelay")]
    pub auto_start_delay_ms: Option<u64>,
    /// Whole-tour duration in seconds.
    #[serde(rename = "animationDuration")]
    pub animation_duration_secs: Option<f64>,
    /// Frames per second for densification.
    #[serde(alias = "maxFPS")]
    pub target_frame_rate: Option<f64>,
    /// Stop record locator.
    pub stop_source: Option<String>,
    /// Stop name field.
    pub stop_name_field: Option<String>,
    /// Stop sequence field.
    pub stop_sequence_field: Option<String>,
    /// Route record locator.
    pub route_source: Option<String>,
    /// Route sequence field.
    pub route_sequence_field: Option<String>,
    /// Stops labelled below.
    pub label_offset_below: Option<BTreeSet<i64>>,
    /// Stops labelled left-aligned.
    pub label_left_align: Option<BTreeSet<i64>>,
    /// Stops labelled right-aligned.
    pub label_right_align: Option<BTreeSet<i64>>,
    /// Reference for tour geometry.
    pub spatial_reference: Option<SpatialReference>,
}

impl TourOverrides {
    /// Only toggle automatic start.
    pub fn auto_start(enabled: bool) -> Self {
        Self {
            auto_start: Some(enabled),
            ..Self::default()
        }
    }

    /// Start automatically after `delay`.
    pub fn auto_start_after(delay: Duration) -> Self {
        Self {
            auto_start: Some(true),
            auto_start_delay_ms: Some(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)),
            ..Self::default()
        }
    }

    /// Load overrides from a JSON file.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> TourResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            TourError::configuration(format!("read overrides '{}': {e}", path.display()))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            TourError::configuration(format!("parse overrides '{}': {e}", path.display()))
        })
    }
}

/// Resolves the effective [`TourConfig`]: caller overrides beat external
/// parameters, which beat built-in defaults.
#[derive(Clone, Debug, Default)]
pub struct ConfigProvider {
    params: ExternalParams,
}

impl ConfigProvider {
    /// Provider consulting `params` between defaults and caller values.
    pub fn new(params: ExternalParams) -> Self {
        Self { params }
    }

    /// Built-in defaults, before any parameter or override is applied.
    pub fn defaults() -> TourConfig {
        TourConfig::default()
    }

    /// Resolve and validate the configuration.
    pub fn resolve(&self, overrides: &TourOverrides) -> TourResult<TourConfig> {
        let mut config = Self::defaults();
        self.apply_params(&mut config);
        apply_overrides(&mut config, overrides);

        if config.use_actual_route.is_none() {
            config.use_actual_route = Some(config.data.route_source.is_some());
        }
        config.validate()?;

        tracing::debug!(
            stop_source = config.data.stop_source.as_deref().unwrap_or_default(),
            route_source = config.data.route_source.as_deref().unwrap_or_default(),
            use_actual_route = config.use_actual_route(),
            "resolved tour configuration"
        );
        Ok(config)
    }

    fn apply_params(&self, config: &mut TourConfig) {
        let data = &mut config.data;
        if let Some(base) = self.params.get(PARAM_ROUTE_RESULT) {
            let base = base.trim_end_matches('/');
            data.stop_source = Some(format!("{base}/{}", data.stop_layer_id));
            if !self.params.flag(PARAM_FORCE_GREAT_CIRCLE) {
                data.route_source = Some(format!("{base}/{}", data.route_layer_id));
            }
            return;
        }
        if let Some(v) = self.params.get(PARAM_STOP_SOURCE) {
            data.stop_source = Some(v.to_string());
        }
        if let Some(v) = self.params.get(PARAM_STOP_NAME_FIELD) {
            data.stop_name_field = v.to_string();
        }
        if let Some(v) = self.params.get(PARAM_STOP_SEQUENCE_FIELD) {
            data.stop_sequence_field = v.to_string();
        }
    }
}

fn apply_overrides(config: &mut TourConfig, o: &TourOverrides) {
    if let Some(v) = o.use_actual_route {
        config.use_actual_route = Some(v);
    }
    if let Some(v) = o.auto_start {
        config.auto_start = v;
    }
    if let Some(v) = o.auto_start_delay_ms {
        config.auto_start_delay_ms = v;
    }
    if let Some(v) = o.animation_duration_secs {
        config.animation.duration_secs = v;
    }
    if let Some(v) = o.target_frame_rate {
        config.animation.target_frame_rate = v;
    }
    if let Some(v) = &o.stop_source {
        config.data.stop_source = Some(v.clone());
    }
    if let Some(v) = &o.stop_name_field {
        config.data.stop_name_field = v.clone();
    }
    if let Some(v) = &o.stop_sequence_field {
        config.data.stop_sequence_field = v.clone();
    }
    if let Some(v) = &o.route_source {
        config.data.route_source = Some(v.clone());
    }
    if let Some(v) = &o.route_sequence_field {
        config.data.route_sequence_field = v.clone();
    }
    if let Some(v) = &o.label_offset_below {
        config.label_positions.offset_below = v.clone();
    }
    if let Some(v) = &o.label_left_align {
        config.label_positions.left_align = v.clone();
    }
    if let Some(v) = &o.label_right_align {
        config.label_positions.right_align = v.clone();
    }
    if let Some(v) = o.spatial_reference {
        config.spatial_reference = Some(v);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/provider.rs"]
mod tests;
