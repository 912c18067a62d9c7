use super::*;

fn stops_only() -> TourOverrides {
    TourOverrides {
        stop_source: Some("trip/stops".to_string()),
        ..TourOverrides::default()
    }
}

#[test]
fn missing_stop_source_is_a_configuration_error() {
    let err = ConfigProvider::default()
        .resolve(&TourOverrides::default())
        .unwrap_err();
    assert!(matches!(err, TourError::Configuration(_)));
}

#[test]
fn defaults_fill_everything_else() {
    let config = ConfigProvider::default().resolve(&stops_only()).unwrap();
    assert_eq!(config.animation.duration_secs, 30.0);
    assert_eq!(config.animation.target_frame_rate, 30.0);
    assert_eq!(config.data.stop_name_field, "Name");
    assert_eq!(config.data.route_sequence_field, "Sequence");
    assert!(!config.auto_start);
    assert_eq!(config.use_actual_route, Some(false));
}

#[test]
fn route_result_param_expands_to_both_layers() {
    let params = ExternalParams::parse(["agolRouteResultURL=https://example.test/Trip/FeatureServer/"]);
    let config = ConfigProvider::new(params)
        .resolve(&TourOverrides::default())
        .unwrap();
    assert_eq!(
        config.data.stop_source.as_deref(),
        Some("https://example.test/Trip/FeatureServer/1")
    );
    assert_eq!(
        config.data.route_source.as_deref(),
        Some("https://example.test/Trip/FeatureServer/3")
    );
    assert!(config.use_actual_route());
}

#[test]
fn force_great_circle_drops_the_route_layer() {
    let params = ExternalParams::parse([
        "agolRouteResultURL=https://example.test/Trip",
        "forceGreatCircleArcs=true",
    ]);
    let config = ConfigProvider::new(params)
        .resolve(&TourOverrides::default())
        .unwrap();
    assert_eq!(config.data.route_source, None);
    assert!(!config.use_actual_route());

    // An empty value does not count as set.
    let params = ExternalParams::parse([
        "agolRouteResultURL=https://example.test/Trip",
        "forceGreatCircleArcs",
    ]);
    let config = ConfigProvider::new(params)
        .resolve(&TourOverrides::default())
        .unwrap();
    assert!(config.data.route_source.is_some());
}

#[test]
fn caller_values_beat_params_which_beat_defaults() {
    let params = ExternalParams::parse([
        "stopServiceURL=from-param",
        "stopNameField=Label",
        "stopSequenceField=Order",
    ]);
    let overrides = TourOverrides {
        stop_source: Some("from-caller".to_string()),
        animation_duration_secs: Some(9.0),
        ..TourOverrides::default()
    };
    let config = ConfigProvider::new(params).resolve(&overrides).unwrap();
    assert_eq!(config.data.stop_source.as_deref(), Some("from-caller"));
    assert_eq!(config.data.stop_name_field, "Label");
    assert_eq!(config.data.stop_sequence_field, "Order");
    assert_eq!(config.animation.duration_secs, 9.0);
}

#[test]
fn non_whitelisted_params_are_ignored() {
    let params = ExternalParams::parse(["stopServiceURL=a", "animationDuration=1", "debug"]);
    assert_eq!(params.get("stopServiceURL"), Some("a"));
    assert_eq!(params.get("animationDuration"), None);
    assert_eq!(params.get("debug"), None);
}

#[test]
fn explicit_use_actual_route_wins_over_derivation() {
    let overrides = TourOverrides {
        route_source: Some("trip/route".to_string()),
        use_actual_route: Some(false),
        ..stops_only()
    };
    let config = ConfigProvider::default().resolve(&overrides).unwrap();
    assert!(!config.use_actual_route());

    let overrides = TourOverrides {
        use_actual_route: Some(true),
        ..stops_only()
    };
    let err = ConfigProvider::default().resolve(&overrides).unwrap_err();
    assert!(err.to_string().contains("no route source"));
}

#[test]
fn auto_start_shorthands() {
    let o = TourOverrides::auto_start_after(Duration::from_millis(1500));
    assert_eq!(o.auto_start, Some(true));
    assert_eq!(o.auto_start_delay_ms, Some(1500));
    assert_eq!(TourOverrides::auto_start(false).auto_start, Some(false));
}

#[test]
fn invalid_numbers_are_rejected() {
    let overrides = TourOverrides {
        target_frame_rate: Some(0.0),
        ..stops_only()
    };
    assert!(ConfigProvider::default().resolve(&overrides).is_err());

    let overrides = TourOverrides {
        animation_duration_secs: Some(f64::NAN),
        ..stops_only()
    };
    assert!(ConfigProvider::default().resolve(&overrides).is_err());
}

#[test]
fn durations_beyond_the_representable_range_are_rejected() {
    let overrides = TourOverrides {
        animation_duration_secs: Some(1e20),
        ..stops_only()
    };
    let err = ConfigProvider::default().resolve(&overrides).unwrap_err();
    assert!(matches!(err, TourError::Configuration(_)));
    assert!(err.to_string().contains("out of range"), "{err}");
}

#[test]
fn overrides_deserialize_from_camel_case_json() {
    let o: TourOverrides = serde_json::from_str(
        r#"{"stopSource":"s","maxFPS":60,"animationDuration":12.5,"labelLeftAlign":[1,5],"spatialReference":{"wkid":4326}}"#,
    )
    .unwrap();
    assert_eq!(o.target_frame_rate, Some(60.0));
    assert_eq!(o.animation_duration_secs, Some(12.5));
    assert_eq!(o.label_left_align, Some(BTreeSet::from([1, 5])));
    assert_eq!(o.spatial_reference, Some(SpatialReference::WGS84));
}

#[test]
fn config_deserializes_with_legacy_names() {
    let c: TourConfig = serde_json::from_str(
        r#"{"data":{"stopServiceURL":"s","trackServiceURL":"r"},"animation":{"duration":9,"maxFPS":24},"labelPositions":{"offsetBelow":[3]}}"#,
    )
    .unwrap();
    assert_eq!(c.data.stop_source.as_deref(), Some("s"));
    assert_eq!(c.data.route_source.as_deref(), Some("r"));
    assert_eq!(c.animation.target_frame_rate, 24.0);
    assert!(c.label_positions.offset_below.contains(&3));
    assert!(c.use_actual_route());
    assert!(c.validate().is_ok());
}
