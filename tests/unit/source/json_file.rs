use super::*;

fn fixtures() -> JsonFileSource {
    JsonFileSource::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures"))
}

#[tokio::test]
async fn reads_orders_and_filters_stop_features() {
    let query = Query::all("trip/stops.json", SpatialReference::WGS84)
        .with_out_fields(["Name", "Sequence"])
        .ordered_by("Sequence");
    let records = fixtures().query(&query).await.unwrap();

    let names: Vec<_> = records
        .iter()
        .filter_map(|r| r.text_attribute("Name"))
        .collect();
    assert_eq!(names, ["Oakland", "Reno", "Salt Lake City", "Denver"]);
    assert!(records.iter().all(|r| !r.has_field("Notes")));
    assert_eq!(
        records[0].geometry,
        Some(Geometry::Point(Point::new(-122.2711, 37.8044)))
    );
}

#[tokio::test]
async fn endpoint_without_extension_falls_back_to_json_file() {
    let query = Query::all("trip/route", SpatialReference::WGS84).ordered_by("Sequence");
    let records = fixtures().query(&query).await.unwrap();
    assert_eq!(records.len(), 9);
    assert!(matches!(records[3].geometry, Some(Geometry::Polyline(_))));
    assert_eq!(records[5].geometry, None);
}

#[tokio::test]
async fn reprojects_into_requested_reference() {
    let query = Query::all("trip/stops.json", SpatialReference::WEB_MERCATOR).ordered_by("Sequence");
    let records = fixtures().query(&query).await.unwrap();
    let Some(Geometry::Point(p)) = &records[0].geometry else {
        panic!("expected a point");
    };
    // Oakland sits roughly 13.6 million metres west of the prime meridian.
    assert!(p.x < -13_500_000.0 && p.x > -13_700_000.0);
}

#[tokio::test]
async fn missing_file_is_a_query_error() {
    let err = fixtures()
        .query(&Query::all("trip/nope", SpatialReference::WGS84))
        .await
        .unwrap_err();
    assert!(matches!(err, TourError::Query(_)));
}
