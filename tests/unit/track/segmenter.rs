use super::*;

fn pts(seqs: &[i64]) -> Vec<RoutePoint> {
    seqs.iter()
        .map(|&s| RoutePoint::at(s, Point::new(s as f64, 0.0)))
        .collect()
}

fn xs(line: &Polyline) -> Vec<i64> {
    line.paths.iter().flatten().map(|p| p.x as i64).collect()
}

#[test]
fn gaps_split_runs() {
    let segments = segment(&pts(&[1, 2, 3, 6, 7, 9]));
    let runs: Vec<_> = segments.iter().map(xs).collect();
    assert_eq!(runs, vec![vec![1, 2, 3], vec![6, 7], vec![9]]);
}

#[test]
fn batches_report_their_sequence_span() {
    let batches = segment_batches(&pts(&[1, 2, 3, 6, 7, 9]));
    let spans: Vec<_> = batches
        .iter()
        .map(|b| (b.first_sequence, b.last_sequence))
        .collect();
    assert_eq!(spans, vec![(1, 3), (6, 7), (9, 9)]);
}

#[test]
fn degenerate_inputs_yield_nothing() {
    assert!(segment(&[]).is_empty());
    assert!(segment(&pts(&[4])).is_empty());
}

#[test]
fn absent_geometry_closes_a_run() {
    let mut points = pts(&[1, 2]);
    points.push(RoutePoint::absent(3));
    points.extend(pts(&[4, 5]));
    let runs: Vec<_> = segment(&points).iter().map(xs).collect();
    assert_eq!(runs, vec![vec![1, 2], vec![4, 5]]);
}

#[test]
fn leading_and_repeated_absent_points_are_skipped() {
    let points = vec![
        RoutePoint::absent(1),
        RoutePoint::absent(2),
        RoutePoint::at(3, Point::new(3.0, 0.0)),
        RoutePoint::absent(4),
        RoutePoint::absent(5),
    ];
    let runs: Vec<_> = segment(&points).iter().map(xs).collect();
    assert_eq!(runs, vec![vec![3]]);
}

#[test]
fn polyline_records_contribute_their_parts() {
    let points = vec![
        RoutePoint {
            sequence: 1,
            geometry: Some(Geometry::Polyline(Polyline::from_points(vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
            ]))),
        },
        RoutePoint {
            sequence: 2,
            geometry: Some(Geometry::Polyline(Polyline::from_points(vec![
                Point::new(1.0, 0.0),
                Point::new(2.0, 0.0),
            ]))),
        },
        RoutePoint::at(3, Point::new(3.0, 0.0)),
        RoutePoint::at(4, Point::new(4.0, 0.0)),
    ];
    let segments = segment(&points);
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].paths.len(), 3);
    assert_eq!(xs(&segments[0]), vec![0, 1, 1, 2, 3, 4]);
}

#[test]
fn from_record_requires_sequence() {
    let record = Record::point(Point::new(0.0, 0.0)).with_attribute("Sequence", 12);
    let point = RoutePoint::from_record(&record, "Sequence").unwrap();
    assert_eq!(point.sequence, 12);

    let err = RoutePoint::from_record(&Record::empty(), "Sequence").unwrap_err();
    assert!(matches!(err, TourError::Validation(_)));
}

#[test]
fn extreme_sequence_numbers_split_without_overflow() {
    let points = vec![
        RoutePoint::at(i64::MIN, Point::new(0.0, 0.0)),
        RoutePoint::at(i64::MIN + 1, Point::new(1.0, 0.0)),
        RoutePoint::at(i64::MAX, Point::new(2.0, 0.0)),
    ];
    let spans: Vec<_> = segment_batches(&points)
        .iter()
        .map(|b| (b.first_sequence, b.last_sequence))
        .collect();
    assert_eq!(spans, vec![(i64::MIN, i64::MIN + 1), (i64::MAX, i64::MAX)]);
}
