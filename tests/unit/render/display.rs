use std::time::Duration;

use super::*;
use crate::foundation::core::{Point, Polyline};
use crate::render::frames::FixedStepFrames;
use crate::render::layer::PathRole;

#[test]
fn surface_writes_through_to_memory_layers() {
    let memory = MemoryDisplay::new();
    let surface = memory
        .surface(Rc::new(FixedStepFrames::new(Duration::from_millis(10))))
        .with_spatial_reference(SpatialReference::WGS84);
    assert_eq!(surface.spatial_reference, SpatialReference::WGS84);

    surface.paths.add(PathGraphic {
        role: PathRole::CompletedHops,
        path: Polyline::straight(Point::ZERO, Point::new(1.0, 1.0)),
    });
    assert_eq!(memory.paths.len(), 1);

    surface.clear();
    assert!(memory.paths.is_empty());
    assert_eq!(memory.paths.add_count(), 1);
}

#[test]
fn signals_start_unfired_until_settled() {
    let memory = MemoryDisplay::new();
    let frames = Rc::new(FixedStepFrames::new(Duration::from_millis(10)));
    let surface = memory.surface(frames.clone());
    assert!(!surface.ready.is_fired());
    assert!(!surface.idle.is_fired());
    assert_eq!(surface.spatial_reference, SpatialReference::WEB_MERCATOR);

    let surface = memory.surface(frames).settled();
    assert!(surface.ready.is_fired());
    assert!(surface.idle.is_fired());
    assert!(format!("{surface:?}").contains("ready: true"));
}
