use std::fmt;
use std::rc::Rc;

use crate::foundation::signal::Signal;
use crate::foundation::spatial::SpatialReference;
use crate::render::frames::FrameSource;
use crate::render::layer::{GraphicsLayer, MemoryLayer, PathGraphic, PointGraphic};

/// Everything the tour needs from the host display.
///
/// `ready` fires once the display can accept graphics and report its spatial
/// reference. `idle` fires once the display has stopped updating after its
/// initial load and gates automatic start. Clones share layers and signals.
#[derive(Clone)]
pub struct DisplaySurface {
    /// Layer receiving hop paths.
    pub paths: Rc<dyn GraphicsLayer<PathGraphic>>,
    /// Layer receiving stop markers and labels.
    pub stops: Rc<dyn GraphicsLayer<PointGraphic>>,
    /// Reference the display draws in.
    pub spatial_reference: SpatialReference,
    /// Fires when the display is ready.
    pub ready: Signal,
    /// Fires when the display has stopped updating.
    pub idle: Signal,
    /// Host frame callback.
    pub frames: Rc<dyn FrameSource>,
}

impl DisplaySurface {
    /// Surface over the given layers; both signals start unfired.
    pub fn new(
        paths: Rc<dyn GraphicsLayer<PathGraphic>>,
        stops: Rc<dyn GraphicsLayer<PointGraphic>>,
        frames: Rc<dyn FrameSource>,
    ) -> Self {
        Self {
            paths,
            stops,
            spatial_reference: SpatialReference::default(),
            ready: Signal::new(),
            idle: Signal::new(),
            frames,
        }
    }

    /// Set the display's spatial reference.
    pub fn with_spatial_reference(mut self, spatial_reference: SpatialReference) -> Self {
        self.spatial_reference = spatial_reference;
        self
    }

    /// Fire both `ready` and `idle`.
    pub fn settled(self) -> Self {
        self.ready.fire();
        self.idle.fire();
        self
    }

    /// Remove every tour graphic.
    pub fn clear(&self) {
        self.paths.remove_all();
        self.stops.remove_all();
    }
}

impl fmt::Debug for DisplaySurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplaySurface")
            .field("spatial_reference", &self.spatial_reference)
            .field("ready", &self.ready.is_fired())
            .field("idle", &self.idle.is_fired())
            .finish_non_exhaustive()
    }
}

/// Pair of in-memory layers backing a [`DisplaySurface`], kept by the caller
/// for inspection.
#[derive(Clone, Debug, Default)]
pub struct MemoryDisplay {
    /// Path layer.
    pub paths: MemoryLayer<PathGraphic>,
    /// Stop layer.
    pub stops: MemoryLayer<PointGraphic>,
}

impl MemoryDisplay {
    /// Empty layers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface drawing into these layers with `frames` as its frame callback.
    pub fn surface(&self, frames: Rc<dyn FrameSource>) -> DisplaySurface {
        DisplaySurface::new(Rc::new(self.paths.clone()), Rc::new(self.stops.clone()), frames)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/display.rs"]
mod tests;
