use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::foundation::core::{Point, Polyline};
use crate::hop::model::{LabelPlacement, Stop};

/// Opaque handle of a graphic added to a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct GraphicId(pub u64);

/// Which path a [`PathGraphic`] represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathRole {
    /// Partially drawn path of the hop being animated.
    CurrentHop,
    /// Every hop finished so far.
    CompletedHops,
}

/// Immutable path handed to the path layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PathGraphic {
    /// What the path shows.
    pub role: PathRole,
    /// Geometry to draw.
    pub path: Polyline,
}

/// Text label drawn next to a stop.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct StopLabel {
    /// Sequence number of the labelled stop.
    pub sequence: i64,
    /// Label text.
    pub text: String,
    /// Anchor position.
    pub position: Point,
    /// Offset and alignment.
    pub placement: LabelPlacement,
}

impl From<&Stop> for StopLabel {
    fn from(stop: &Stop) -> Self {
        Self {
            sequence: stop.sequence,
            text: stop.name.clone(),
            position: stop.position,
            placement: stop.label,
        }
    }
}

/// Graphic handed to the stop layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PointGraphic {
    /// Marker at a stop.
    Marker(Stop),
    /// Name label of a stop.
    Label(StopLabel),
}

impl PointGraphic {
    /// Sequence number of the stop this graphic belongs to.
    pub fn sequence(&self) -> i64 {
        match self {
            Self::Marker(stop) => stop.sequence,
            Self::Label(label) => label.sequence,
        }
    }
}

/// Display layer holding graphics of type `G`.
///
/// Layers are shared between the controller and the host, so every method
/// takes `&self`; implementations use interior mutability.
pub trait GraphicsLayer<G> {
    /// Add a graphic and return its handle.
    fn add(&self, graphic: G) -> GraphicId;
    /// Remove a graphic. Returns `false` for unknown handles.
    fn remove(&self, id: GraphicId) -> bool;
    /// Remove every graphic.
    fn remove_all(&self);
}

#[derive(Debug)]
struct LayerState<G> {
    live: Vec<(GraphicId, G)>,
    added: Vec<G>,
}

/// In-memory [`GraphicsLayer`]. Clones share the same contents.
#[derive(Debug)]
pub struct MemoryLayer<G> {
    state: Rc<RefCell<LayerState<G>>>,
    next_id: Rc<Cell<u64>>,
}

impl<G> Clone for MemoryLayer<G> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            next_id: Rc::clone(&self.next_id),
        }
    }
}

impl<G> Default for MemoryLayer<G> {
    fn default() -> Self {
        Self {
            state: Rc::new(RefCell::new(LayerState {
                live: Vec::new(),
                added: Vec::new(),
            })),
            next_id: Rc::new(Cell::new(0)),
        }
    }
}

impl<G: Clone> MemoryLayer<G> {
    /// Empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Graphics currently on the layer, oldest first.
    pub fn graphics(&self) -> Vec<G> {
        self.state
            .borrow()
            .live
            .iter()
            .map(|(_, g)| g.clone())
            .collect()
    }

    /// Every graphic ever added, including removed ones.
    pub fn added(&self) -> Vec<G> {
        self.state.borrow().added.clone()
    }

    /// Number of graphics ever added.
    pub fn add_count(&self) -> usize {
        self.state.borrow().added.len()
    }

    /// Number of graphics currently on the layer.
    pub fn len(&self) -> usize {
        self.state.borrow().live.len()
    }

    /// `true` when no graphic is on the layer.
    pub fn is_empty(&self) -> bool {
        self.state.borrow().live.is_empty()
    }
}

impl<G: Clone> GraphicsLayer<G> for MemoryLayer<G> {
    fn add(&self, graphic: G) -> GraphicId {
        let id = GraphicId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let mut state = self.state.borrow_mut();
        state.added.push(graphic.clone());
        state.live.push((id, graphic));
        id
    }

    fn remove(&self, id: GraphicId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.live.len();
        state.live.retain(|(g, _)| *g != id);
        state.live.len() != before
    }

    fn remove_all(&self) {
        self.state.borrow_mut().live.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/layer.rs"]
mod tests;
