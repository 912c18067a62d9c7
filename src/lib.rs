//! Tourline replays a multi-stop journey as an animated tour.
//!
//! Stops and recorded route points are fetched from a [`DataSource`], grouped
//! into directed hops, and drawn frame by frame onto a [`DisplaySurface`] as a
//! path that grows at a controlled pace.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: `TourOverrides + ExternalParams -> TourConfig` ([`ConfigProvider`])
//! 2. **Load**: stop and route queries run concurrently ([`TourController::load`])
//! 3. **Segment**: ordered route points -> one path per hop ([`segment`])
//! 4. **Build**: stops + segments -> [`Hop`]s with densified animation paths ([`HopBuilder`])
//! 5. **Animate**: one tick per host frame, each drawing an exact-length prefix of
//!    the current hop ([`subpath`], [`AnimationRun::tick`])
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single-threaded**: collaborators are shared with `Rc`; futures are not
//!   `Send` and run on a current-thread runtime or a `LocalSet`.
//! - **Load failures are observable, not thrown**: they land in
//!   [`TourController::load_error`].
//! - **Stale runs are inert**: every animation run carries a generation and
//!   stops drawing as soon as a newer run starts.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod animation;
mod config;
mod foundation;
mod geometry;
mod hop;
mod render;
mod source;
mod tour;
mod track;

pub use animation::animator::{
    AnimationOutcome, AnimationRun, AnimatorState, CancelToken, Generation, HopProgress, RunData,
    TickOutcome,
};
pub use animation::handle::{AnimationHandle, Animator, DataReady};
pub use animation::timing::FrameTiming;
pub use config::provider::{
    ConfigProvider, ExternalParams, PARAM_FORCE_GREAT_CIRCLE, PARAM_ROUTE_RESULT,
    PARAM_STOP_NAME_FIELD, PARAM_STOP_SEQUENCE_FIELD, PARAM_STOP_SOURCE, TourOverrides,
};
pub use config::schema::{AnimationConfig, DataConfig, LabelPositions, TourConfig};
pub use foundation::core::{Point, Polyline, Rect, path_length};
pub use foundation::error::{TourError, TourResult};
pub use foundation::signal::Signal;
pub use foundation::spatial::SpatialReference;
pub use geometry::geodesic::{densify_geodesic, densify_geodesic_segments, geodesic_length};
pub use geometry::subpath::subpath;
pub use hop::builder::{HopBuilder, label_placement};
pub use hop::model::{
    HorizontalAlignment, Hop, LABEL_OFFSET_BELOW, LABEL_OFFSET_DEFAULT, LabelPlacement, Stop,
};
pub use render::display::{DisplaySurface, MemoryDisplay};
pub use render::frames::{FixedStepFrames, FrameFuture, FrameSource, IntervalFrames};
pub use render::layer::{
    GraphicId, GraphicsLayer, MemoryLayer, PathGraphic, PathRole, PointGraphic, StopLabel,
};
pub use source::json_file::JsonFileSource;
pub use source::memory::MemorySource;
pub use source::{DataSource, Geometry, Query, QueryFuture, Record};
pub use tour::controller::{DEFAULT_ANIMATION_DELAY, TourController};
pub use track::segmenter::{RoutePoint, RoutePointBatch, segment, segment_batches};
