use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::watch;

use crate::animation::animator::RunData;
use crate::animation::handle::{AnimationHandle, Animator, DataReady};
use crate::config::schema::TourConfig;
use crate::foundation::core::Rect;
use crate::foundation::error::{TourError, TourResult};
use crate::foundation::spatial::SpatialReference;
use crate::hop::builder::HopBuilder;
use crate::hop::model::Hop;
use crate::render::display::DisplaySurface;
use crate::source::{DataSource, Query, Record};
use crate::track::segmenter::{RoutePoint, segment};

/// Delay used by [`TourController::animate_with_delay`] when none is given.
pub const DEFAULT_ANIMATION_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug)]
struct TourState {
    hops: RefCell<Rc<[Hop]>>,
    extent: Cell<Option<Rect>>,
    load_error: RefCell<Option<Rc<TourError>>>,
    spatial_reference: Cell<Option<SpatialReference>>,
    ready: watch::Sender<bool>,
}

impl TourState {
    fn new() -> Self {
        Self {
            hops: RefCell::new(Rc::from(Vec::new())),
            extent: Cell::new(None),
            load_error: RefCell::new(None),
            spatial_reference: Cell::new(None),
            ready: watch::channel(false).0,
        }
    }

    fn reset(&self) {
        self.ready.send_replace(false);
        *self.hops.borrow_mut() = Rc::from(Vec::new());
        self.extent.set(None);
        self.load_error.replace(None);
    }

    async fn wait_ready(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives in `self`, so the channel cannot close while waiting.
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

/// Loads a tour and plays it on a display.
///
/// Loading queries the stops and, when the actual route is used, the route
/// points concurrently, then builds the hop list. Failures never escape
/// [`TourController::load`]; they are published through
/// [`TourController::load_error`] and leave the tour not ready.
pub struct TourController<S> {
    config: TourConfig,
    source: S,
    display: DisplaySurface,
    state: Rc<TourState>,
    animator: Animator,
}

impl<S: DataSource> TourController<S> {
    /// Controller for `config`, reading from `source` and drawing on `display`.
    ///
    /// Fails with a configuration error, before any query, when `config`
    /// cannot drive a tour. Call [`TourController::load`] next.
    pub fn new(display: DisplaySurface, config: TourConfig, source: S) -> TourResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            display,
            state: Rc::new(TourState::new()),
            animator: Animator::new(),
        })
    }

    /// [`TourController::new`] followed by [`TourController::load`].
    pub async fn connect(display: DisplaySurface, config: TourConfig, source: S) -> TourResult<Self> {
        let tour = Self::new(display, config, source)?;
        tour.load().await;
        Ok(tour)
    }

    /// (Re)load stops and route, rebuilding every hop.
    #[tracing::instrument(skip_all, fields(stops = self.config.data.stop_source.as_deref().unwrap_or_default()))]
    pub async fn load(&self) {
        self.state.reset();
        match self.try_load().await {
            Ok((hops, extent)) => {
                tracing::info!(
                    hops = hops.len(),
                    hop_duration_ms = per_hop(self.config.animation_duration(), hops.len()).as_millis() as u64,
                    "tour ready"
                );
                *self.state.hops.borrow_mut() = hops;
                self.state.extent.set(extent);
                self.state.ready.send_replace(true);
            }
            Err(e) => {
                tracing::error!(error = %e, "tour load failed");
                self.state.load_error.replace(Some(Rc::new(e)));
            }
        }
    }

    async fn try_load(&self) -> TourResult<(Rc<[Hop]>, Option<Rect>)> {
        let sr = match self.config.spatial_reference {
            Some(sr) => sr,
            None => {
                self.display.ready.wait().await;
                self.display.spatial_reference
            }
        };
        self.state.spatial_reference.set(Some(sr));

        let data = &self.config.data;
        let stop_source = data
            .stop_source
            .as_deref()
            .ok_or_else(|| TourError::configuration("no stop source configured"))?;
        let stop_query = Query::all(stop_source, sr)
            .with_out_fields([data.stop_name_field.as_str(), data.stop_sequence_field.as_str()])
            .ordered_by(data.stop_sequence_field.as_str());

        let route_query = if self.config.use_actual_route() {
            let route_source = data.route_source.as_deref().ok_or_else(|| {
                TourError::configuration("actual route requested without a route source")
            })?;
            Some(
                Query::all(route_source, sr)
                    .with_out_fields([data.route_sequence_field.as_str()])
                    .ordered_by(data.route_sequence_field.as_str()),
            )
        } else {
            None
        };

        let (stop_records, route_records) = tokio::try_join!(
            self.source.query(&stop_query),
            self.query_route(route_query.as_ref()),
        )?;
        self.display.ready.wait().await;

        let builder = HopBuilder::new(&self.config, sr);
        let stops = builder.build_stops(&stop_records)?;
        let segments = match route_records {
            Some(records) => {
                let points = records
                    .iter()
                    .map(|r| RoutePoint::from_record(r, &data.route_sequence_field))
                    .collect::<TourResult<Vec<_>>>()?;
                Some(segment(&points))
            }
            None => None,
        };
        let hops = builder.build(&stops, segments.as_deref())?;

        let extent = hops.iter().map(Hop::bounds).reduce(|a, b| a.union(b));
        Ok((Rc::from(hops), extent))
    }

    async fn query_route(&self, query: Option<&Query>) -> TourResult<Option<Vec<Record>>> {
        match query {
            Some(q) => self.source.query(q).await.map(Some),
            None => Ok(None),
        }
    }

    /// Play every hop once, starting as soon as the tour and display are ready.
    pub fn animate(&self) -> AnimationHandle {
        self.start(None)
    }

    /// Play every hop after `delay`, or [`DEFAULT_ANIMATION_DELAY`].
    pub fn animate_with_delay(&self, delay: Option<Duration>) -> AnimationHandle {
        self.start(Some(delay.unwrap_or(DEFAULT_ANIMATION_DELAY)))
    }

    /// Start automatically when configured to.
    ///
    /// Waits until the tour is ready and the display has stopped updating, then
    /// returns a run scheduled after the configured delay. A delay of zero means
    /// [`DEFAULT_ANIMATION_DELAY`]. `None` when automatic start is off.
    pub async fn auto_start(&self) -> Option<AnimationHandle> {
        if !self.config.auto_start {
            return None;
        }
        self.state.wait_ready().await;
        self.display.idle.wait().await;
        let delay = Some(self.config.auto_start_delay()).filter(|d| !d.is_zero());
        tracing::debug!(delay_ms = self.config.auto_start_delay_ms, "auto-starting tour");
        Some(self.animate_with_delay(delay))
    }

    fn start(&self, delay: Option<Duration>) -> AnimationHandle {
        let state = Rc::clone(&self.state);
        let duration = self.config.animation_duration();
        let target_frame_rate = self.config.animation.target_frame_rate;
        let data: DataReady = Box::pin(async move {
            state.wait_ready().await;
            let hops = Rc::clone(&state.hops.borrow());
            RunData {
                hop_duration: per_hop(duration, hops.len()),
                hops,
                target_frame_rate,
            }
        });
        self.animator.start(self.display.clone(), data, delay)
    }

    /// Remove every tour graphic from the display.
    pub fn clear_display(&self) {
        self.display.clear();
    }

    /// `true` once the last load succeeded.
    pub fn ready(&self) -> bool {
        *self.state.ready.borrow()
    }

    /// Suspend until a load succeeds.
    pub async fn wait_ready(&self) {
        self.state.wait_ready().await;
    }

    /// Union of every hop's bounds after a successful load.
    pub fn extent(&self) -> Option<Rect> {
        self.state.extent.get()
    }

    /// Failure of the last load, if it failed.
    pub fn load_error(&self) -> Option<Rc<TourError>> {
        self.state.load_error.borrow().clone()
    }

    /// Hops of the last successful load.
    pub fn hops(&self) -> Rc<[Hop]> {
        Rc::clone(&self.state.hops.borrow())
    }

    /// Target duration of each hop: the tour duration split evenly.
    pub fn hop_duration(&self) -> Duration {
        per_hop(self.config.animation_duration(), self.state.hops.borrow().len())
    }

    /// Reference the tour geometry is expressed in, once loading started.
    pub fn spatial_reference(&self) -> Option<SpatialReference> {
        self.state.spatial_reference.get()
    }

    /// Effective configuration.
    pub fn config(&self) -> &TourConfig {
        &self.config
    }

    /// Display the tour draws on.
    pub fn display(&self) -> &DisplaySurface {
        &self.display
    }

    /// Generation of the newest animation run; `0` before any run started.
    pub fn animation_generation(&self) -> u64 {
        self.animator.generation()
    }
}

fn per_hop(total: Duration, hops: usize) -> Duration {
    total / u32::try_from(hops.max(1)).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[path = "../../tests/unit/tour/controller.rs"]
mod tests;
