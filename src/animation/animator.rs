use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::animation::timing::FrameTiming;
use crate::foundation::core::Polyline;
use crate::foundation::signal::Signal;
use crate::geometry::subpath::subpath;
use crate::hop::model::{Hop, Stop};
use crate::render::display::DisplaySurface;
use crate::render::layer::{GraphicId, PathGraphic, PathRole, PointGraphic, StopLabel};

/// Terminal value of an animation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationOutcome {
    /// Every hop was drawn.
    Completed,
    /// The caller requested cancellation.
    Cancelled,
    /// A newer run started before this one finished.
    Superseded,
}

/// Observable phase of an animation run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum AnimatorState {
    /// Not started.
    #[default]
    Idle,
    /// Waiting for the start delay, the data and the display.
    Scheduled,
    /// Drawing `hop_index` with `hop_progress` in `[0, 1]`.
    Animating {
        /// Hop being drawn.
        hop_index: usize,
        /// Fraction of the hop drawn.
        hop_progress: f64,
    },
    /// Every hop was drawn.
    Completed,
    /// Cancelled by the caller.
    Cancelled,
    /// A newer run started before this one finished.
    Superseded,
}

/// Progress notification sent after each finished hop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct HopProgress {
    /// Number of hops finished, starting at 1.
    pub current_hop: usize,
    /// Hops in the tour.
    pub total_hops: usize,
}

/// Result of a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// More frames are needed.
    Continue,
    /// The last hop was finished on this tick.
    Completed,
    /// Cancellation was observed; nothing was drawn.
    Cancelled,
    /// The run's generation is no longer current; nothing was drawn.
    Stale,
}

/// Monotonic run counter shared by an animator and its runs.
#[derive(Clone, Debug, Default)]
pub struct Generation(Rc<Cell<u64>>);

impl Generation {
    /// Start a new generation and return its number.
    pub fn advance(&self) -> u64 {
        let next = self.0.get() + 1;
        self.0.set(next);
        next
    }

    /// Number of the newest generation.
    pub fn current(&self) -> u64 {
        self.0.get()
    }
}

/// Cooperative cancellation flag. Clones share state and may cross threads.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Signal);

impl CancelToken {
    /// New, unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.fire();
    }

    /// `true` once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.is_fired()
    }

    /// Suspend until cancellation is requested.
    pub async fn cancelled(&self) {
        self.0.wait().await;
    }
}

/// State of one animation run, advanced one frame at a time.
///
/// A run is created per `animate` call and never reused.
pub struct AnimationRun {
    hops: Rc<[Hop]>,
    display: DisplaySurface,
    generation: u64,
    current: Generation,
    cancel: CancelToken,
    hop_duration: Duration,
    hop_index: usize,
    hop_window: Option<(Duration, Duration)>,
    completed: Polyline,
    current_graphic: Option<GraphicId>,
    completed_graphic: Option<GraphicId>,
    timing: FrameTiming,
    state: Rc<Cell<AnimatorState>>,
    progress: mpsc::UnboundedSender<HopProgress>,
}

/// Tour data an [`AnimationRun`] draws.
#[derive(Clone, Debug)]
pub struct RunData {
    /// Hops to draw, in order.
    pub hops: Rc<[Hop]>,
    /// Target duration of each hop.
    pub hop_duration: Duration,
    /// Frame rate used until real frame timing is known.
    pub target_frame_rate: f64,
}

impl AnimationRun {
    /// New run tagged with `generation`.
    pub fn new(
        data: RunData,
        display: DisplaySurface,
        generation: u64,
        current: Generation,
        cancel: CancelToken,
        state: Rc<Cell<AnimatorState>>,
        progress: mpsc::UnboundedSender<HopProgress>,
    ) -> Self {
        Self {
            hops: data.hops,
            display,
            generation,
            current,
            cancel,
            hop_duration: data.hop_duration,
            hop_index: 0,
            hop_window: None,
            completed: Polyline::default(),
            current_graphic: None,
            completed_graphic: None,
            timing: FrameTiming::for_frame_rate(data.target_frame_rate),
            state,
            progress,
        }
    }

    /// Index of the hop being drawn.
    pub fn hop_index(&self) -> usize {
        self.hop_index
    }

    /// Frame statistics so far.
    pub fn timing(&self) -> &FrameTiming {
        &self.timing
    }

    /// Advance the run to the frame at `now`.
    pub fn tick(&mut self, now: Duration) -> TickOutcome {
        if self.cancel.is_cancelled() {
            self.state.set(AnimatorState::Cancelled);
            tracing::warn!(hop = self.hop_index, "animation cancelled");
            return TickOutcome::Cancelled;
        }
        if self.generation != self.current.current() {
            tracing::warn!(
                generation = self.generation,
                current = self.current.current(),
                "discarding tick of a superseded animation"
            );
            self.state.set(AnimatorState::Superseded);
            return TickOutcome::Stale;
        }
        let hops = Rc::clone(&self.hops);
        let Some(hop) = hops.get(self.hop_index) else {
            self.state.set(AnimatorState::Completed);
            return TickOutcome::Completed;
        };

        let work = std::time::Instant::now();
        self.timing.record_tick(now);

        let (start, end) = match self.hop_window {
            Some(window) => window,
            None => {
                if self.hop_index == 0 {
                    self.reveal(&hop.origin);
                }
                let window = (now, now + self.hop_duration);
                self.hop_window = Some(window);
                window
            }
        };

        let mut progress = if self.hop_duration.is_zero() {
            1.0
        } else {
            (now.saturating_sub(start).as_secs_f64() / self.hop_duration.as_secs_f64()).min(1.0)
        };
        if self.timing.within_half_tick(now, end) {
            progress = 1.0;
        }

        let partial = subpath(&hop.animation_path, progress);
        if let Some(id) = self.current_graphic.take() {
            self.display.paths.remove(id);
        }
        self.state.set(AnimatorState::Animating {
            hop_index: self.hop_index,
            hop_progress: progress,
        });

        if progress < 1.0 {
            if !partial.is_empty() {
                self.current_graphic = Some(self.display.paths.add(PathGraphic {
                    role: PathRole::CurrentHop,
                    path: partial,
                }));
            }
            self.timing.record_compute(work.elapsed());
            return TickOutcome::Continue;
        }

        self.finish_hop(hop, partial, now);
        self.timing.record_compute(work.elapsed());

        if self.hop_index == self.hops.len() {
            self.state.set(AnimatorState::Completed);
            tracing::info!(hops = self.hops.len(), "animation completed");
            TickOutcome::Completed
        } else {
            TickOutcome::Continue
        }
    }

    fn finish_hop(&mut self, hop: &Hop, partial: Polyline, now: Duration) {
        self.completed.append(partial);
        if let Some(id) = self.completed_graphic.take() {
            self.display.paths.remove(id);
        }
        self.completed_graphic = Some(self.display.paths.add(PathGraphic {
            role: PathRole::CompletedHops,
            path: self.completed.clone(),
        }));
        self.reveal(&hop.destination);

        self.hop_index += 1;
        self.hop_window = Some((now, now + self.hop_duration));

        let progress = HopProgress {
            current_hop: self.hop_index,
            total_hops: self.hops.len(),
        };
        tracing::debug!(
            hop = progress.current_hop,
            of = progress.total_hops,
            destination = %hop.destination.name,
            avg_frame_ms = self.timing.average_period().as_secs_f64() * 1e3,
            "hop finished"
        );
        // Nobody listening is fine.
        let _ = self.progress.send(progress);
    }

    fn reveal(&self, stop: &Stop) {
        self.display.stops.add(PointGraphic::Marker(stop.clone()));
        self.display.stops.add(PointGraphic::Label(StopLabel::from(stop)));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/animator.rs"]
mod tests;
