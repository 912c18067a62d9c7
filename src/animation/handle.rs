use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::animation::animator::{
    AnimationOutcome, AnimationRun, AnimatorState, CancelToken, Generation, HopProgress, RunData,
    TickOutcome,
};
use crate::render::display::DisplaySurface;

/// Future resolving to the data a run animates, once it is available.
pub type DataReady = Pin<Box<dyn Future<Output = RunData>>>;

/// Starts animation runs and keeps their generations apart.
#[derive(Clone, Debug, Default)]
pub struct Animator {
    generation: Generation,
}

impl Animator {
    /// Animator with no run started.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation of the newest started run; `0` before any run.
    pub fn generation(&self) -> u64 {
        self.generation.current()
    }

    /// Schedule a run.
    ///
    /// After `delay` the run claims a new generation, which makes every older
    /// run stale, and clears `display`. It then waits for the display and for
    /// `data` before drawing one frame per [`FrameSource`] tick.
    ///
    /// Nothing happens until the returned handle is polled.
    ///
    /// [`FrameSource`]: crate::FrameSource
    pub fn start(
        &self,
        display: DisplaySurface,
        data: DataReady,
        delay: Option<Duration>,
    ) -> AnimationHandle {
        let cancel = CancelToken::new();
        let state = Rc::new(Cell::new(AnimatorState::Idle));
        let (tx, rx) = mpsc::unbounded_channel();

        let run = drive(
            self.generation.clone(),
            display,
            data,
            delay,
            cancel.clone(),
            Rc::clone(&state),
            tx,
        );

        AnimationHandle {
            run: Box::pin(run),
            cancel,
            state,
            progress: Some(rx),
        }
    }
}

async fn drive(
    generation: Generation,
    display: DisplaySurface,
    data: DataReady,
    delay: Option<Duration>,
    cancel: CancelToken,
    state: Rc<Cell<AnimatorState>>,
    progress: mpsc::UnboundedSender<HopProgress>,
) -> AnimationOutcome {
    state.set(AnimatorState::Scheduled);
    if let Some(delay) = delay.filter(|d| !d.is_zero()) {
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(delay) => {}
        }
    }
    if cancel.is_cancelled() {
        state.set(AnimatorState::Cancelled);
        tracing::warn!("animation cancelled before it started");
        return AnimationOutcome::Cancelled;
    }

    let mine = generation.advance();
    display.clear();
    tracing::debug!(generation = mine, "animation scheduled");

    let data = tokio::select! {
        _ = cancel.cancelled() => None,
        (_, data) = async { tokio::join!(display.ready.wait(), data) } => Some(data),
    };
    let Some(data) = data else {
        state.set(AnimatorState::Cancelled);
        tracing::warn!("animation cancelled while waiting for data");
        return AnimationOutcome::Cancelled;
    };
    if data.hops.is_empty() {
        state.set(AnimatorState::Completed);
        return AnimationOutcome::Completed;
    }

    let frames = Rc::clone(&display.frames);
    let mut run = AnimationRun::new(
        data,
        display,
        mine,
        generation,
        cancel,
        state,
        progress,
    );
    loop {
        let now = frames.next_frame().await;
        match run.tick(now) {
            TickOutcome::Continue => {}
            TickOutcome::Completed => return AnimationOutcome::Completed,
            TickOutcome::Cancelled => return AnimationOutcome::Cancelled,
            TickOutcome::Stale => return AnimationOutcome::Superseded,
        }
    }
}

/// Pending animation run.
///
/// Await the handle to drive the run to its [`AnimationOutcome`]. Progress
/// notifications arrive on the receiver from [`AnimationHandle::take_progress`].
pub struct AnimationHandle {
    run: Pin<Box<dyn Future<Output = AnimationOutcome>>>,
    cancel: CancelToken,
    state: Rc<Cell<AnimatorState>>,
    progress: Option<mpsc::UnboundedReceiver<HopProgress>>,
}

impl AnimationHandle {
    /// Request cancellation; observed at the start of the next tick.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this run from elsewhere.
    pub fn canceller(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Current phase of the run.
    pub fn state(&self) -> AnimatorState {
        self.state.get()
    }

    /// Receiver of per-hop progress. Only the first call returns it.
    pub fn take_progress(&mut self) -> Option<mpsc::UnboundedReceiver<HopProgress>> {
        self.progress.take()
    }
}

impl Future for AnimationHandle {
    type Output = AnimationOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.run.as_mut().poll(cx)
    }
}

impl std::fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationHandle")
            .field("state", &self.state.get())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/handle.rs"]
mod tests;
