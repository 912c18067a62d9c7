use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::Instant;

/// Future resolving to the timestamp of the next rendering opportunity.
pub type FrameFuture<'a> = Pin<Box<dyn Future<Output = Duration> + 'a>>;

/// Host frame callback.
///
/// Each call suspends until the host can draw another frame and yields that
/// frame's timestamp, measured from an origin fixed by the source. Timestamps
/// never decrease.
pub trait FrameSource {
    /// Wait for the next frame.
    fn next_frame(&self) -> FrameFuture<'_>;
}

/// Real-time frames on a fixed period, driven by tokio timers.
///
/// A caller that falls behind gets its next frame immediately; missed frames
/// are skipped rather than delivered in a burst.
#[derive(Debug)]
pub struct IntervalFrames {
    origin: Instant,
    period: Duration,
    next: Cell<Instant>,
}

impl IntervalFrames {
    /// Frames every `period`, the first one immediately.
    pub fn new(period: Duration) -> Self {
        let origin = Instant::now();
        Self {
            origin,
            period: period.max(Duration::from_micros(100)),
            next: Cell::new(origin),
        }
    }

    /// Frames at `fps` frames per second. Non-positive rates fall back to 60.
    pub fn per_second(fps: f64) -> Self {
        let period = Duration::try_from_secs_f64(1.0 / fps)
            .ok()
            .filter(|p| !p.is_zero())
            .unwrap_or(Duration::from_micros(16_667));
        Self::new(period)
    }

    /// Nominal period between frames.
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl FrameSource for IntervalFrames {
    fn next_frame(&self) -> FrameFuture<'_> {
        Box::pin(async move {
            let deadline = self.next.get().max(Instant::now());
            self.next.set(deadline + self.period);
            tokio::time::sleep_until(deadline).await;
            Instant::now().duration_since(self.origin)
        })
    }
}

/// Deterministic frames on a virtual clock.
///
/// Each frame advances the clock by the next period of a repeating list, which
/// simulates an irregular display without waiting in real time. Every frame
/// still yields to the scheduler once.
#[derive(Debug)]
pub struct FixedStepFrames {
    periods: Vec<Duration>,
    clock: Cell<Duration>,
    index: Cell<usize>,
    started: Cell<bool>,
}

impl FixedStepFrames {
    /// Frames exactly `period` apart.
    pub fn new(period: Duration) -> Self {
        Self::cycling(vec![period])
    }

    /// Frames at `fps` frames per second.
    pub fn per_second(fps: f64) -> Self {
        Self::new(Duration::try_from_secs_f64(1.0 / fps).unwrap_or(Duration::from_millis(16)))
    }

    /// Frames whose spacing cycles through `periods`.
    pub fn cycling(periods: Vec<Duration>) -> Self {
        let periods = if periods.is_empty() {
            vec![Duration::from_millis(16)]
        } else {
            periods
        };
        Self {
            periods,
            clock: Cell::new(Duration::ZERO),
            index: Cell::new(0),
            started: Cell::new(false),
        }
    }

    /// Timestamp of the most recent frame.
    pub fn now(&self) -> Duration {
        self.clock.get()
    }
}

impl FrameSource for FixedStepFrames {
    fn next_frame(&self) -> FrameFuture<'_> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            // The first frame lands on the origin.
            if self.started.replace(true) {
                let i = self.index.get();
                self.index.set((i + 1) % self.periods.len());
                self.clock.set(self.clock.get() + self.periods[i]);
            }
            self.clock.get()
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frames.rs"]
mod tests;
