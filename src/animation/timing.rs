use std::time::Duration;

/// Running frame statistics of one animation run.
///
/// The average period comes from realized frame timestamps and the average
/// compute cost from measured per-tick work, so the end-of-hop prediction
/// tracks the host's real frame rate instead of the nominal one.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameTiming {
    nominal_period: Duration,
    first: Option<Duration>,
    last: Duration,
    ticks: u32,
    compute_total: Duration,
    computed: u32,
}

impl FrameTiming {
    /// Statistics that fall back to `nominal_period` until two frames were seen.
    pub fn new(nominal_period: Duration) -> Self {
        Self {
            nominal_period,
            first: None,
            last: Duration::ZERO,
            ticks: 0,
            compute_total: Duration::ZERO,
            computed: 0,
        }
    }

    /// Statistics for a nominal `fps`.
    pub fn for_frame_rate(fps: f64) -> Self {
        let period = Duration::try_from_secs_f64(1.0 / fps).unwrap_or(Duration::from_millis(16));
        Self::new(period)
    }

    /// Record a frame at `now`.
    pub fn record_tick(&mut self, now: Duration) {
        self.first.get_or_insert(now);
        self.last = now;
        self.ticks = self.ticks.saturating_add(1);
    }

    /// Record the cost of the work done for one frame.
    pub fn record_compute(&mut self, cost: Duration) {
        self.compute_total += cost;
        self.computed = self.computed.saturating_add(1);
    }

    /// Frames seen so far.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Average time between frames.
    pub fn average_period(&self) -> Duration {
        match self.first {
            Some(first) if self.ticks > 1 && self.last > first => {
                (self.last - first) / (self.ticks - 1)
            }
            _ => self.nominal_period,
        }
    }

    /// Average per-frame compute cost.
    pub fn average_compute(&self) -> Duration {
        if self.computed == 0 {
            Duration::ZERO
        } else {
            self.compute_total / self.computed
        }
    }

    /// Frames expected before `end`, after paying for the next frame's work.
    /// Negative once `end` is already behind.
    pub fn ticks_until(&self, now: Duration, end: Duration) -> f64 {
        let remaining = end.as_secs_f64() - now.as_secs_f64() - self.average_compute().as_secs_f64();
        let period = self.average_period().as_secs_f64();
        if period > 0.0 {
            remaining / period
        } else {
            remaining.signum() * f64::INFINITY
        }
    }

    /// `true` when less than half a frame is left before `end`.
    pub fn within_half_tick(&self, now: Duration, end: Duration) -> bool {
        self.ticks_until(now, end) < 0.5
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timing.rs"]
mod tests;
