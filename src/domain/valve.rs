// Valve travel timeline - time-interpolated position of the shared diverter mechanism
use chrono::Utc;
use serde::Serialize;

/// Valve percent when both diverters rest on the pool circuit.
pub const VALVE_POOL_PERCENT: f64 = 0.0;
/// Valve percent when both diverters rest on the spa circuit.
pub const VALVE_SPA_PERCENT: f64 = 100.0;

/// Current server time as Unix epoch milliseconds.
pub fn epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Time-based model of the diverter valves' in-flight position.
///
/// Both physical valves share one actuator run, so a single scalar percent
/// (0 = pool, 100 = spa) describes them. While `moving`, the authoritative
/// position is the interpolation of `from` to `to` across
/// `start_ms..start_ms + duration_ms`; once settled, `percent` is
/// authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValveTimeline {
    pub percent: f64,
    pub moving: bool,
    pub from: f64,
    pub to: f64,
    pub start_ms: i64,
    pub duration_ms: i64,
}

impl ValveTimeline {
    /// A timeline resting at a settled position.
    pub fn settled(percent: f64) -> Self {
        Self {
            percent,
            moving: false,
            from: percent,
            to: percent,
            start_ms: 0,
            duration_ms: 0,
        }
    }

    /// A timeline in motion from `from` to `to`, started at `start_ms`.
    pub fn begin(from: f64, to: f64, start_ms: i64, duration_ms: i64) -> Self {
        Self {
            percent: from,
            moving: true,
            from,
            to,
            start_ms,
            duration_ms,
        }
    }

    /// Position at `now_ms`. Pure and side-effect free, so it may be called
    /// arbitrarily often while motion is in progress. Never extrapolates past
    /// the endpoints: a read after the travel window returns exactly `to`,
    /// matching the value the orchestrator will settle on.
    pub fn percent_at(&self, now_ms: i64) -> f64 {
        if !self.moving {
            return self.percent;
        }
        let elapsed = now_ms - self.start_ms;
        if elapsed <= 0 {
            return self.from;
        }
        if elapsed >= self.duration_ms {
            return self.to;
        }
        let progress = elapsed as f64 / self.duration_ms as f64;
        self.from + (self.to - self.from) * progress
    }

    /// Copy of the timeline whose `percent` field carries the interpolated
    /// value at `now_ms`; the shape served to viewers.
    pub fn sampled_at(&self, now_ms: i64) -> Self {
        Self {
            percent: self.percent_at(now_ms),
            ..*self
        }
    }

    /// Settle at the destination once travel has completed.
    pub fn finalize(&mut self) {
        self.percent = self.to;
        self.moving = false;
    }

    /// Abandon motion in place, settling at the interpolated position for
    /// `now_ms`. Used when a transition fails mid-travel; the position is
    /// never rolled back to the origin.
    pub fn freeze_at(&mut self, now_ms: i64) {
        self.percent = self.percent_at(now_ms);
        self.moving = false;
    }
}
