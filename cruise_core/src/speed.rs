//! Speed estimator: one RPM measurement per full revolution of pulses.
//!
//! Waiting for `pulses_per_rev` pulses trades latency for noise averaging. The
//! estimate is `60 / elapsed_s`, where `elapsed_s` is the time since the previous
//! measurement. A zero-length interval cannot yield a rate, so the update is
//! skipped and the pulses remain in the counter for the next tick.
use crate::pulse::PulseCounter;
use crate::util::{SECS_PER_MIN, ms_to_secs};

/// Last computed rotational speed and the loop time it was taken at.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpeedSample {
    pub rpm: f32,
    pub at_ms: u64,
}

#[derive(Debug, Clone)]
pub struct SpeedEstimator {
    pulses_per_rev: u32,
    last_ms: u64,
    sample: SpeedSample,
}

/// RPM for one revolution completed in `elapsed_ms`. Callers guarantee `elapsed_ms > 0`.
#[inline]
pub fn rpm_from_interval(elapsed_ms: u64) -> f32 {
    SECS_PER_MIN / ms_to_secs(elapsed_ms)
}

impl SpeedEstimator {
    pub fn new(pulses_per_rev: u32) -> Self {
        Self {
            pulses_per_rev: pulses_per_rev.max(1),
            last_ms: 0,
            sample: SpeedSample::default(),
        }
    }

    /// Forget the previous measurement and restart the interval at `now_ms`.
    pub fn reset(&mut self, now_ms: u64) {
        self.last_ms = now_ms;
        self.sample = SpeedSample {
            rpm: 0.0,
            at_ms: now_ms,
        };
    }

    pub fn sample(&self) -> SpeedSample {
        self.sample
    }

    pub fn rpm(&self) -> f32 {
        self.sample.rpm
    }

    /// Consume a full revolution of pulses if available and refresh the sample.
    /// Returns the new sample, or `None` when the previous one is retained.
    pub fn update(&mut self, counter: &PulseCounter, now_ms: u64) -> Option<SpeedSample> {
        if counter.pending() < self.pulses_per_rev {
            return None;
        }
        let elapsed_ms = now_ms.saturating_sub(self.last_ms);
        if elapsed_ms == 0 {
            tracing::trace!(now_ms, "zero-length interval; speed unchanged");
            return None;
        }
        // The count only grows between `pending` and here, so this cannot miss.
        let pulses = counter.take_at_least(self.pulses_per_rev)?;
        let rpm = rpm_from_interval(elapsed_ms);
        self.last_ms = now_ms;
        self.sample = SpeedSample { rpm, at_ms: now_ms };
        tracing::debug!(rpm, elapsed_ms, pulses, "speed updated");
        Some(self.sample)
    }
}
