use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Monotonic time source and pacing primitive for the control loop.
///
/// `sleep` is cooperative pacing only. Test implementations advance a virtual
/// time instead of blocking, so many ticks can be simulated instantly.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let dur = self.now().saturating_duration_since(epoch);
        u64::try_from(dur.as_millis()).unwrap_or(u64::MAX)
    }

    /// Sleep until `deadline`; returns immediately when it already passed.
    fn sleep_until(&self, deadline: Instant) {
        let remaining = deadline.saturating_duration_since(self.now());
        if !remaining.is_zero() {
            self.sleep(remaining);
        }
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, d: Duration) {
        (**self).sleep(d);
    }
}

/// Wall-clock implementation backed by `std::time::Instant`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}
