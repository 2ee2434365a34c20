//! Sensor pulse counter shared between the edge interrupt and the control loop.
//!
//! The interrupt side only ever increments. The loop side reads and clears in a
//! single atomic read-modify-write, so an edge landing between "read" and "reset"
//! is never lost and a partial count is never observed.
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Default)]
pub struct PulseCounter {
    count: AtomicU32,
}

/// Counter handle cloned into the interrupt handler.
pub type SharedPulseCounter = Arc<PulseCounter>;

impl PulseCounter {
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
        }
    }

    /// Interrupt side: record one sensor edge. Lock-free, no I/O.
    #[inline]
    pub fn record_edge(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Pulses accumulated since the last reset.
    #[inline]
    pub fn pending(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }

    /// Read and clear in one step.
    #[inline]
    pub fn take(&self) -> u32 {
        self.count.swap(0, Ordering::AcqRel)
    }

    /// Read and clear only if at least `min` pulses accumulated; otherwise leave
    /// the counter untouched and return `None`.
    #[inline]
    pub fn take_at_least(&self, min: u32) -> Option<u32> {
        self.count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| {
                (c >= min).then_some(0)
            })
            .ok()
    }
}
