//! Time and unit helpers for cruise_core.

/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: u64 = 1_000;
/// Seconds per minute, for revolutions-per-minute conversions.
pub const SECS_PER_MIN: f32 = 60.0;

/// Convert milliseconds to fractional seconds.
#[inline]
pub fn ms_to_secs(ms: u64) -> f32 {
    ms as f32 / MILLIS_PER_SEC as f32
}

/// Control-loop rate in Hz for a tick period, clamped so a zero period does not divide by zero.
#[inline]
pub fn tick_rate_hz(tick_ms: u64) -> f32 {
    MILLIS_PER_SEC as f32 / tick_ms.max(1) as f32
}
