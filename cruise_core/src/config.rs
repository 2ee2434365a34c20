//! Configuration types for the control core.
//!
//! These are the runtime structs used by `CruiseCore`. They are separate from the
//! TOML-deserialized config in `cruise_config`; see `conversions`.

use crate::error::BuildError;

/// Magnet sensor geometry.
#[derive(Debug, Clone)]
pub struct SensorCfg {
    /// Pulses per shaft revolution; one speed measurement per this many pulses.
    pub pulses_per_rev: u32,
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self { pulses_per_rev: 3 }
    }
}

/// Potentiometer normalization.
#[derive(Debug, Clone)]
pub struct PotCfg {
    /// Full-scale ADC code. Samples above it are clamped.
    pub raw_max: u16,
    /// Normalized values with magnitude below this are forced to exactly 0.
    pub dead_zone: f32,
    /// Tick-to-tick change of the normalized value that cancels cruise.
    pub change_threshold: f32,
}

impl Default for PotCfg {
    fn default() -> Self {
        Self {
            raw_max: 4095,
            dead_zone: 0.2,
            change_threshold: 0.5,
        }
    }
}

/// Cruise button handling.
#[derive(Debug, Clone)]
pub struct CruiseCfg {
    /// After a toggle, further press edges are ignored for this long.
    pub debounce_ms: u64,
}

impl Default for CruiseCfg {
    fn default() -> Self {
        Self { debounce_ms: 200 }
    }
}

/// Motor output scaling and ramp.
#[derive(Debug, Clone)]
pub struct MotorCfg {
    /// Speed that maps to `max_duty`; also the ceiling of the knob range.
    pub target_speed: f32,
    pub max_duty: u16,
    /// Largest duty change per tick.
    pub ramp_step: u16,
}

impl Default for MotorCfg {
    fn default() -> Self {
        Self {
            target_speed: 20.0,
            max_duty: 255,
            ramp_step: 20,
        }
    }
}

/// Loop pacing.
#[derive(Debug, Clone)]
pub struct LoopCfg {
    pub tick_ms: u64,
}

impl Default for LoopCfg {
    fn default() -> Self {
        Self { tick_ms: 100 }
    }
}

/// Everything the core needs besides hardware and a clock.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub sensor: SensorCfg,
    pub pot: PotCfg,
    pub cruise: CruiseCfg,
    pub motor: MotorCfg,
    pub control: LoopCfg,
}

impl Settings {
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.sensor.pulses_per_rev == 0 {
            return Err(BuildError::InvalidConfig("pulses_per_rev must be >= 1"));
        }
        if self.pot.raw_max == 0 {
            return Err(BuildError::InvalidConfig("raw_max must be > 0"));
        }
        if !(self.pot.dead_zone.is_finite() && self.pot.dead_zone >= 0.0) {
            return Err(BuildError::InvalidConfig("dead_zone must be >= 0"));
        }
        if !(self.pot.change_threshold.is_finite() && self.pot.change_threshold >= 0.0) {
            return Err(BuildError::InvalidConfig("change_threshold must be >= 0"));
        }
        if !(self.motor.target_speed.is_finite() && self.motor.target_speed > 0.0) {
            return Err(BuildError::InvalidConfig("target_speed must be > 0"));
        }
        if self.motor.max_duty == 0 {
            return Err(BuildError::InvalidConfig("max_duty must be > 0"));
        }
        if self.motor.ramp_step == 0 || self.motor.ramp_step > self.motor.max_duty {
            return Err(BuildError::InvalidConfig(
                "ramp_step must be in 1..=max_duty",
            ));
        }
        if self.control.tick_ms == 0 {
            return Err(BuildError::InvalidConfig("tick_ms must be >= 1"));
        }
        Ok(())
    }
}
