//! `From` implementations bridging `cruise_config` types to `cruise_core` types.

use crate::config::{CruiseCfg, LoopCfg, MotorCfg, PotCfg, SensorCfg, Settings};

impl From<&cruise_config::SensorCfg> for SensorCfg {
    fn from(c: &cruise_config::SensorCfg) -> Self {
        Self {
            pulses_per_rev: c.pulses_per_rev,
        }
    }
}

impl From<&cruise_config::PotCfg> for PotCfg {
    fn from(c: &cruise_config::PotCfg) -> Self {
        Self {
            raw_max: c.raw_max,
            dead_zone: c.dead_zone,
            change_threshold: c.change_threshold,
        }
    }
}

impl From<&cruise_config::CruiseCfg> for CruiseCfg {
    fn from(c: &cruise_config::CruiseCfg) -> Self {
        Self {
            debounce_ms: c.debounce_ms,
        }
    }
}

// pwm_frequency_hz belongs to the PWM backend, not the driver.
impl From<&cruise_config::MotorCfg> for MotorCfg {
    fn from(c: &cruise_config::MotorCfg) -> Self {
        Self {
            target_speed: c.target_speed,
            max_duty: c.max_duty,
            ramp_step: c.ramp_step,
        }
    }
}

impl From<&cruise_config::ControlCfg> for LoopCfg {
    fn from(c: &cruise_config::ControlCfg) -> Self {
        Self { tick_ms: c.tick_ms }
    }
}

impl From<&cruise_config::Config> for Settings {
    fn from(c: &cruise_config::Config) -> Self {
        Self {
            sensor: (&c.sensor).into(),
            pot: (&c.potentiometer).into(),
            cruise: (&c.cruise).into(),
            motor: (&c.motor).into(),
            control: (&c.control).into(),
        }
    }
}
