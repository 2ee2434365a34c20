//! Motor driver: desired speed to a ramped, clamped PWM duty.
use cruise_traits::PwmOutput;
use eyre::WrapErr;

use crate::config::MotorCfg;
use crate::error::Result;
use crate::hw_error::map_hw_error;

/// Duty for `desired` speed on a `[0, max_duty]` scale where `target_speed` maps to `max_duty`.
///
/// Clamped first, then truncated; anything below one unit is 0. Non-finite input yields 0.
pub fn target_duty(desired: f32, target_speed: f32, max_duty: u16) -> u16 {
    if !desired.is_finite() || !target_speed.is_finite() || target_speed <= 0.0 {
        return 0;
    }
    let max = f32::from(max_duty);
    let raw = (desired / target_speed * max).clamp(0.0, max);
    if raw < 1.0 { 0 } else { raw as u16 }
}

/// One ramp step from `current` toward `target`, never passing it.
#[inline]
pub fn ramp_toward(current: u16, target: u16, step: u16) -> u16 {
    if current < target {
        current.saturating_add(step).min(target)
    } else {
        current.saturating_sub(step).max(target)
    }
}

/// Sole owner of the PWM output.
pub struct MotorDriver<P: PwmOutput> {
    pwm: P,
    target_speed: f32,
    max_duty: u16,
    ramp_step: u16,
    duty: u16,
}

impl<P: PwmOutput> std::fmt::Debug for MotorDriver<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotorDriver")
            .field("duty", &self.duty)
            .field("max_duty", &self.max_duty)
            .field("ramp_step", &self.ramp_step)
            .finish()
    }
}

impl<P: PwmOutput> MotorDriver<P> {
    pub fn new(pwm: P, cfg: &MotorCfg) -> Self {
        Self {
            pwm,
            target_speed: cfg.target_speed,
            max_duty: cfg.max_duty,
            ramp_step: cfg.ramp_step.max(1),
            duty: 0,
        }
    }

    /// Currently applied duty.
    pub fn duty(&self) -> u16 {
        self.duty
    }

    pub fn max_duty(&self) -> u16 {
        self.max_duty
    }

    /// Ramp one step toward the duty for `desired` and write it to the PWM,
    /// even when it did not change. The stored duty only moves once the write succeeds.
    pub fn drive(&mut self, desired: f32) -> Result<u16> {
        let target = target_duty(desired, self.target_speed, self.max_duty);
        let next = ramp_toward(self.duty, target, self.ramp_step);
        self.apply(next)?;
        tracing::trace!(desired, target, duty = next, "duty applied");
        Ok(next)
    }

    /// Skip the ramp and command 0.
    pub fn force_off(&mut self) -> Result<()> {
        self.apply(0)
    }

    fn apply(&mut self, duty: u16) -> Result<()> {
        self.pwm
            .set_duty(duty)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("set_duty")?;
        self.duty = duty;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_unit_snaps_to_zero() {
        // 0.5 / 255 of the target speed
        let desired = 20.0 * 0.5 / 255.0;
        assert_eq!(target_duty(desired, 20.0, 255), 0);
    }

    #[test]
    fn over_target_clamps_and_negative_floors() {
        assert_eq!(target_duty(45.0, 20.0, 255), 255);
        assert_eq!(target_duty(-3.0, 20.0, 255), 0);
        assert_eq!(target_duty(f32::NAN, 20.0, 255), 0);
    }

    #[test]
    fn ramp_snaps_when_within_a_step() {
        assert_eq!(ramp_toward(240, 255, 20), 255);
        assert_eq!(ramp_toward(15, 0, 20), 0);
        assert_eq!(ramp_toward(100, 100, 20), 100);
        assert_eq!(ramp_toward(100, 0, 20), 80);
    }
}
