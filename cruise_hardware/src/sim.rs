//! Simulated rig: button, knob, PWM output and a magnet sensor whose pulse rate
//! follows the applied duty.
//!
//! Every part shares its state with a `SimHandles` value through atomics, so a test
//! or an input script can press the button and turn the knob while the controller
//! owns the trait objects.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use cruise_traits::{AnalogInput, DigitalInput, Edge, EdgeHandler, EdgeInterrupt, HwResult, PwmOutput};

use crate::error::HwError;

/// Sensor thread polling period.
const PULSE_POLL: Duration = Duration::from_millis(2);

/// Physical parameters of the simulated motor.
#[derive(Debug, Clone, Copy)]
pub struct SimCfg {
    pub max_duty: u16,
    /// Shaft speed at full duty.
    pub max_rpm: f32,
    pub pulses_per_rev: u32,
    pub initial_pot_raw: u16,
}

impl Default for SimCfg {
    fn default() -> Self {
        Self {
            max_duty: 255,
            max_rpm: 20.0,
            pulses_per_rev: 3,
            initial_pot_raw: 0,
        }
    }
}

/// Operator-side view of the rig.
#[derive(Debug, Clone)]
pub struct SimHandles {
    pressed: Arc<AtomicBool>,
    pot_raw: Arc<AtomicU16>,
    duty: Arc<AtomicU16>,
}

impl SimHandles {
    pub fn set_button(&self, pressed: bool) {
        self.pressed.store(pressed, Ordering::Relaxed);
    }

    pub fn press(&self) {
        self.set_button(true);
    }

    pub fn release(&self) {
        self.set_button(false);
    }

    pub fn set_pot_raw(&self, raw: u16) {
        self.pot_raw.store(raw, Ordering::Relaxed);
    }

    /// Duty last written by the controller.
    pub fn duty(&self) -> u16 {
        self.duty.load(Ordering::Relaxed)
    }
}

/// Controller-side parts of the rig; move each one into the controller builder.
pub struct SimRig {
    pub button: SimButton,
    pub pot: SimPot,
    pub pwm: SimPwm,
    pub pulses: SimPulseSource,
}

impl SimRig {
    pub fn new(cfg: SimCfg) -> (Self, SimHandles) {
        let pressed = Arc::new(AtomicBool::new(false));
        let pot_raw = Arc::new(AtomicU16::new(cfg.initial_pot_raw));
        let duty = Arc::new(AtomicU16::new(0));
        let rig = Self {
            button: SimButton {
                pressed: pressed.clone(),
            },
            pot: SimPot {
                raw: pot_raw.clone(),
            },
            pwm: SimPwm {
                duty: duty.clone(),
                max_duty: cfg.max_duty,
            },
            pulses: SimPulseSource::new(duty.clone(), cfg),
        };
        let handles = SimHandles {
            pressed,
            pot_raw,
            duty,
        };
        (rig, handles)
    }
}

/// Active-low push button with pull-up: the line reads low while pressed.
pub struct SimButton {
    pressed: Arc<AtomicBool>,
}

impl DigitalInput for SimButton {
    fn is_high(&mut self) -> HwResult<bool> {
        Ok(!self.pressed.load(Ordering::Relaxed))
    }
}

pub struct SimPot {
    raw: Arc<AtomicU16>,
}

impl AnalogInput for SimPot {
    fn read_raw(&mut self) -> HwResult<u16> {
        Ok(self.raw.load(Ordering::Relaxed))
    }
}

pub struct SimPwm {
    duty: Arc<AtomicU16>,
    max_duty: u16,
}

impl PwmOutput for SimPwm {
    fn set_duty(&mut self, duty: u16) -> HwResult<()> {
        if duty > self.max_duty {
            return Err(Box::new(HwError::Pwm(format!(
                "duty {duty} exceeds wrap {}",
                self.max_duty
            ))));
        }
        self.duty.store(duty, Ordering::Relaxed);
        tracing::trace!(duty, "sim pwm level");
        Ok(())
    }
}

/// Magnet sensor stand-in. Once a handler is registered, a background thread
/// integrates the pulse rate implied by the current duty and fires the handler
/// once per simulated edge. The thread is stopped and joined on drop.
pub struct SimPulseSource {
    duty: Arc<AtomicU16>,
    cfg: SimCfg,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
}

impl SimPulseSource {
    fn new(duty: Arc<AtomicU16>, cfg: SimCfg) -> Self {
        Self {
            duty,
            cfg,
            shutdown: Arc::new(AtomicBool::new(false)),
            join_handle: None,
        }
    }
}

/// Edges per second produced at `duty`.
pub fn edge_rate_hz(duty: u16, cfg: &SimCfg, edge: Edge) -> f32 {
    if cfg.max_duty == 0 {
        return 0.0;
    }
    let frac = f32::from(duty.min(cfg.max_duty)) / f32::from(cfg.max_duty);
    let rev_per_s = cfg.max_rpm.max(0.0) * frac / 60.0;
    let edges_per_pulse = if edge == Edge::Both { 2.0 } else { 1.0 };
    rev_per_s * cfg.pulses_per_rev as f32 * edges_per_pulse
}

impl EdgeInterrupt for SimPulseSource {
    fn register(&mut self, edge: Edge, handler: EdgeHandler) -> HwResult<()> {
        if self.join_handle.is_some() {
            return Err(Box::new(HwError::AlreadyRegistered));
        }
        let duty = self.duty.clone();
        let cfg = self.cfg;
        let shutdown = self.shutdown.clone();

        let join_handle = std::thread::spawn(move || {
            let mut phase = 0.0_f32;
            let mut last = Instant::now();
            while !shutdown.load(Ordering::Relaxed) {
                std::thread::sleep(PULSE_POLL);
                let now = Instant::now();
                let dt_s = now.duration_since(last).as_secs_f32();
                last = now;
                phase += edge_rate_hz(duty.load(Ordering::Relaxed), &cfg, edge) * dt_s;
                while phase >= 1.0 {
                    handler();
                    phase -= 1.0;
                }
            }
            tracing::trace!("sim pulse thread exiting");
        });
        self.join_handle = Some(join_handle);
        tracing::debug!(?edge, "sim pulse source armed");
        Ok(())
    }
}

impl Drop for SimPulseSource {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}
