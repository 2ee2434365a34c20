//! The control loop context (`CruiseCore`).
//!
//! Holds every piece of state the loop mutates (speed sample, knob sample,
//! cruise flag, applied duty) plus the hardware it polls. One call to `tick`
//! is one iteration of the loop, minus the inter-tick wait.

use std::sync::Arc;
use std::time::Instant;

use cruise_traits::{AnalogInput, Clock, DigitalInput, EdgeInterrupt, PwmOutput};
use eyre::WrapErr;

use crate::config::Settings;
use crate::cruise::{CruiseControl, CruiseState, CruiseTransition, ReleaseReason};
use crate::error::Result;
use crate::hw_error::map_hw_error;
use crate::motor::MotorDriver;
use crate::pot::{PotReader, PotentiometerSample};
use crate::pulse::{PulseCounter, SharedPulseCounter};
use crate::speed::{SpeedEstimator, SpeedSample};
use crate::status::{SpeedSource, TickReport};

/// Unified core for both the boxed and the statically dispatched controller.
pub struct CruiseCore<B: DigitalInput, A: AnalogInput, P: PwmOutput> {
    pub(crate) button: B,
    pub(crate) pot_input: A,
    pub(crate) motor: MotorDriver<P>,
    pub(crate) pulses: SharedPulseCounter,
    // Kept alive so the registered handler keeps firing.
    pub(crate) pulse_source: Option<Box<dyn EdgeInterrupt>>,
    pub(crate) speed: SpeedEstimator,
    pub(crate) pot: PotReader,
    pub(crate) cruise: CruiseControl,
    pub(crate) settings: Settings,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) epoch: Instant,
    pub(crate) ticks: u64,
}

impl<B: DigitalInput, A: AnalogInput, P: PwmOutput> std::fmt::Debug for CruiseCore<B, A, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CruiseCore")
            .field("cruise", &self.cruise.state())
            .field("rpm", &self.speed.rpm())
            .field("duty", &self.motor.duty())
            .field("pending_pulses", &self.pulses.pending())
            .field("ticks", &self.ticks)
            .finish()
    }
}

impl<B: DigitalInput, A: AnalogInput, P: PwmOutput> CruiseCore<B, A, P> {
    pub(crate) fn new(
        button: B,
        pot_input: A,
        pwm: P,
        settings: Settings,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        let epoch = clock.now();
        Self {
            button,
            pot_input,
            motor: MotorDriver::new(pwm, &settings.motor),
            pulses: Arc::new(PulseCounter::new()),
            pulse_source: None,
            speed: SpeedEstimator::new(settings.sensor.pulses_per_rev),
            pot: PotReader::new(&settings.pot, settings.motor.target_speed),
            cruise: CruiseControl::new(&settings.cruise, &settings.pot),
            settings,
            clock,
            epoch,
            ticks: 0,
        }
    }

    /// Reset per-run state: new epoch, no speed, knob at 0, cruise off, pulses drained.
    /// The applied duty is left as is; the ramp continues from it.
    pub fn begin(&mut self) {
        self.epoch = self.clock.now();
        self.speed.reset(0);
        self.pot.reset();
        self.cruise.reset();
        let dropped = self.pulses.take();
        self.ticks = 0;
        tracing::debug!(dropped_pulses = dropped, "control loop begin");
    }

    /// One loop iteration: speed, button, knob, source selection, motor.
    pub fn tick(&mut self) -> Result<TickReport> {
        let now_ms = self.clock.ms_since(self.epoch);

        let speed_updated = self.speed.update(&self.pulses, now_ms).is_some();

        let level = self
            .button
            .is_high()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("reading button")?;
        // active-low
        let button = self.cruise.on_button(!level, now_ms);
        // before the knob read, which may fail
        if let Some(t) = button {
            log_transition(t, self.speed.rpm(), self.pot.sample().value);
        }

        let raw = self
            .pot_input
            .read_raw()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("reading potentiometer")?;
        let pot = self.pot.read(raw);
        let knob = self.cruise.on_pot_delta(pot.delta());

        if let Some(t) = knob {
            log_transition(t, self.speed.rpm(), pot.value);
        }

        let (source, commanded_speed) = if self.cruise.is_active() {
            (SpeedSource::Measured, self.speed.rpm())
        } else {
            (SpeedSource::Knob, pot.value)
        };

        let duty = self.motor.drive(commanded_speed)?;
        self.ticks = self.ticks.saturating_add(1);

        Ok(TickReport {
            now_ms,
            speed: self.speed.sample(),
            speed_updated,
            pot,
            cruise: self.cruise.state(),
            button,
            knob,
            source,
            commanded_speed,
            duty,
        })
    }

    /// Command duty 0 immediately, bypassing the ramp.
    pub fn stop(&mut self) -> Result<()> {
        self.motor.force_off()?;
        tracing::info!("motor stopped");
        Ok(())
    }

    pub fn pulse_counter(&self) -> SharedPulseCounter {
        Arc::clone(&self.pulses)
    }

    pub fn cruise_state(&self) -> CruiseState {
        self.cruise.state()
    }

    pub fn speed(&self) -> SpeedSample {
        self.speed.sample()
    }

    pub fn pot(&self) -> PotentiometerSample {
        self.pot.sample()
    }

    pub fn duty(&self) -> u16 {
        self.motor.duty()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn clock(&self) -> Arc<dyn Clock + Send + Sync> {
        Arc::clone(&self.clock)
    }
}

fn log_transition(t: CruiseTransition, rpm: f32, knob: f32) {
    match t {
        CruiseTransition::Engaged => tracing::info!(rpm, "cruise engaged"),
        CruiseTransition::Released(ReleaseReason::Button) => {
            tracing::info!(reason = "button", knob, "cruise released");
        }
        CruiseTransition::Released(ReleaseReason::KnobMoved) => {
            tracing::info!(reason = "knob_moved", knob, "cruise released");
        }
    }
}
