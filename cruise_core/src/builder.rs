//! Type-state builder for `CruiseController` and the generic `build_core` constructor.
//!
//! `build()` only exists once a button, a potentiometer and a PWM output have been
//! supplied. `try_build()` is always available and reports what is missing.

use std::marker::PhantomData;
use std::sync::Arc;

use cruise_traits::{AnalogInput, Clock, DigitalInput, Edge, EdgeInterrupt, MonotonicClock, PwmOutput};

use crate::config::{CruiseCfg, LoopCfg, MotorCfg, PotCfg, SensorCfg, Settings};
use crate::core::CruiseCore;
use crate::cruise::CruiseState;
use crate::error::{BuildError, Result};
use crate::hw_error::map_hw_error;
use crate::pot::PotentiometerSample;
use crate::pulse::SharedPulseCounter;
use crate::speed::SpeedSample;
use crate::status::TickReport;

type BoxedCore = CruiseCore<Box<dyn DigitalInput>, Box<dyn AnalogInput>, Box<dyn PwmOutput>>;

/// Boxed controller; the API the CLI and the runner work with.
pub struct CruiseController {
    pub(crate) inner: BoxedCore,
}

impl std::fmt::Debug for CruiseController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CruiseController")
            .field("inner", &self.inner)
            .finish()
    }
}

impl CruiseController {
    pub fn builder() -> CruiseBuilder<Missing, Missing, Missing> {
        CruiseBuilder::default()
    }

    /// Reset per-run state. Call before the first tick.
    pub fn begin(&mut self) {
        self.inner.begin();
    }

    /// One iteration of the control loop.
    pub fn tick(&mut self) -> Result<TickReport> {
        self.inner.tick()
    }

    /// Drive the motor straight to 0.
    pub fn stop(&mut self) -> Result<()> {
        self.inner.stop()
    }

    /// Shared counter the edge handler increments.
    pub fn pulse_counter(&self) -> SharedPulseCounter {
        self.inner.pulse_counter()
    }

    pub fn cruise_state(&self) -> CruiseState {
        self.inner.cruise_state()
    }

    pub fn speed(&self) -> SpeedSample {
        self.inner.speed()
    }

    pub fn pot(&self) -> PotentiometerSample {
        self.inner.pot()
    }

    pub fn duty(&self) -> u16 {
        self.inner.duty()
    }

    pub fn ticks(&self) -> u64 {
        self.inner.ticks()
    }

    pub fn settings(&self) -> &Settings {
        self.inner.settings()
    }

    pub fn clock(&self) -> Arc<dyn Clock + Send + Sync> {
        self.inner.clock()
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

pub struct CruiseBuilder<B, A, P> {
    button: Option<Box<dyn DigitalInput>>,
    pot: Option<Box<dyn AnalogInput>>,
    pwm: Option<Box<dyn PwmOutput>>,
    pulse_source: Option<Box<dyn EdgeInterrupt>>,
    settings: Settings,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    _b: PhantomData<B>,
    _a: PhantomData<A>,
    _p: PhantomData<P>,
}

impl Default for CruiseBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            button: None,
            pot: None,
            pwm: None,
            pulse_source: None,
            settings: Settings::default(),
            clock: None,
            _b: PhantomData,
            _a: PhantomData,
            _p: PhantomData,
        }
    }
}

/// Validate settings, construct the core and hook the pulse source up to its counter.
fn validate_and_build<B: DigitalInput, A: AnalogInput, P: PwmOutput>(
    button: B,
    pot: A,
    pwm: P,
    settings: Settings,
    pulse_source: Option<Box<dyn EdgeInterrupt>>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<CruiseCore<B, A, P>> {
    settings.validate().map_err(eyre::Report::new)?;

    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(c) => Arc::from(c),
        None => Arc::new(MonotonicClock::new()),
    };
    let mut core = CruiseCore::new(button, pot, pwm, settings, clock);

    if let Some(mut src) = pulse_source {
        let counter = core.pulse_counter();
        src.register(Edge::Falling, Box::new(move || counter.record_edge()))
            .map_err(|e| {
                eyre::Report::new(BuildError::PulseSource(map_hw_error(&*e).to_string()))
            })?;
        core.pulse_source = Some(src);
    }

    Ok(core)
}

impl<B, A, P> CruiseBuilder<B, A, P> {
    /// Fallible build available in any type-state.
    pub fn try_build(self) -> Result<CruiseController> {
        let button = self
            .button
            .ok_or_else(|| eyre::Report::new(BuildError::MissingButton))?;
        let pot = self
            .pot
            .ok_or_else(|| eyre::Report::new(BuildError::MissingPotentiometer))?;
        let pwm = self
            .pwm
            .ok_or_else(|| eyre::Report::new(BuildError::MissingPwm))?;

        let inner = validate_and_build(
            button,
            pot,
            pwm,
            self.settings,
            self.pulse_source,
            self.clock,
        )?;
        Ok(CruiseController { inner })
    }
}

/// Chainable setters that do not affect type-state.
impl<B, A, P> CruiseBuilder<B, A, P> {
    /// Sensor line; its falling edges are counted as pulses.
    pub fn with_pulse_source(mut self, src: impl EdgeInterrupt + 'static) -> Self {
        self.pulse_source = Some(Box::new(src));
        self
    }
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }
    pub fn with_sensor(mut self, sensor: SensorCfg) -> Self {
        self.settings.sensor = sensor;
        self
    }
    pub fn with_pot_cfg(mut self, pot: PotCfg) -> Self {
        self.settings.pot = pot;
        self
    }
    pub fn with_cruise(mut self, cruise: CruiseCfg) -> Self {
        self.settings.cruise = cruise;
        self
    }
    pub fn with_motor(mut self, motor: MotorCfg) -> Self {
        self.settings.motor = motor;
        self
    }
    pub fn with_loop(mut self, control: LoopCfg) -> Self {
        self.settings.control = control;
        self
    }
    /// Defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

impl<A, P> CruiseBuilder<Missing, A, P> {
    pub fn with_button(self, button: impl DigitalInput + 'static) -> CruiseBuilder<Set, A, P> {
        CruiseBuilder {
            button: Some(Box::new(button)),
            pot: self.pot,
            pwm: self.pwm,
            pulse_source: self.pulse_source,
            settings: self.settings,
            clock: self.clock,
            _b: PhantomData,
            _a: PhantomData,
            _p: PhantomData,
        }
    }
}

impl<B, P> CruiseBuilder<B, Missing, P> {
    pub fn with_potentiometer(
        self,
        pot: impl AnalogInput + 'static,
    ) -> CruiseBuilder<B, Set, P> {
        CruiseBuilder {
            button: self.button,
            pot: Some(Box::new(pot)),
            pwm: self.pwm,
            pulse_source: self.pulse_source,
            settings: self.settings,
            clock: self.clock,
            _b: PhantomData,
            _a: PhantomData,
            _p: PhantomData,
        }
    }
}

impl<B, A> CruiseBuilder<B, A, Missing> {
    pub fn with_pwm(self, pwm: impl PwmOutput + 'static) -> CruiseBuilder<B, A, Set> {
        CruiseBuilder {
            button: self.button,
            pot: self.pot,
            pwm: Some(Box::new(pwm)),
            pulse_source: self.pulse_source,
            settings: self.settings,
            clock: self.clock,
            _b: PhantomData,
            _a: PhantomData,
            _p: PhantomData,
        }
    }
}

impl CruiseBuilder<Set, Set, Set> {
    pub fn build(self) -> Result<CruiseController> {
        self.try_build()
    }
}

/// Build a statically dispatched core from concrete hardware.
///
/// Shares validation with the builder.
pub fn build_core<B, A, P>(
    button: B,
    pot: A,
    pwm: P,
    settings: Settings,
    pulse_source: Option<Box<dyn EdgeInterrupt>>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<CruiseCore<B, A, P>>
where
    B: DigitalInput,
    A: AnalogInput,
    P: PwmOutput,
{
    validate_and_build(button, pot, pwm, settings, pulse_source, clock)
}
