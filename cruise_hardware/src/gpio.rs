//! Raspberry Pi GPIO backends built on `rppal`.
use cruise_traits::{DigitalInput, Edge, EdgeHandler, EdgeInterrupt, HwResult, PwmOutput};
use rppal::gpio::{Gpio, InputPin, OutputPin, Trigger};

use crate::error::{HwError, Result};

fn input_pullup(pin: u8) -> Result<InputPin> {
    let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
    let pin = gpio
        .get(pin)
        .map_err(|e| HwError::Gpio(format!("open pin {pin}: {e}")))?;
    Ok(pin.into_input_pullup())
}

/// Momentary button wired to ground with the internal pull-up enabled.
pub struct GpioButton {
    pin: InputPin,
}

impl GpioButton {
    pub fn new(pin: u8) -> Result<Self> {
        Ok(Self {
            pin: input_pullup(pin)?,
        })
    }
}

impl DigitalInput for GpioButton {
    fn is_high(&mut self) -> HwResult<bool> {
        Ok(self.pin.is_high())
    }
}

/// Software PWM on a plain output pin; duty is expressed in `0..=max_duty` counts.
pub struct SoftPwm {
    pin: OutputPin,
    frequency_hz: f64,
    max_duty: u16,
}

impl SoftPwm {
    pub fn new(pin: u8, frequency_hz: f64, max_duty: u16) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let mut pin = gpio
            .get(pin)
            .map_err(|e| HwError::Gpio(format!("open pin {pin}: {e}")))?
            .into_output();
        pin.set_low();
        Ok(Self {
            pin,
            frequency_hz,
            max_duty: max_duty.max(1),
        })
    }
}

impl PwmOutput for SoftPwm {
    fn set_duty(&mut self, duty: u16) -> HwResult<()> {
        let frac = f64::from(duty.min(self.max_duty)) / f64::from(self.max_duty);
        self.pin
            .set_pwm_frequency(self.frequency_hz, frac)
            .map_err(|e| HwError::Pwm(e.to_string()))?;
        Ok(())
    }
}

impl Drop for SoftPwm {
    fn drop(&mut self) {
        let _ = self.pin.clear_pwm();
        self.pin.set_low();
    }
}

/// Magnet (hall) sensor input delivering edges through rppal's interrupt thread.
pub struct GpioPulseSource {
    pin: InputPin,
}

impl GpioPulseSource {
    pub fn new(pin: u8) -> Result<Self> {
        Ok(Self {
            pin: input_pullup(pin)?,
        })
    }
}

impl EdgeInterrupt for GpioPulseSource {
    fn register(&mut self, edge: Edge, handler: EdgeHandler) -> HwResult<()> {
        let trigger = match edge {
            Edge::Rising => Trigger::RisingEdge,
            Edge::Falling => Trigger::FallingEdge,
            Edge::Both => Trigger::Both,
        };
        self.pin
            .set_async_interrupt(trigger, move |_level| handler())
            .map_err(|e| HwError::Gpio(e.to_string()))?;
        tracing::debug!(?edge, "pulse interrupt armed");
        Ok(())
    }
}
