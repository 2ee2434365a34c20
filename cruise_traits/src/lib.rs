//! Hardware seam for the cruise controller.
//!
//! The control core only ever talks to the platform through these traits. Pins and
//! channels are bound when an implementation is constructed, so the methods take no
//! pin arguments.
pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Error type crossing the hardware boundary.
pub type HwResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Callback invoked from interrupt context on every matching edge.
pub type EdgeHandler = Box<dyn Fn() + Send + Sync>;

/// Signal transition that triggers an edge interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
    Both,
}

/// A single digital input line (e.g. the cruise button).
pub trait DigitalInput {
    fn is_high(&mut self) -> HwResult<bool>;
}

/// A single analog channel sampled as an unsigned count in `0..=raw_max`.
pub trait AnalogInput {
    fn read_raw(&mut self) -> HwResult<u16>;
}

/// A PWM channel driven with an integer duty in `0..=max_duty`.
pub trait PwmOutput {
    fn set_duty(&mut self, duty: u16) -> HwResult<()>;
}

/// An input line able to call back asynchronously on edges.
///
/// The handler runs in interrupt (or interrupt-like) context: it must not block,
/// allocate or log.
pub trait EdgeInterrupt {
    fn register(&mut self, edge: Edge, handler: EdgeHandler) -> HwResult<()>;
}

impl<T: DigitalInput + ?Sized> DigitalInput for Box<T> {
    fn is_high(&mut self) -> HwResult<bool> {
        (**self).is_high()
    }
}

impl<T: AnalogInput + ?Sized> AnalogInput for Box<T> {
    fn read_raw(&mut self) -> HwResult<u16> {
        (**self).read_raw()
    }
}

impl<T: PwmOutput + ?Sized> PwmOutput for Box<T> {
    fn set_duty(&mut self, duty: u16) -> HwResult<()> {
        (**self).set_duty(duty)
    }
}

impl<T: EdgeInterrupt + ?Sized> EdgeInterrupt for Box<T> {
    fn register(&mut self, edge: Edge, handler: EdgeHandler) -> HwResult<()> {
        (**self).register(edge, handler)
    }
}
