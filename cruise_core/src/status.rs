//! Per-tick report returned by the control loop.

use crate::cruise::{CruiseState, CruiseTransition};
use crate::pot::PotentiometerSample;
use crate::speed::SpeedSample;

/// Where the commanded speed came from this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedSource {
    /// Cruise active: hold the last measured speed.
    Measured,
    /// Cruise inactive: follow the knob.
    Knob,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Milliseconds since `begin()`.
    pub now_ms: u64,
    pub speed: SpeedSample,
    /// A full revolution was consumed this tick.
    pub speed_updated: bool,
    pub pot: PotentiometerSample,
    pub cruise: CruiseState,
    /// Transition caused by the button edge branch.
    pub button: Option<CruiseTransition>,
    /// Transition caused by the knob disturbance branch.
    pub knob: Option<CruiseTransition>,
    pub source: SpeedSource,
    pub commanded_speed: f32,
    pub duty: u16,
}

impl TickReport {
    pub fn transitioned(&self) -> bool {
        self.button.is_some() || self.knob.is_some()
    }
}
