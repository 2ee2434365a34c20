#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Cruise-control motor-speed core (hardware-agnostic).
//!
//! All hardware goes through the `cruise_traits` seam: a digital input for the
//! button, an analog input for the knob, a PWM output for the motor and an edge
//! interrupt for the magnet sensor.
//!
//! ## Architecture
//!
//! - **Pulse counter**: interrupt-safe atomic count with read-and-clear (`pulse`)
//! - **Speed estimator**: one RPM sample per revolution of pulses (`speed`)
//! - **Potentiometer reader**: raw ADC to target-speed units with a dead zone (`pot`)
//! - **Cruise state machine**: button toggle plus knob-disturbance release (`cruise`)
//! - **Motor driver**: clamped, ramped duty, always written through (`motor`)
//! - **Control loop**: `CruiseCore::tick` and the paced `runner`

pub mod builder;
pub mod config;
pub mod conversions;
pub mod core;
pub mod cruise;
pub mod error;
pub mod hw_error;
pub mod motor;
pub mod pot;
pub mod pulse;
pub mod runner;
pub mod speed;
pub mod status;
pub mod util;

pub use builder::{CruiseBuilder, CruiseController, Missing, Set, build_core};
pub use config::{CruiseCfg, LoopCfg, MotorCfg, PotCfg, SensorCfg, Settings};
pub use crate::core::CruiseCore;
pub use cruise::{CruiseControl, CruiseState, CruiseTransition, ReleaseReason};
pub use error::{BuildError, CruiseError, Result};
pub use motor::{MotorDriver, ramp_toward, target_duty};
pub use pot::{PotReader, PotentiometerSample};
pub use pulse::{PulseCounter, SharedPulseCounter};
pub use runner::{LatencyStats, RunOptions, RunSummary, Ticker, run};
pub use speed::{SpeedEstimator, SpeedSample};
pub use status::{SpeedSource, TickReport};
