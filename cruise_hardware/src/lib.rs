//! Platform backends for the cruise controller.
//!
//! The simulated rig is always available. Real Raspberry Pi peripherals are
//! compiled in with the `hardware` feature.
pub mod error;
pub mod mcp3008;
pub mod sim;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod gpio;

pub use error::HwError;
pub use sim::{SimCfg, SimHandles, SimRig};
