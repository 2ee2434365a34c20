//! Maps `Box<dyn Error>` from the trait seam to a typed `CruiseError`.
//!
//! With the `hardware-errors` feature, `cruise_hardware::HwError` is downcast for
//! precise mapping; anything else is carried as its display string.

use crate::error::CruiseError;

pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> CruiseError {
    #[cfg(feature = "hardware-errors")]
    {
        use cruise_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::AlreadyRegistered => CruiseError::State(hw.to_string()),
                HwError::AdcChannel(_) | HwError::AdcFullScale { .. } => {
                    CruiseError::Config(hw.to_string())
                }
                other => CruiseError::HardwareFault(other.to_string()),
            };
        }
    }

    CruiseError::Hardware(e.to_string())
}
