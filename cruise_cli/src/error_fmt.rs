//! Human-readable error descriptions and structured JSON error formatting.

use cruise_core::error::{BuildError, CruiseError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingButton => {
                "What happened: No cruise button was provided to the controller.\nLikely causes: The button input failed to initialize or was not wired into the builder.\nHow to fix: Check [pins] button and pass the input via with_button(...).".to_string()
            }
            BuildError::MissingPotentiometer => {
                "What happened: No potentiometer was provided to the controller.\nLikely causes: The ADC failed to initialize or was not wired into the builder.\nHow to fix: Check [pins] pot_channel and the SPI wiring.".to_string()
            }
            BuildError::MissingPwm => {
                "What happened: No motor PWM output was provided to the controller.\nLikely causes: The PWM pin failed to initialize.\nHow to fix: Check [pins] motor_pwm.".to_string()
            }
            BuildError::PulseSource(msg) => format!(
                "What happened: The speed sensor interrupt could not be registered ({msg}).\nLikely causes: Wrong sensor pin or the line is already in use.\nHow to fix: Check [pins] sensor and that no other process holds the GPIO line."
            ),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(ce) = err.downcast_ref::<CruiseError>() {
        return match ce {
            CruiseError::Config(msg) => format!(
                "What happened: Configuration could not be loaded.\nDetails: {msg}\nHow to fix: Edit the TOML config and try again."
            ),
            CruiseError::Hardware(msg) | CruiseError::HardwareFault(msg) => format!(
                "What happened: A hardware operation failed ({msg}).\nLikely causes: Wiring, power, or GPIO/SPI permissions.\nHow to fix: Check the wiring and [pins], then rerun with --log-level=debug."
            ),
            CruiseError::State(msg) => format!(
                "What happened: {msg}.\nLikely causes: A peripheral was set up twice.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    let msg = err.to_string();
    let lower = format!("{err:#}").to_ascii_lowercase();

    if lower.contains("open button pin")
        || lower.contains("open motor pwm pin")
        || lower.contains("open sensor pin")
        || lower.contains("open potentiometer adc")
    {
        return "What happened: Failed to initialize hardware pins.\nLikely causes: Incorrect pin numbers or insufficient GPIO/SPI permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process has permission to access GPIO and SPI.".to_string();
    }

    if lower.contains("input script must have headers") {
        return "Invalid headers in input script. Expected 'at_ms,button,pot_raw'.".to_string();
    }
    if lower.contains("input script") {
        return format!("Invalid input script. {err:#}");
    }

    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes per error class; anything unclassified returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return 4;
    }
    match err.downcast_ref::<CruiseError>() {
        Some(CruiseError::Config(_)) => 3,
        Some(CruiseError::Hardware(_) | CruiseError::HardwareFault(_)) => 5,
        Some(CruiseError::State(_)) => 6,
        None => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    match err.downcast_ref::<CruiseError>() {
        Some(CruiseError::Config(_)) => "Config",
        Some(CruiseError::Hardware(_) | CruiseError::HardwareFault(_)) => "Hardware",
        Some(CruiseError::State(_)) => "State",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
