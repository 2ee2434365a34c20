#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and operator input scripts for the cruise controller.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//! - Input-script CSV loader enforces headers and time ordering so the simulator
//!   can replay button presses and knob movements.
use serde::Deserialize;
use serde::de::Deserializer;

#[derive(Debug, Deserialize)]
pub struct Pins {
    /// Magnet sensor input (falling-edge interrupt).
    pub sensor: u8,
    /// Cruise button input (active low, pull-up).
    pub button: u8,
    /// Motor PWM output.
    pub motor_pwm: u8,
    /// ADC channel the potentiometer wiper is connected to.
    pub pot_channel: u8,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SensorCfg {
    pub pulses_per_rev: u32,
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self { pulses_per_rev: 3 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PotCfg {
    /// Full-scale ADC code.
    pub raw_max: u16,
    /// Normalized readings below this magnitude are forced to 0.
    pub dead_zone: f32,
    /// Tick-to-tick change that cancels cruise.
    pub change_threshold: f32,
}

impl Default for PotCfg {
    fn default() -> Self {
        Self {
            raw_max: 4095,
            dead_zone: 0.2,
            change_threshold: 0.5,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CruiseCfg {
    /// Edges are ignored for this long after a toggle.
    pub debounce_ms: u64,
}

impl Default for CruiseCfg {
    fn default() -> Self {
        Self { debounce_ms: 200 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MotorCfg {
    /// Speed ceiling the knob maps to; also the speed that yields `max_duty`.
    pub target_speed: f32,
    pub max_duty: u16,
    /// Largest duty change per tick.
    pub ramp_step: u16,
    /// Carrier frequency for the PWM backend.
    pub pwm_frequency_hz: f64,
}

impl Default for MotorCfg {
    fn default() -> Self {
        Self {
            target_speed: 20.0,
            max_duty: 255,
            ramp_step: 20,
            pwm_frequency_hz: 1000.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControlCfg {
    /// Control loop period.
    pub tick_ms: u64,
}

impl Default for ControlCfg {
    fn default() -> Self {
        Self { tick_ms: 100 }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Simulation {
    /// Shaft speed of the simulated motor at full duty.
    pub max_rpm: f32,
    /// Knob position at start-up.
    pub initial_pot_raw: u16,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            max_rpm: 20.0,
            initial_pot_raw: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub pins: Pins,
    #[serde(default)]
    pub sensor: SensorCfg,
    #[serde(default)]
    pub potentiometer: PotCfg,
    #[serde(default)]
    pub cruise: CruiseCfg,
    #[serde(default)]
    pub motor: MotorCfg,
    #[serde(default)]
    pub control: ControlCfg,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub simulation: Simulation,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Sensor
        if self.sensor.pulses_per_rev == 0 {
            eyre::bail!("sensor.pulses_per_rev must be >= 1");
        }

        // Potentiometer
        if self.potentiometer.raw_max == 0 {
            eyre::bail!("potentiometer.raw_max must be > 0");
        }
        if !self.potentiometer.dead_zone.is_finite() || self.potentiometer.dead_zone < 0.0 {
            eyre::bail!("potentiometer.dead_zone must be a finite value >= 0");
        }
        if !self.potentiometer.change_threshold.is_finite()
            || self.potentiometer.change_threshold < 0.0
        {
            eyre::bail!("potentiometer.change_threshold must be a finite value >= 0");
        }

        // Cruise
        if self.cruise.debounce_ms > 10_000 {
            eyre::bail!("cruise.debounce_ms is unreasonably large (>10s)");
        }

        // Motor
        if !(self.motor.target_speed.is_finite() && self.motor.target_speed > 0.0) {
            eyre::bail!("motor.target_speed must be > 0");
        }
        if self.motor.max_duty == 0 {
            eyre::bail!("motor.max_duty must be > 0");
        }
        if self.motor.ramp_step == 0 {
            eyre::bail!("motor.ramp_step must be >= 1");
        }
        if self.motor.ramp_step > self.motor.max_duty {
            eyre::bail!("motor.ramp_step must be <= motor.max_duty");
        }
        if !(self.motor.pwm_frequency_hz.is_finite() && self.motor.pwm_frequency_hz > 0.0) {
            eyre::bail!("motor.pwm_frequency_hz must be > 0");
        }

        // Control
        if self.control.tick_ms == 0 {
            eyre::bail!("control.tick_ms must be >= 1");
        }
        if self.control.tick_ms > 60_000 {
            eyre::bail!("control.tick_ms is unreasonably large (>60s)");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        // Simulation
        if !(self.simulation.max_rpm.is_finite() && self.simulation.max_rpm >= 0.0) {
            eyre::bail!("simulation.max_rpm must be >= 0");
        }
        if self.simulation.initial_pot_raw > self.potentiometer.raw_max {
            eyre::bail!("simulation.initial_pot_raw must be <= potentiometer.raw_max");
        }

        Ok(())
    }
}

/// One row of an operator input script.
///
/// Expected headers:
/// at_ms,button,pot_raw
///
/// Example:
/// at_ms,button,pot_raw
/// 0,released,2048
/// 1500,pressed,2048
/// 1700,released,2048
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ScriptRow {
    /// Milliseconds since the start of the run at which the row takes effect.
    pub at_ms: u64,
    #[serde(deserialize_with = "de_button")]
    pub button: bool,
    pub pot_raw: u16,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ButtonToml {
    Flag(u8),
    Word(String),
}

fn de_button<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    match ButtonToml::deserialize(deserializer)? {
        ButtonToml::Flag(0) => Ok(false),
        ButtonToml::Flag(1) => Ok(true),
        ButtonToml::Flag(n) => Err(D::Error::custom(format!(
            "button flag must be 0 or 1, got {n}"
        ))),
        ButtonToml::Word(w) => match w.trim().to_ascii_lowercase().as_str() {
            "pressed" | "1" => Ok(true),
            "released" | "0" => Ok(false),
            other => Err(D::Error::custom(format!(
                "button must be pressed|released|1|0, got {other:?}"
            ))),
        },
    }
}

/// Check that rows are strictly increasing in time.
pub fn check_script(rows: &[ScriptRow]) -> eyre::Result<()> {
    for (i, pair) in rows.windows(2).enumerate() {
        if pair[1].at_ms <= pair[0].at_ms {
            eyre::bail!(
                "input script at_ms must be strictly increasing (rows {} and {})",
                i + 2,
                i + 3
            );
        }
    }
    Ok(())
}

pub fn load_input_script(path: &std::path::Path) -> eyre::Result<Vec<ScriptRow>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open input script {:?}: {}", path, e))?;
    parse_input_script(rdr)
}

pub fn parse_input_script<R: std::io::Read>(
    mut rdr: csv::Reader<R>,
) -> eyre::Result<Vec<ScriptRow>> {
    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read input script headers: {}", e))?
        .clone();
    let expected = ["at_ms", "button", "pot_raw"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "input script must have headers 'at_ms,button,pot_raw', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<ScriptRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid input script row {}: {}", idx + 2, e);
            }
        }
    }
    check_script(&rows)?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[pins]
sensor = 27
button = 26
motor_pwm = 15
pot_channel = 2
"#;

    #[test]
    fn minimal_config_takes_firmware_defaults() {
        let cfg = load_toml(MINIMAL).expect("parse");
        cfg.validate().expect("valid");
        assert_eq!(cfg.sensor.pulses_per_rev, 3);
        assert_eq!(cfg.potentiometer.raw_max, 4095);
        assert_eq!(cfg.motor.max_duty, 255);
        assert_eq!(cfg.motor.ramp_step, 20);
        assert_eq!(cfg.cruise.debounce_ms, 200);
        assert_eq!(cfg.control.tick_ms, 100);
        assert!((cfg.motor.target_speed - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn missing_pins_is_a_parse_error() {
        assert!(load_toml("[motor]\nmax_duty = 255\n").is_err());
    }

    #[test]
    fn script_rows_must_increase() {
        let rows = [
            ScriptRow {
                at_ms: 0,
                button: false,
                pot_raw: 0,
            },
            ScriptRow {
                at_ms: 0,
                button: true,
                pot_raw: 0,
            },
        ];
        assert!(check_script(&rows).is_err());
        assert!(check_script(&rows[..1]).is_ok());
    }
}
