use cruise_core::error::BuildError;
use cruise_core::{CruiseCfg, CruiseController, LoopCfg, MotorCfg, PotCfg, SensorCfg};
use cruise_traits::{Edge, EdgeHandler};
use rstest::rstest;

type HwResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

struct Button;
impl cruise_traits::DigitalInput for Button {
    fn is_high(&mut self) -> HwResult<bool> {
        Ok(true)
    }
}
struct Pot;
impl cruise_traits::AnalogInput for Pot {
    fn read_raw(&mut self) -> HwResult<u16> {
        Ok(0)
    }
}
struct Pwm;
impl cruise_traits::PwmOutput for Pwm {
    fn set_duty(&mut self, _duty: u16) -> HwResult<()> {
        Ok(())
    }
}
struct TakenSensor;
impl cruise_traits::EdgeInterrupt for TakenSensor {
    fn register(&mut self, _edge: Edge, _handler: EdgeHandler) -> HwResult<()> {
        Err("line already requested".into())
    }
}

#[rstest]
fn missing_button_yields_typed_build_error() {
    let err = CruiseController::builder()
        .with_potentiometer(Pot)
        .with_pwm(Pwm)
        .try_build()
        .expect_err("should fail with MissingButton");
    match err.downcast_ref::<BuildError>() {
        Some(BuildError::MissingButton) => {}
        other => panic!("expected MissingButton, got: {other:?}"),
    }
}

#[rstest]
fn missing_potentiometer_yields_typed_build_error() {
    let err = CruiseController::builder()
        .with_button(Button)
        .with_pwm(Pwm)
        .try_build()
        .expect_err("should fail");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingPotentiometer)
    ));
}

#[rstest]
fn missing_pwm_yields_typed_build_error() {
    let err = CruiseController::builder()
        .with_button(Button)
        .with_potentiometer(Pot)
        .try_build()
        .expect_err("should fail");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingPwm)
    ));
}

#[rstest]
#[case::zero_ramp(MotorCfg { ramp_step: 0, ..MotorCfg::default() })]
#[case::ramp_above_max(MotorCfg { ramp_step: 300, ..MotorCfg::default() })]
#[case::zero_max(MotorCfg { max_duty: 0, ramp_step: 0, ..MotorCfg::default() })]
#[case::nan_target(MotorCfg { target_speed: f32::NAN, ..MotorCfg::default() })]
#[case::negative_target(MotorCfg { target_speed: -1.0, ..MotorCfg::default() })]
fn invalid_motor_cfg_is_rejected(#[case] motor: MotorCfg) {
    let err = CruiseController::builder()
        .with_button(Button)
        .with_potentiometer(Pot)
        .with_pwm(Pwm)
        .with_motor(motor)
        .build()
        .expect_err("invalid");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}

#[rstest]
fn zero_pulses_per_rev_is_rejected() {
    let err = CruiseController::builder()
        .with_button(Button)
        .with_potentiometer(Pot)
        .with_pwm(Pwm)
        .with_sensor(SensorCfg { pulses_per_rev: 0 })
        .build()
        .expect_err("invalid");
    assert!(err.to_string().contains("pulses_per_rev"));
}

#[rstest]
fn pulse_source_registration_failure_is_reported() {
    let err = CruiseController::builder()
        .with_button(Button)
        .with_potentiometer(Pot)
        .with_pwm(Pwm)
        .with_pulse_source(TakenSensor)
        .build()
        .expect_err("register fails");
    match err.downcast_ref::<BuildError>() {
        Some(BuildError::PulseSource(msg)) => assert!(msg.contains("line already requested")),
        other => panic!("expected PulseSource, got: {other:?}"),
    }
}

#[rstest]
fn section_setters_land_in_settings() {
    let ctl = CruiseController::builder()
        .with_button(Button)
        .with_potentiometer(Pot)
        .with_pwm(Pwm)
        .with_pot_cfg(PotCfg {
            raw_max: 1023,
            ..PotCfg::default()
        })
        .with_cruise(CruiseCfg { debounce_ms: 50 })
        .with_loop(LoopCfg { tick_ms: 20 })
        .build()
        .expect("valid");
    let s = ctl.settings();
    assert_eq!(s.pot.raw_max, 1023);
    assert_eq!(s.cruise.debounce_ms, 50);
    assert_eq!(s.control.tick_ms, 20);
}

#[rstest]
fn zero_tick_period_is_rejected() {
    let err = CruiseController::builder()
        .with_button(Button)
        .with_potentiometer(Pot)
        .with_pwm(Pwm)
        .with_loop(LoopCfg { tick_ms: 0 })
        .build()
        .expect_err("invalid");
    assert!(err.to_string().contains("tick_ms"));
}
