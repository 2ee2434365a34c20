use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum CruiseError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing button")]
    MissingButton,
    #[error("missing potentiometer")]
    MissingPotentiometer,
    #[error("missing pwm output")]
    MissingPwm,
    #[error("pulse source registration failed: {0}")]
    PulseSource(String),
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
