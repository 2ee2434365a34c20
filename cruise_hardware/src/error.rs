use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("spi error: {0}")]
    Spi(String),
    #[error("pwm error: {0}")]
    Pwm(String),
    #[error("adc channel {0} out of range")]
    AdcChannel(u8),
    #[error("potentiometer.raw_max is {configured}, but the adc full scale is {expected}")]
    AdcFullScale { configured: u16, expected: u16 },
    #[error("edge handler already registered")]
    AlreadyRegistered,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
