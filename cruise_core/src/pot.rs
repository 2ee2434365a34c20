//! Potentiometer reader: raw ADC code to a target-speed value with a dead zone.
use crate::config::PotCfg;

/// Current normalized knob value and the one from the previous tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PotentiometerSample {
    pub value: f32,
    pub previous: f32,
}

impl PotentiometerSample {
    /// Magnitude of the change since the previous tick.
    #[inline]
    pub fn delta(&self) -> f32 {
        (self.value - self.previous).abs()
    }
}

#[derive(Debug, Clone)]
pub struct PotReader {
    raw_max: u16,
    target_speed: f32,
    dead_zone: f32,
    sample: PotentiometerSample,
}

impl PotReader {
    pub fn new(cfg: &PotCfg, target_speed: f32) -> Self {
        Self {
            raw_max: cfg.raw_max.max(1),
            target_speed,
            dead_zone: cfg.dead_zone,
            sample: PotentiometerSample::default(),
        }
    }

    /// Map `raw` onto `[0, target_speed]`, forcing values inside the dead zone to 0.
    ///
    /// Samples above `raw_max` are out of spec for the ADC and are clamped.
    pub fn normalize(&self, raw: u16) -> f32 {
        let raw = raw.min(self.raw_max);
        let value = (f32::from(raw) / f32::from(self.raw_max)) * self.target_speed;
        let value = value.clamp(0.0, self.target_speed);
        if value.abs() < self.dead_zone {
            0.0
        } else {
            value
        }
    }

    /// Normalize a new sample and shift the previous value for delta detection.
    pub fn read(&mut self, raw: u16) -> PotentiometerSample {
        let value = self.normalize(raw);
        self.sample = PotentiometerSample {
            value,
            previous: self.sample.value,
        };
        self.sample
    }

    pub fn sample(&self) -> PotentiometerSample {
        self.sample
    }

    pub fn reset(&mut self) {
        self.sample = PotentiometerSample::default();
    }
}
