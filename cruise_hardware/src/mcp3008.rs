//! MCP3008 10-bit ADC used as the potentiometer front end on boards without an
//! on-chip ADC.
//!
//! A conversion is a 3-byte full-duplex SPI transfer:
//! `[0x01, (single-ended | channel) << 4, 0x00]`; the result is the low 2 bits of
//! the second reply byte followed by the third byte.

use crate::error::{HwError, Result};

/// Highest code the converter returns.
pub const MCP3008_RAW_MAX: u16 = 1023;

const START_BIT: u8 = 0x01;
const SINGLE_ENDED: u8 = 0x08;

/// Command frame for a single-ended read of `channel` (0..=7).
pub fn command_frame(channel: u8) -> Result<[u8; 3]> {
    if channel > 7 {
        return Err(HwError::AdcChannel(channel));
    }
    Ok([START_BIT, (SINGLE_ENDED | channel) << 4, 0x00])
}

/// Reject a knob full scale that differs from the converter's; otherwise the
/// knob could never reach the top of its range.
pub fn check_full_scale(raw_max: u16) -> Result<()> {
    if raw_max != MCP3008_RAW_MAX {
        return Err(HwError::AdcFullScale {
            configured: raw_max,
            expected: MCP3008_RAW_MAX,
        });
    }
    Ok(())
}

/// Extract the 10-bit conversion from a reply frame.
#[inline]
pub fn decode_frame(rx: &[u8; 3]) -> u16 {
    (u16::from(rx[1] & 0x03) << 8) | u16::from(rx[2])
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub struct Mcp3008 {
    spi: rppal::spi::Spi,
    channel: u8,
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
impl Mcp3008 {
    pub fn new(channel: u8) -> Result<Self> {
        use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
        command_frame(channel)?;
        // 1.35 MHz is the datasheet ceiling at 2.7 V
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, 1_000_000, Mode::Mode0)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        Ok(Self { spi, channel })
    }

    pub fn read(&mut self) -> Result<u16> {
        let tx = command_frame(self.channel)?;
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &tx)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        let raw = decode_frame(&rx);
        tracing::trace!(raw, channel = self.channel, "mcp3008 read");
        Ok(raw)
    }
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
impl cruise_traits::AnalogInput for Mcp3008 {
    fn read_raw(&mut self) -> cruise_traits::HwResult<u16> {
        self.read().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, [0x01, 0x80, 0x00])]
    #[case(2, [0x01, 0xA0, 0x00])]
    #[case(7, [0x01, 0xF0, 0x00])]
    fn command_frame_encodes_channel(#[case] channel: u8, #[case] expected: [u8; 3]) {
        assert_eq!(command_frame(channel).unwrap(), expected);
    }

    #[test]
    fn command_frame_rejects_channel_eight() {
        assert!(matches!(command_frame(8), Err(HwError::AdcChannel(8))));
    }

    #[rstest]
    #[case([0x00, 0x00, 0x00], 0)]
    #[case([0xFF, 0xFB, 0xFF], MCP3008_RAW_MAX)]
    #[case([0x00, 0x02, 0x00], 512)]
    fn decode_frame_masks_to_ten_bits(#[case] rx: [u8; 3], #[case] expected: u16) {
        assert_eq!(decode_frame(&rx), expected);
    }

    #[rstest]
    #[case(4095)]
    #[case(1024)]
    #[case(255)]
    fn full_scale_other_than_ten_bits_is_rejected(#[case] raw_max: u16) {
        assert!(matches!(
            check_full_scale(raw_max),
            Err(HwError::AdcFullScale { configured, expected: MCP3008_RAW_MAX }) if configured == raw_max
        ));
    }

    #[test]
    fn ten_bit_full_scale_is_accepted() {
        assert!(check_full_scale(MCP3008_RAW_MAX).is_ok());
    }
}
