//! WS2812 LED string driven from the SPI MOSI line.
//!
//! With the bus clocked at 2.4 MHz each SPI bit lasts ~417 ns, so one WS2812
//! data bit is sent as three SPI bits: `110` for a one and `100` for a zero.
//! Pixels are sent in the chip's GRB order, and a run of zero bytes at the end
//! latches the frame.

use crate::render::Color;

pub const SPI_SPEED_HZ: u32 = 2_400_000;

/// Low time after the last pixel (~300 µs at 2.4 MHz).
pub const RESET_BYTES: usize = 90;

const ONE_BIT: u32 = 0b110;
const ZERO_BIT: u32 = 0b100;

/// Encode one color byte as three SPI bytes, most significant bit first.
fn encode_byte(byte: u8, out: &mut Vec<u8>) {
    let bits = (0..8).rev().fold(0u32, |acc, i| {
        let pattern = if byte & (1 << i) != 0 { ONE_BIT } else { ZERO_BIT };
        (acc << 3) | pattern
    });
    out.extend_from_slice(&bits.to_be_bytes()[1..]);
}

/// SPI payload for a full string of `slot_count` pixels.
pub fn encode_frame(colors: &[Color], slot_count: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(slot_count * 9 + RESET_BYTES);
    for color in super::fit_to_slots(colors, slot_count) {
        for byte in [color.g, color.r, color.b] {
            encode_byte(byte, &mut out);
        }
    }
    out.resize(out.len() + RESET_BYTES, 0);
    out
}

#[cfg(feature = "hardware")]
pub use device::Ws2812Spi;

#[cfg(feature = "hardware")]
mod device {
    use anyhow::{Context, Result};
    use linux_embedded_hal::spidev::{SpiModeFlags, Spidev, SpidevOptions};
    use std::io::Write;

    use super::{SPI_SPEED_HZ, encode_frame};
    use crate::backend::LedOutput;
    use crate::render::Color;

    pub struct Ws2812Spi {
        spi: Spidev,
        slot_count: usize,
    }

    impl Ws2812Spi {
        pub fn open(device: &str, slot_count: usize) -> Result<Self> {
            let mut spi = Spidev::open(device)
                .with_context(|| format!("Failed to open SPI device {device}"))?;
            let options = SpidevOptions::new()
                .bits_per_word(8)
                .max_speed_hz(SPI_SPEED_HZ)
                .mode(SpiModeFlags::SPI_MODE_0)
                .build();
            spi.configure(&options)
                .with_context(|| format!("Failed to configure SPI device {device}"))?;

            Ok(Self { spi, slot_count })
        }
    }

    impl LedOutput for Ws2812Spi {
        fn show(&mut self, colors: &[Color]) -> Result<()> {
            let frame = encode_frame(colors, self.slot_count);
            self.spi
                .write_all(&frame)
                .context("Failed to write LED frame")?;
            Ok(())
        }

        fn clear(&mut self) -> Result<()> {
            self.show(&[])
        }

        fn slot_count(&self) -> usize {
            self.slot_count
        }

        fn backend_name(&self) -> &'static str {
            "ws2812"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_patterns() {
        let mut out = Vec::new();
        encode_byte(0x00, &mut out);
        assert_eq!(out, [0x92, 0x49, 0x24]);

        out.clear();
        encode_byte(0xFF, &mut out);
        assert_eq!(out, [0xDB, 0x6D, 0xB6]);

        out.clear();
        encode_byte(0x80, &mut out);
        assert_eq!(out, [0xD2, 0x49, 0x24]);
    }

    #[test]
    fn test_frame_is_grb_and_latched() {
        let frame = encode_frame(&[Color::new(0xFF, 0x00, 0x00)], 1);
        assert_eq!(frame.len(), 9 + RESET_BYTES);
        // green byte first
        assert_eq!(frame[0..3], [0x92, 0x49, 0x24]);
        assert_eq!(frame[3..6], [0xDB, 0x6D, 0xB6]);
        assert_eq!(frame[6..9], [0x92, 0x49, 0x24]);
        assert!(frame[9..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_frame_covers_whole_string() {
        let frame = encode_frame(&[], 30);
        assert_eq!(frame.len(), 30 * 9 + RESET_BYTES);
        assert_eq!(frame[0..3], [0x92, 0x49, 0x24]);
    }
}
