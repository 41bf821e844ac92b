//! 128x32 SSD1306 status display on I2C.
//!
//! Status layout: report time top left, current time below it, signal bars
//! top right and the IP address bottom right.

use anyhow::{Context, Result};
use embedded_graphics::{
    mono_font::{
        MonoTextStyle,
        ascii::{FONT_6X10, FONT_9X15},
    },
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PrimitiveStyle, Rectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use linux_embedded_hal::I2cdev;
use ssd1306::{I2CDisplayInterface, Ssd1306, mode::BufferedGraphicsMode, prelude::*};

use super::DisplayOutput;
use crate::render::{DisplayFrame, StatusText};

type Display = Ssd1306<
    I2CInterface<I2cdev>,
    DisplaySize128x32,
    BufferedGraphicsMode<DisplaySize128x32>,
>;

const WIDTH: i32 = 128;
const BAR_X: i32 = WIDTH - 20;
const BAR_BASE_Y: i32 = 12;
const BAR_WIDTH: u32 = 2;
const BAR_SPACING: i32 = 3;
const BAR_MAX_HEIGHT: i32 = 12;

pub struct OledDisplay {
    display: Display,
}

impl OledDisplay {
    pub fn open(i2c_bus: &str) -> Result<Self> {
        let i2c =
            I2cdev::new(i2c_bus).with_context(|| format!("Failed to open I2C bus {i2c_bus}"))?;
        let interface = I2CDisplayInterface::new(i2c);
        let mut display = Ssd1306::new(interface, DisplaySize128x32, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();

        display
            .init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize display: {e:?}"))?;
        display.clear_buffer();
        display
            .flush()
            .map_err(|e| anyhow::anyhow!("Failed to clear display: {e:?}"))?;

        Ok(Self { display })
    }

    fn draw_status(&mut self, status: &StatusText) -> Result<()> {
        let large = MonoTextStyle::new(&FONT_9X15, BinaryColor::On);
        let small = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);

        self.text(&format!("WX: {}z", status.last_report_time), Point::new(0, 0), large)?;
        self.text(&format!("{}z", status.now_time), Point::new(0, 16), large)?;

        let right = TextStyleBuilder::new()
            .alignment(Alignment::Right)
            .baseline(Baseline::Bottom)
            .build();
        Text::with_text_style(
            &status.connectivity_label,
            Point::new(WIDTH - 1, 31),
            small,
            right,
        )
        .draw(&mut self.display)
        .map_err(|e| anyhow::anyhow!("{e:?}"))?;

        self.draw_signal_bars(status.signal_bars)
    }

    fn draw_signal_bars(&mut self, bars: Option<u8>) -> Result<()> {
        let filled = PrimitiveStyle::with_fill(BinaryColor::On);
        let outline = PrimitiveStyle::with_stroke(BinaryColor::On, 1);
        let lit = bars.unwrap_or(0);

        for i in 0..4u8 {
            let height = (i32::from(i) + 1) * 3;
            let x = BAR_X + i32::from(i) * BAR_SPACING;
            let style = if i < lit { filled } else { outline };
            Rectangle::new(
                Point::new(x, BAR_BASE_Y - height),
                Size::new(BAR_WIDTH, height as u32),
            )
            .into_styled(style)
            .draw(&mut self.display)
            .map_err(|e| anyhow::anyhow!("{e:?}"))?;
        }

        if bars.is_none() {
            let x1 = BAR_X - 2;
            let x2 = BAR_X + 3 * BAR_SPACING + BAR_WIDTH as i32 + 2;
            let top = BAR_BASE_Y - BAR_MAX_HEIGHT;
            for (start, end) in [
                (Point::new(x1, BAR_BASE_Y), Point::new(x2, top)),
                (Point::new(x1, top), Point::new(x2, BAR_BASE_Y)),
            ] {
                Line::new(start, end)
                    .into_styled(outline)
                    .draw(&mut self.display)
                    .map_err(|e| anyhow::anyhow!("{e:?}"))?;
            }
        }
        Ok(())
    }

    fn text(&mut self, text: &str, at: Point, style: MonoTextStyle<'_, BinaryColor>) -> Result<()> {
        Text::with_baseline(text, at, style, Baseline::Top)
            .draw(&mut self.display)
            .map_err(|e| anyhow::anyhow!("{e:?}"))?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.display
            .flush()
            .map_err(|e| anyhow::anyhow!("Failed to update display: {e:?}"))
    }
}

impl DisplayOutput for OledDisplay {
    fn render(&mut self, frame: &DisplayFrame) -> Result<()> {
        self.display.clear_buffer();

        match frame {
            DisplayFrame::Status(status) => self.draw_status(status)?,
            DisplayFrame::Station { .. } => {
                let large = MonoTextStyle::new(&FONT_9X15, BinaryColor::On);
                for line in frame.lines() {
                    self.text(&line, Point::zero(), large)?;
                }
            }
            DisplayFrame::WaitingForNetwork | DisplayFrame::Error { .. } => {
                let small = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
                for (row, line) in frame.lines().iter().enumerate() {
                    self.text(line, Point::new(0, row as i32 * 12), small)?;
                }
            }
        }

        self.flush()
    }

    fn blank(&mut self) -> Result<()> {
        self.display.clear_buffer();
        self.flush()
    }

    fn backend_name(&self) -> &'static str {
        "ssd1306"
    }
}
