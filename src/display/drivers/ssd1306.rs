/*
 *  display/drivers/ssd1306.rs
 *
 *  wxoled - weather at a glance
 *  (c) 2025-26 Stuart Hunter
 *
 *  SSD1306 OLED display driver implementation
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use linux_embedded_hal::I2cdev;
use ssd1306::{
    mode::{BufferedGraphicsMode, DisplayConfig as _},
    prelude::*,
    size::{DisplaySize128x64, DisplaySize128x32},
    I2CDisplayInterface,
    Ssd1306,
};

use embedded_graphics::prelude::*;
use embedded_graphics::pixelcolor::BinaryColor;

use crate::config::DisplayConfig;
use crate::display::error::DisplayError;
use crate::display::traits::{check_frame_size, DisplayDriver, DisplayCapabilities};
use crate::frame::MonoFrame;

use log::info;

/// SSD1306 display driver wrapper
pub struct Ssd1306Driver {
    /// The underlying ssd1306 driver
    display: Ssd1306Variants,

    /// Display capabilities
    capabilities: DisplayCapabilities,
}

/// Enum to handle different SSD1306 display sizes
enum Ssd1306Variants {
    Size128x64(Ssd1306<I2CInterface<I2cdev>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>),
    Size128x32(Ssd1306<I2CInterface<I2cdev>, DisplaySize128x32, BufferedGraphicsMode<DisplaySize128x32>>),
}

/// Run the same body against whichever panel size is in use
macro_rules! with_display {
    ($variants:expr, $display:ident => $body:expr) => {
        match $variants {
            Ssd1306Variants::Size128x64($display) => $body,
            Ssd1306Variants::Size128x32($display) => $body,
        }
    };
}

fn brightness_level(value: u8) -> Brightness {
    match value {
        0..=63 => Brightness::DIMMEST,
        64..=127 => Brightness::DIM,
        128..=191 => Brightness::NORMAL,
        _ => Brightness::BRIGHTEST,
    }
}

impl Ssd1306Driver {
    /// Create a new SSD1306 driver using I2C
    ///
    /// # Arguments
    ///
    /// * `i2c_bus_path` - Path to I2C device (e.g., "/dev/i2c-1")
    /// * `address` - I2C address (typically 0x3C or 0x3D)
    /// * `config` - Display configuration
    ///
    /// The panel is not touched until [`DisplayDriver::init`].
    pub fn new_i2c(
        i2c_bus_path: &str,
        address: u8,
        config: &DisplayConfig,
    ) -> Result<Self, DisplayError> {
        info!("Opening SSD1306 on {} at address 0x{:02X}", i2c_bus_path, address);

        // Open I2C device
        let i2c = I2cdev::new(i2c_bus_path)
            .map_err(|e| DisplayError::I2cError(format!("Failed to open {}: {}", i2c_bus_path, e)))?;
        let interface = I2CDisplayInterface::new_custom_address(i2c, address);

        let (width, height) = (config.width(), config.height());
        let display = match (width, height) {
            (128, 64) => Ssd1306Variants::Size128x64(
                Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
                    .into_buffered_graphics_mode(),
            ),
            (128, 32) => Ssd1306Variants::Size128x32(
                Ssd1306::new(interface, DisplaySize128x32, DisplayRotation::Rotate0)
                    .into_buffered_graphics_mode(),
            ),
            _ => {
                return Err(DisplayError::InvalidConfiguration(
                    format!("Unsupported SSD1306 size: {}x{}", width, height)
                ));
            }
        };

        Ok(Self {
            display,
            capabilities: DisplayCapabilities {
                width,
                height,
                supports_rotation: true,
                supports_brightness: true,
            },
        })
    }
}

impl DisplayDriver for Ssd1306Driver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        with_display!(&mut self.display, display => display.init())
            .map_err(|e| DisplayError::InitializationFailed(format!("{:?}", e)))?;
        info!("SSD1306 initialized successfully ({}x{})", self.capabilities.width, self.capabilities.height);
        Ok(())
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        let brightness = brightness_level(value);
        with_display!(&mut self.display, display => display.set_brightness(brightness))?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        with_display!(&mut self.display, display => {
            display.clear(BinaryColor::Off)?;
            display.flush()
        })?;
        Ok(())
    }

    fn show(&mut self, frame: &MonoFrame) -> Result<(), DisplayError> {
        check_frame_size(&self.capabilities, frame)?;
        with_display!(&mut self.display, display => {
            display.clear(BinaryColor::Off)?;
            display.draw_iter(frame.lit_pixels())?;
            display.flush()
        })?;
        Ok(())
    }

    fn set_rotation(&mut self, degrees: u16) -> Result<(), DisplayError> {
        let rotation = match degrees {
            0 => DisplayRotation::Rotate0,
            90 => DisplayRotation::Rotate90,
            180 => DisplayRotation::Rotate180,
            270 => DisplayRotation::Rotate270,
            _ => return Err(DisplayError::InvalidRotation(degrees)),
        };
        with_display!(&mut self.display, display => display.set_rotation(rotation))?;
        Ok(())
    }
}
