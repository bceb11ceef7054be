/*
 *  display/factory.rs
 *
 *  wxoled - weather at a glance
 *  (c) 2025-26 Stuart Hunter
 *
 *  Factory for display drivers chosen by configuration
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

use crate::config::{BusConfig, DisplayConfig, DriverKind};
use crate::display::drivers::mock::MockDriver;
use crate::display::error::{DisplayError, DisplayFactoryError};
use crate::display::traits::DisplayDriver;
use log::{debug, info};

#[cfg(feature = "driver-ssd1306")]
use crate::display::drivers::ssd1306::Ssd1306Driver;

/// Type alias for boxed display driver trait objects
pub type BoxedDriver = Box<dyn DisplayDriver>;

/// Factory for creating display drivers from configuration
pub struct DisplayDriverFactory;

impl DisplayDriverFactory {
    /// Create a display driver from configuration
    ///
    /// Missing driver and bus settings fall back to an SSD1306 on
    /// `/dev/i2c-1` at 0x3C. The returned driver is not yet initialized,
    /// see [`DisplayDriverFactory::bring_up`].
    pub fn create_from_config(
        config: &DisplayConfig
    ) -> Result<BoxedDriver, DisplayFactoryError> {
        let driver_kind = config.driver();
        debug!("Creating {:?} display driver", driver_kind);

        match (driver_kind, config.bus()) {
            (DriverKind::Mock, _) => {
                let mut driver = MockDriver::new(config)?;
                if let Some(dir) = &config.frames_dir {
                    info!("Mock display writing frames to {}", dir.display());
                    driver = driver.with_frame_dir(dir);
                }
                Ok(Box::new(driver))
            }

            #[cfg(feature = "driver-ssd1306")]
            (DriverKind::Ssd1306, BusConfig::I2c { bus, address }) => {
                Ok(Box::new(Ssd1306Driver::new_i2c(&bus, address, config)?))
            }

            #[cfg(not(feature = "driver-ssd1306"))]
            (DriverKind::Ssd1306, BusConfig::I2c { .. }) => {
                Err(DisplayFactoryError::DriverNotBuilt("driver-ssd1306"))
            }
        }
    }

    /// Initialize the panel, apply rotation and brightness, then blank it
    ///
    /// Any failure here means the panel is unusable.
    pub fn bring_up<D: DisplayDriver + ?Sized>(
        driver: &mut D,
        config: &DisplayConfig,
    ) -> Result<(), DisplayError> {
        driver.init()?;
        let degrees = config.rotate_deg.unwrap_or(0);
        if degrees != 0 {
            driver.set_rotation(degrees)?;
        }
        if let Some(brightness) = config.brightness {
            driver.set_brightness(brightness)?;
        }
        driver.clear()?;
        let (w, h) = driver.dimensions();
        info!("Display ready ({}x{})", w, h);
        Ok(())
    }
}
