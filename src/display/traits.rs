/*
 *  display/traits.rs
 *
 *  wxoled - weather at a glance
 *  (c) 2025-26 Stuart Hunter
 *
 *  Core trait definitions for display driver abstraction
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

use crate::display::error::DisplayError;
use crate::frame::MonoFrame;

/// Display capabilities and metadata
#[derive(Debug, Clone)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Whether the display supports hardware rotation
    pub supports_rotation: bool,

    /// Whether the display supports brightness control
    pub supports_brightness: bool,
}

/// Minimal hardware abstraction - all display drivers must implement this trait
///
/// Drivers take whole 1-bit frames; everything is drawn off-screen into a
/// [`MonoFrame`] first and pushed in one go.
pub trait DisplayDriver: Send {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Initialize the display hardware
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Set display brightness (0-255)
    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError>;

    /// Clear the display to blank/off state
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Replace the panel contents with `frame`
    ///
    /// The frame must match the panel dimensions.
    fn show(&mut self, frame: &MonoFrame) -> Result<(), DisplayError>;

    /// Set display rotation (if supported)
    ///
    /// Rotation angle should be 0, 90, 180, or 270 degrees.
    fn set_rotation(&mut self, degrees: u16) -> Result<(), DisplayError> {
        if !self.capabilities().supports_rotation {
            return Err(DisplayError::UnsupportedOperation);
        }
        if degrees != 0 && degrees != 90 && degrees != 180 && degrees != 270 {
            return Err(DisplayError::InvalidRotation(degrees));
        }
        // Default implementation returns error; drivers should override
        Err(DisplayError::UnsupportedOperation)
    }
}

/// Frame must match the panel, pixel for pixel.
pub fn check_frame_size(caps: &DisplayCapabilities, frame: &MonoFrame) -> Result<(), DisplayError> {
    if frame.width() != caps.width || frame.height() != caps.height {
        return Err(DisplayError::FrameSizeMismatch {
            expected: (caps.width, caps.height),
            actual: (frame.width(), frame.height()),
        });
    }
    Ok(())
}

impl<T: DisplayDriver + ?Sized> DisplayDriver for Box<T> {
    fn capabilities(&self) -> &DisplayCapabilities {
        (**self).capabilities()
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        (**self).init()
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        (**self).set_brightness(value)
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        (**self).clear()
    }

    fn show(&mut self, frame: &MonoFrame) -> Result<(), DisplayError> {
        (**self).show(frame)
    }

    fn set_rotation(&mut self, degrees: u16) -> Result<(), DisplayError> {
        (**self).set_rotation(degrees)
    }
}
