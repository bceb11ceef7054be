/*
 *  display/drivers/mock.rs
 *
 *  wxoled - weather at a glance
 *  (c) 2025-26 Stuart Hunter
 *
 *  Mock display driver for testing without hardware
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

use embedded_graphics::pixelcolor::BinaryColor;

use crate::config::DisplayConfig;
use crate::display::error::DisplayError;
use crate::display::traits::{check_frame_size, DisplayCapabilities, DisplayDriver};
use crate::frame::MonoFrame;

use log::debug;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// How many pushed frames the mock keeps for inspection
pub const SHOWN_HISTORY: usize = 64;

/// Mock display driver for testing
///
/// This driver simulates a display without requiring hardware. It's useful for:
/// - Unit tests
/// - Integration tests
/// - Development without hardware
///
/// The mock driver records all operations and keeps the most recent frames
/// for verification in tests. With a frame directory set, every pushed frame
/// is also written out as a PBM image.
#[derive(Debug, Clone)]
pub struct MockDriver {
    /// What the "panel" currently shows
    framebuffer: MonoFrame,

    /// Display capabilities
    capabilities: DisplayCapabilities,

    /// Shared state for testing
    state: Arc<Mutex<MockDriverState>>,

    /// Where to dump frames, if anywhere
    frame_dir: Option<PathBuf>,
}

/// Internal state for the mock driver (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockDriverState {
    /// Number of times init() was called
    pub init_count: usize,

    /// Number of frames pushed via show()
    pub show_count: usize,

    /// Number of times clear() was called
    pub clear_count: usize,

    /// Last brightness value set
    pub last_brightness: Option<u8>,

    /// Last rotation set
    pub last_rotation: Option<u16>,

    /// Whether the driver is initialized
    pub is_initialized: bool,

    /// Recently shown frames, oldest first
    pub shown: VecDeque<MonoFrame>,

    /// Simulate failures (for error testing)
    pub simulate_show_failure: bool,
    pub simulate_init_failure: bool,
}

impl MockDriver {
    /// Create a new mock driver sized from the display configuration
    pub fn new(config: &DisplayConfig) -> Result<Self, DisplayError> {
        Self::new_with_size(config.width(), config.height())
    }

    /// Create a mock driver with specific dimensions
    pub fn new_with_size(width: u32, height: u32) -> Result<Self, DisplayError> {
        if width == 0 || height == 0 {
            return Err(DisplayError::InvalidConfiguration(
                format!("mock display size {}x{}", width, height)
            ));
        }

        let capabilities = DisplayCapabilities {
            width,
            height,
            supports_rotation: true,
            supports_brightness: true,
        };

        Ok(Self {
            framebuffer: MonoFrame::new(width, height),
            capabilities,
            state: Arc::new(Mutex::new(MockDriverState::default())),
            frame_dir: None,
        })
    }

    /// Write each shown frame to `dir` as `frame-NNNNNN.pbm`
    pub fn with_frame_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.frame_dir = Some(dir.into());
        self
    }

    /// Get pixel at position for testing
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<BinaryColor> {
        self.framebuffer.pixel(x, y)
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }

    /// Count number of pixels set to On
    pub fn count_on_pixels(&self) -> usize {
        self.framebuffer.count_on()
    }
}

/// Plain (P1) PBM, one text row per pixel row
pub fn write_pbm(frame: &MonoFrame, path: &Path) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    // PBM header
    writeln!(file, "P1")?;
    writeln!(file, "{} {}", frame.width(), frame.height())?;

    // Pixel data
    let width = frame.width() as usize;
    for (i, &pixel) in frame.as_slice().iter().enumerate() {
        write!(file, "{}", if pixel == BinaryColor::On { "1" } else { "0" })?;
        if (i + 1) % width == 0 {
            writeln!(file)?;
        } else {
            write!(file, " ")?;
        }
    }

    file.flush()
}

impl DisplayDriver for MockDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();

        if state.simulate_init_failure {
            return Err(DisplayError::InitializationFailed("Simulated init failure".to_string()));
        }

        state.init_count += 1;
        state.is_initialized = true;
        if let Some(dir) = &self.frame_dir {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        state.last_brightness = Some(value);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        state.clear_count += 1;
        self.framebuffer.clear_color(BinaryColor::Off);
        Ok(())
    }

    fn show(&mut self, frame: &MonoFrame) -> Result<(), DisplayError> {
        check_frame_size(&self.capabilities, frame)?;

        let mut state = self.state.lock().unwrap();
        if state.simulate_show_failure {
            return Err(DisplayError::Other("Simulated show failure".to_string()));
        }

        state.show_count += 1;
        if state.shown.len() == SHOWN_HISTORY {
            state.shown.pop_front();
        }
        state.shown.push_back(frame.clone());
        self.framebuffer = frame.clone();

        if let Some(dir) = &self.frame_dir {
            let path = dir.join(format!("frame-{:06}.pbm", state.show_count));
            write_pbm(frame, &path)?;
            debug!("frame written to {}", path.display());
        }
        Ok(())
    }

    fn set_rotation(&mut self, degrees: u16) -> Result<(), DisplayError> {
        if degrees != 0 && degrees != 90 && degrees != 180 && degrees != 270 {
            return Err(DisplayError::InvalidRotation(degrees));
        }
        let mut state = self.state.lock().unwrap();
        state.last_rotation = Some(degrees);
        Ok(())
    }
}
