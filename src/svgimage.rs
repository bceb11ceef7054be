//! Module for rendering simple SVG images to a monochrome pixel buffer.
//!
//! This module uses `usvg` for SVG parsing and `resvg` for rendering.
//! The output is a 1-bit per pixel monochrome bitmap, suitable for OLED displays
//! using `embedded-graphics::image::ImageRaw`.

use resvg::{
    render,
    usvg::{
        Tree as ResvgTree,
        Options as ResvgUsvgOptions,
        Transform,
    }
}; // Use resvg's re-exports for usvg types

use tiny_skia::Pixmap;
use log::{debug, error};
use std::error::Error;
use std::fmt;

/// Alpha coverage at or above which a pixel is lit.
pub const COVERAGE_THRESHOLD: u8 = 128;

/// Custom error type for SVG rendering operations.
#[derive(Debug)]
pub enum SvgImageError {
    /// Error parsing the SVG data.
    SvgParseError(String),
    /// Error creating a pixmap for rendering.
    PixmapCreationError(String),
    /// The provided buffer is too small for the target image size.
    BufferTooSmall,
}

impl fmt::Display for SvgImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SvgImageError::SvgParseError(msg) => write!(f, "SVG parse error: {}", msg),
            SvgImageError::PixmapCreationError(msg) => write!(f, "Pixmap creation error: {}", msg),
            SvgImageError::BufferTooSmall => write!(f, "Provided buffer is too small for SVG rendering."),
        }
    }
}

impl Error for SvgImageError {}

/// Bytes needed for a packed 1-bit image of the given size (rows padded to a byte).
pub fn packed_len(width: u32, height: u32) -> usize {
    height as usize * width.div_ceil(8) as usize
}

/// Renders simple SVG data to a monochrome pixel buffer.
#[derive(Debug)]
pub struct SvgImageRenderer {
    tree: ResvgTree,
    target_width: u32,
    target_height: u32,
}

impl SvgImageRenderer {
    /// Creates a new `SvgImageRenderer` from SVG string data and target dimensions.
    ///
    /// The SVG is stretched to `target_width` x `target_height`, matching how the
    /// icons were always resized for the panel.
    pub fn new(svg_data: &str, target_width: u32, target_height: u32) -> Result<Self, SvgImageError> {
        let usvg_options = ResvgUsvgOptions::default();
        let tree = ResvgTree::from_str(svg_data, &usvg_options)
            .map_err(|e| SvgImageError::SvgParseError(format!("Failed to parse SVG: {:?}", e)))?;

        let size = tree.size();
        if size.width() <= 0.0 || size.height() <= 0.0 {
            return Err(SvgImageError::SvgParseError("SVG has an empty canvas".to_string()));
        }
        Ok(SvgImageRenderer {
            tree,
            target_width,
            target_height,
        })
    }

    /// Renders the SVG to a mutable byte slice, converting it to a 1-bit monochrome format.
    ///
    /// The `buffer` must hold at least `packed_len(target_width, target_height)` bytes.
    /// Each bit is one pixel (1 for BinaryColor::On), rows are padded to a whole byte,
    /// MSB-first within each byte. A pixel is on when the rendered coverage reaches
    /// [`COVERAGE_THRESHOLD`], whatever its colour, so dark-stroked icons light up too.
    pub fn render_to_buffer(&self, buffer: &mut [u8]) -> Result<(), SvgImageError> {

        let padded_width = self.target_width.div_ceil(8) as usize;
        let buffer_len_needed = packed_len(self.target_width, self.target_height);
        if buffer.len() < buffer_len_needed {
            error!(
                "Buffer too small. Needed: {} bytes, Got: {} bytes",
                buffer_len_needed,
                buffer.len()
            );
            return Err(SvgImageError::BufferTooSmall);
        }

        buffer.fill(0);

        let mut pixmap = Pixmap::new(self.target_width, self.target_height)
            .ok_or_else(|| SvgImageError::PixmapCreationError(
                format!("Failed to create {}x{} pixmap", self.target_width, self.target_height)))?;

        // scaling transform, viewBox origin is handled by usvg
        let svg_size = self.tree.size();
        let scale_x = self.target_width as f32 / svg_size.width();
        let scale_y = self.target_height as f32 / svg_size.height();
        let transform = Transform::from_scale(scale_x, scale_y);

        render(&self.tree, transform, &mut pixmap.as_mut());

        pixmap
            .pixels()
            .chunks(self.target_width as usize)
            .take(self.target_height as usize)
            .enumerate()
            .for_each(|(y, row)| {
                row.iter().enumerate().for_each(|(x, p)| {
                    if p.alpha() >= COVERAGE_THRESHOLD {
                        buffer[y * padded_width + (x / 8)] |= 1 << (7 - (x % 8));
                    }
                });
            });

        debug!("SVG rendered to {}x{} buffer", self.target_width, self.target_height);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF_FILLED: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16" viewBox="0 0 16 16">
        <rect x="0" y="0" width="8" height="16" fill="black"/>
    </svg>"#;

    fn bit(buffer: &[u8], width: u32, x: u32, y: u32) -> bool {
        let padded = width.div_ceil(8) as usize;
        buffer[y as usize * padded + (x / 8) as usize] & (1 << (7 - (x % 8))) != 0
    }

    #[test]
    fn test_packed_len_pads_rows() {
        assert_eq!(packed_len(32, 32), 128);
        assert_eq!(packed_len(16, 16), 32);
        assert_eq!(packed_len(10, 2), 4);
    }

    #[test]
    fn test_dark_fill_counts_as_ink() {
        let renderer = SvgImageRenderer::new(HALF_FILLED, 16, 16).unwrap();
        let mut buffer = vec![0xAAu8; packed_len(16, 16)];
        renderer.render_to_buffer(&mut buffer).unwrap();

        assert!(bit(&buffer, 16, 1, 1));
        assert!(bit(&buffer, 16, 6, 14));
        assert!(!bit(&buffer, 16, 9, 1));
        assert!(!bit(&buffer, 16, 15, 15));
    }

    #[test]
    fn test_scales_to_target() {
        let renderer = SvgImageRenderer::new(HALF_FILLED, 32, 32).unwrap();
        let mut buffer = vec![0u8; packed_len(32, 32)];
        renderer.render_to_buffer(&mut buffer).unwrap();

        assert!(bit(&buffer, 32, 14, 30));
        assert!(!bit(&buffer, 32, 18, 30));
    }

    #[test]
    fn test_buffer_too_small() {
        let renderer = SvgImageRenderer::new(HALF_FILLED, 16, 16).unwrap();
        let mut buffer = vec![0u8; 4];
        assert!(matches!(renderer.render_to_buffer(&mut buffer), Err(SvgImageError::BufferTooSmall)));
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        assert!(matches!(
            SvgImageRenderer::new("not an svg", 16, 16),
            Err(SvgImageError::SvgParseError(_))
        ));
    }
}
