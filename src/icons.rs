/*
 *  icons.rs
 *
 *  wxoled - weather at a glance
 *	(c) 2025-26 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use log::{debug, warn};
use mini_moka::unsync::Cache;
use std::fs;
use std::path::PathBuf;
use embedded_graphics::{
    image::{Image, ImageRaw},
    pixelcolor::BinaryColor,
    prelude::*,
};

use crate::svgimage::{packed_len, SvgImageRenderer};

const ICON_CACHE_CAPACITY: u64 = 64;

/// Square 1-bit icon, rows packed MSB-first and padded to a byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconBitmap {
    size: u32,
    data: Vec<u8>,
}

impl IconBitmap {
    pub fn blank(size: u32) -> Self {
        IconBitmap { size, data: vec![0u8; packed_len(size, size)] }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }

    pub fn pixel(&self, x: u32, y: u32) -> bool {
        if x >= self.size || y >= self.size {
            return false;
        }
        let row = self.size.div_ceil(8) as usize;
        self.data[y as usize * row + (x / 8) as usize] & (1 << (7 - (x % 8))) != 0
    }

    /// Paste the icon with its top-left corner at `at`, off pixels included.
    pub fn draw<D>(&self, target: &mut D, at: Point) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        if self.size == 0 {
            return Ok(());
        }
        let raw = ImageRaw::<BinaryColor>::new(&self.data, self.size);
        Image::new(&raw, at).draw(target)
    }
}

/// Maps icon codes such as `10d` to bitmaps from `<dir>/<code>.svg`.
pub struct IconResolver {
    dir: PathBuf,
    cache: Cache<(String, u32), IconBitmap>,
}

impl IconResolver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        IconResolver {
            dir: dir.into(),
            cache: Cache::new(ICON_CACHE_CAPACITY),
        }
    }

    /// Never fails: anything that cannot be drawn comes back blank.
    pub fn resolve(&mut self, icon_code: &str, size: u32) -> IconBitmap {
        let key = (icon_code.to_string(), size);
        if let Some(hit) = self.cache.get(&key).cloned() {
            return hit;
        }
        let icon = self.load(icon_code, size);
        self.cache.insert(key, icon.clone());
        icon
    }

    fn icon_path(&self, icon_code: &str) -> Option<PathBuf> {
        if icon_code.is_empty() || icon_code.contains(['/', '\\']) || icon_code.contains("..") {
            return None;
        }
        Some(self.dir.join(format!("{icon_code}.svg")))
    }

    fn load(&self, icon_code: &str, size: u32) -> IconBitmap {
        if size == 0 {
            return IconBitmap::blank(0);
        }
        let Some(path) = self.icon_path(icon_code) else {
            warn!("icon code {icon_code:?} rejected");
            return IconBitmap::blank(size);
        };
        if !path.is_file() {
            warn!("{} doesn't exist!", path.display());
            return IconBitmap::blank(size);
        }
        let svg = match fs::read_to_string(&path) {
            Ok(svg) => svg,
            Err(e) => {
                warn!("{}: {e}", path.display());
                return IconBitmap::blank(size);
            }
        };

        let mut icon = IconBitmap::blank(size);
        let rendered = SvgImageRenderer::new(&svg, size, size)
            .and_then(|renderer| renderer.render_to_buffer(&mut icon.data));
        match rendered {
            Ok(()) => {
                debug!("icon {icon_code} rendered at {size}px");
                icon
            }
            Err(e) => {
                warn!("{}: {e}", path.display());
                IconBitmap::blank(size)
            }
        }
    }
}
