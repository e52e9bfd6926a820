use serde::{Deserialize, Serialize};

/// Pixel layout of an [`Image`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorMode {
    /// 4 bytes per pixel: R, G, B, A
    Rgb,
    /// 2 bytes per pixel: value, alpha
    Grayscale,
    /// 1 byte per pixel: palette index
    Indexed,
}

impl ColorMode {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            ColorMode::Rgb => 4,
            ColorMode::Grayscale => 2,
            ColorMode::Indexed => 1,
        }
    }
}

pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    r as u32 | (g as u32) << 8 | (b as u32) << 16 | (a as u32) << 24
}

pub const fn rgba_r(c: u32) -> u8 {
    (c & 0xff) as u8
}

pub const fn rgba_g(c: u32) -> u8 {
    ((c >> 8) & 0xff) as u8
}

pub const fn rgba_b(c: u32) -> u8 {
    ((c >> 16) & 0xff) as u8
}

pub const fn rgba_a(c: u32) -> u8 {
    ((c >> 24) & 0xff) as u8
}

pub const fn graya(v: u8, a: u8) -> u32 {
    v as u32 | (a as u32) << 8
}

pub const fn graya_v(c: u32) -> u8 {
    (c & 0xff) as u8
}

pub const fn graya_a(c: u32) -> u8 {
    ((c >> 8) & 0xff) as u8
}

/// A 2-D pixel buffer in one color mode.
///
/// Pixels are addressed through packed `u32` values: [`rgba`] for RGB,
/// [`graya`] for grayscale and the plain index for indexed images.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    color_mode: ColorMode,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Image {
    pub fn new(color_mode: ColorMode, width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * color_mode.bytes_per_pixel();
        Self {
            color_mode,
            width,
            height,
            data: vec![0; len],
        }
    }

    /// Wraps raw pixel bytes, returns `None` if the length doesn't match the layout.
    pub fn from_raw(color_mode: ColorMode, width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize * color_mode.bytes_per_pixel() {
            return None;
        }
        Some(Self {
            color_mode,
            width,
            height,
            data,
        })
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Checks if the image already has the given mode and size.
    pub fn is_layout(&self, color_mode: ColorMode, width: u32, height: u32) -> bool {
        self.color_mode == color_mode && self.width == width && self.height == height
    }

    fn stride(&self) -> usize {
        self.width as usize * self.color_mode.bytes_per_pixel()
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// Returns the packed pixel at (x, y), 0 outside of the image.
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        let bpp = self.color_mode.bytes_per_pixel();
        let o = (y as usize * self.width as usize + x as usize) * bpp;
        match self.color_mode {
            ColorMode::Rgb => rgba(self.data[o], self.data[o + 1], self.data[o + 2], self.data[o + 3]),
            ColorMode::Grayscale => graya(self.data[o], self.data[o + 1]),
            ColorMode::Indexed => self.data[o] as u32,
        }
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let bpp = self.color_mode.bytes_per_pixel();
        let o = (y as usize * self.width as usize + x as usize) * bpp;
        match self.color_mode {
            ColorMode::Rgb => {
                self.data[o] = rgba_r(color);
                self.data[o + 1] = rgba_g(color);
                self.data[o + 2] = rgba_b(color);
                self.data[o + 3] = rgba_a(color);
            }
            ColorMode::Grayscale => {
                self.data[o] = graya_v(color);
                self.data[o + 1] = graya_a(color);
            }
            ColorMode::Indexed => self.data[o] = color as u8,
        }
    }

    /// Fills the whole image with one packed color.
    pub fn clear(&mut self, color: u32) {
        match self.color_mode {
            ColorMode::Rgb => {
                let px = [rgba_r(color), rgba_g(color), rgba_b(color), rgba_a(color)];
                for chunk in self.data.chunks_exact_mut(4) {
                    chunk.copy_from_slice(&px);
                }
            }
            ColorMode::Grayscale => {
                let px = [graya_v(color), graya_a(color)];
                for chunk in self.data.chunks_exact_mut(2) {
                    chunk.copy_from_slice(&px);
                }
            }
            ColorMode::Indexed => self.data.fill(color as u8),
        }
    }

    /// True if any pixel is not fully opaque (always false for indexed images).
    pub fn has_transparency(&self) -> bool {
        match self.color_mode {
            ColorMode::Rgb => self.data.chunks_exact(4).any(|px| px[3] != 255),
            ColorMode::Grayscale => self.data.chunks_exact(2).any(|px| px[1] != 255),
            ColorMode::Indexed => false,
        }
    }
}
