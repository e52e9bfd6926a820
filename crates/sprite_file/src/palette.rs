use serde::{Deserialize, Serialize};

pub const PALETTE_SIZE: usize = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

/// A 256 entry palette that applies from `frame` on until the next palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    frame: usize,
    colors: Vec<Color>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::grayscale(0)
    }
}

impl Palette {
    /// All black palette.
    pub fn new(frame: usize) -> Self {
        Self {
            frame,
            colors: vec![Color::default(); PALETTE_SIZE],
        }
    }

    /// Linear ramp from black to white.
    pub fn grayscale(frame: usize) -> Self {
        Self {
            frame,
            colors: (0..PALETTE_SIZE).map(|i| Color::new(i as u8, i as u8, i as u8)).collect(),
        }
    }

    /// Builds a palette from packed RGB triplets, missing entries stay black.
    pub fn from_rgb_bytes(frame: usize, rgb: &[u8]) -> Self {
        let mut pal = Self::new(frame);
        for (i, c) in rgb.chunks_exact(3).take(PALETTE_SIZE).enumerate() {
            pal.colors[i] = Color::new(c[0], c[1], c[2]);
        }
        pal
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn set_frame(&mut self, frame: usize) {
        self.frame = frame;
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Returns black for out of range indices.
    pub fn color(&self, index: usize) -> Color {
        self.colors.get(index).copied().unwrap_or_default()
    }

    /// Out of range indices are ignored.
    pub fn set_color(&mut self, index: usize, color: Color) {
        if let Some(c) = self.colors.get_mut(index) {
            *c = color;
        }
    }

    /// Number of entries that differ from `other`.
    pub fn count_diff(&self, other: &Palette) -> usize {
        self.colors.iter().zip(other.colors.iter()).filter(|(a, b)| a != b).count()
    }

    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.colors.iter().flat_map(|c| [c.r, c.g, c.b]).collect()
    }
}
