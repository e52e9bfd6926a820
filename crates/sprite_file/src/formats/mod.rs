pub(crate) mod io;

pub mod bytes;

mod capabilities;
pub use capabilities::*;

mod file_format;
pub use file_format::*;

mod format_registry;
pub use format_registry::*;

pub use io::JpegOptions;

use serde::{Deserialize, Serialize};

/// How many times a GIF animation should repeat.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatCount {
    /// Loop forever
    #[default]
    Infinite,
    /// Play once, no repeat
    Once,
    /// Repeat N times
    Times(u16),
}

impl RepeatCount {
    pub(crate) fn to_gif(self) -> Option<gif::Repeat> {
        match self {
            RepeatCount::Infinite => Some(gif::Repeat::Infinite),
            // No repeat extension needed
            RepeatCount::Once => None,
            RepeatCount::Times(n) => Some(gif::Repeat::Finite(n)),
        }
    }
}

/// Tunables of a file operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpOptions {
    /// When loading a sequence, a frame equal to the previous one shares its image.
    pub link_identical_frames: bool,

    /// JPEG quality, 1 to 100.
    pub jpeg_quality: u8,

    /// Loop behaviour written into animated GIFs.
    pub gif_repeat: RepeatCount,
}

impl FileOpOptions {
    pub const fn new() -> Self {
        FileOpOptions {
            link_identical_frames: true,
            jpeg_quality: 90,
            gif_repeat: RepeatCount::Infinite,
        }
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality.clamp(1, 100)
    }
}

impl Default for FileOpOptions {
    fn default() -> Self {
        Self::new()
    }
}
