//! Built-in file formats.
//!
//! Every variant of [`FileFormat`] is a concrete codec with a fixed name,
//! extension list, capability set and load/save callbacks. The process-wide
//! registry is populated from [`FileFormat::ALL`]. Extension lookup goes
//! through the registry only.

use super::{FormatCapabilities, FormatDescriptor, LoadFn, SaveFn, io};

/// Represents all built-in sprite file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// Windows bitmap (.bmp)
    Bmp,
    /// Graphics Interchange Format, animated (.gif)
    Gif,
    /// JPEG (.jpg, .jpeg)
    Jpeg,
    /// ZSoft Paintbrush (.pcx)
    Pcx,
    /// Portable Network Graphics (.png)
    Png,
}

impl FileFormat {
    /// All built-in formats in registration order
    pub const ALL: &'static [FileFormat] = &[FileFormat::Bmp, FileFormat::Gif, FileFormat::Jpeg, FileFormat::Pcx, FileFormat::Png];

    /// Comma separated extension list as stored in the descriptor.
    pub fn extension_list(&self) -> &'static str {
        match self {
            FileFormat::Bmp => "bmp",
            FileFormat::Gif => "gif",
            FileFormat::Jpeg => "jpg,jpeg",
            FileFormat::Pcx => "pcx",
            FileFormat::Png => "png",
        }
    }

    /// Get a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            FileFormat::Bmp => "bmp",
            FileFormat::Gif => "gif",
            FileFormat::Jpeg => "jpeg",
            FileFormat::Pcx => "pcx",
            FileFormat::Png => "png",
        }
    }

    /// Get the capabilities this format supports.
    pub fn capabilities(&self) -> FormatCapabilities {
        use FormatCapabilities as C;
        match self {
            FileFormat::Bmp | FileFormat::Pcx => C::RGB | C::GRAY | C::INDEXED | C::SEQUENCES,
            FileFormat::Gif => C::RGB | C::GRAY | C::INDEXED | C::FRAMES | C::PALETTES,
            FileFormat::Jpeg => C::RGB | C::GRAY | C::SEQUENCES,
            FileFormat::Png => C::RGB | C::RGBA | C::GRAY | C::GRAYA | C::INDEXED | C::SEQUENCES,
        }
    }

    pub fn loader(&self) -> Option<LoadFn> {
        match self {
            FileFormat::Bmp => Some(io::load_bmp),
            FileFormat::Gif => Some(io::load_gif),
            FileFormat::Jpeg => Some(io::load_jpeg),
            FileFormat::Pcx => Some(io::load_pcx),
            FileFormat::Png => Some(io::load_png),
        }
    }

    pub fn saver(&self) -> Option<SaveFn> {
        match self {
            FileFormat::Bmp => Some(io::save_bmp),
            FileFormat::Gif => Some(io::save_gif),
            FileFormat::Jpeg => Some(io::save_jpeg),
            FileFormat::Pcx => Some(io::save_pcx),
            FileFormat::Png => Some(io::save_png),
        }
    }

    /// Builds the registry entry for this format.
    pub fn descriptor(&self) -> FormatDescriptor {
        FormatDescriptor {
            name: self.name(),
            extensions: self.extension_list(),
            load: self.loader(),
            save: self.saver(),
            capabilities: self.capabilities(),
        }
    }
}
