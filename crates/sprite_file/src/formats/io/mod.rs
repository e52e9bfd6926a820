//! I/O implementations for the built-in file formats.
//!
//! The implementations are reached through the callbacks of [`super::FileFormat`].
//! Formats that support sequences decode into [`crate::FileOp::sequence_image`] and
//! encode [`crate::FileOp::sequence_frame`]; GIF works on the whole sprite.

mod bmp;
mod gif;
mod jpeg;
mod pcx;
mod png;

pub(crate) use self::bmp::{load_bmp, save_bmp};
pub(crate) use self::gif::{load_gif, save_gif};
pub use self::jpeg::JpegOptions;
pub(crate) use self::jpeg::{load_jpeg, save_jpeg};
pub(crate) use self::pcx::{load_pcx, save_pcx};
pub(crate) use self::png::{load_png, save_png};

use crate::{ColorMode, FileOp, FileOpError, Image, Palette, Result, graya_v, rgba_b, rgba_g, rgba_r};

/// The frame a sequence format has to write, with its palette.
fn frame_to_save(fop: &FileOp) -> Result<(&Image, &Palette)> {
    match (fop.sequence_frame(), fop.sequence_palette()) {
        (Some(image), Some(palette)) => Ok((image, palette)),
        _ => Err(FileOpError::encode(format!("no frame to save to '{}'", fop.filename().display()))),
    }
}

/// Packed RGB bytes of one row, transparent pixels are written as they are.
fn row_to_rgb(image: &Image, palette: &Palette, y: u32, out: &mut Vec<u8>) {
    out.clear();
    for x in 0..image.width() {
        let c = image.pixel(x, y);
        match image.color_mode() {
            ColorMode::Rgb => out.extend_from_slice(&[rgba_r(c), rgba_g(c), rgba_b(c)]),
            ColorMode::Grayscale => out.extend_from_slice(&[graya_v(c); 3]),
            ColorMode::Indexed => {
                let color = palette.color(c as usize);
                out.extend_from_slice(&[color.r, color.g, color.b]);
            }
        }
    }
}

/// One byte per pixel: the index, or the gray value.
fn row_to_bytes(image: &Image, y: u32, out: &mut Vec<u8>) {
    out.clear();
    out.extend((0..image.width()).map(|x| {
        let c = image.pixel(x, y);
        match image.color_mode() {
            ColorMode::Grayscale => graya_v(c),
            ColorMode::Rgb => rgba_r(c),
            ColorMode::Indexed => c as u8,
        }
    }));
}
