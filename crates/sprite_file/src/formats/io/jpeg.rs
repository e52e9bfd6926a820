//! JPEG (.jpg, .jpeg) I/O implementation on top of the `image` crate codec.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use image::codecs::jpeg::{JpegDecoder, JpegEncoder};
use image::{DynamicImage, ExtendedColorType};
use serde::{Deserialize, Serialize};

use super::{frame_to_save, row_to_bytes, row_to_rgb};
use crate::{ColorMode, FileOp, Result, graya, rgba};

/// Encoder settings shared by all frames of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JpegOptions {
    pub quality: u8,
}

pub(crate) fn load_jpeg(fop: &mut FileOp) -> Result<()> {
    let reader = BufReader::new(File::open(fop.filename())?);
    let decoder = JpegDecoder::new(reader)?;
    let decoded = DynamicImage::from_decoder(decoder)?;
    let progress = fop.progress_handle();
    progress.update(0.5);

    let (width, height) = (decoded.width(), decoded.height());
    match decoded {
        DynamicImage::ImageLuma8(gray) => {
            let image = fop.sequence_image(ColorMode::Grayscale, width, height)?;
            for (y, row) in gray.rows().enumerate() {
                progress.check_stop()?;
                for (x, px) in row.enumerate() {
                    image.set_pixel(x as u32, y as u32, graya(px.0[0], 255));
                }
            }
        }
        other => {
            let rgb = other.to_rgb8();
            let image = fop.sequence_image(ColorMode::Rgb, width, height)?;
            for (y, row) in rgb.rows().enumerate() {
                progress.check_stop()?;
                for (x, px) in row.enumerate() {
                    image.set_pixel(x as u32, y as u32, rgba(px.0[0], px.0[1], px.0[2], 255));
                }
            }
        }
    }
    Ok(())
}

pub(crate) fn save_jpeg(fop: &mut FileOp) -> Result<()> {
    if fop.sequence_filedata::<JpegOptions>().is_none() {
        let quality = fop.options().jpeg_quality();
        log::debug!("saving JPEG with quality {quality}");
        fop.sequence_set_filedata(JpegOptions { quality });
    }
    let quality = fop.sequence_filedata::<JpegOptions>().map_or(90, |o| o.quality);

    let (image, palette) = frame_to_save(fop)?;
    let progress = fop.progress_handle();
    let (width, height) = (image.width(), image.height());

    let gray = image.color_mode() == ColorMode::Grayscale;
    let mut pixels = Vec::with_capacity(width as usize * height as usize * if gray { 1 } else { 3 });
    let mut row = Vec::new();
    for y in 0..height {
        progress.check_stop()?;
        if gray {
            row_to_bytes(image, y, &mut row);
        } else {
            row_to_rgb(image, palette, y, &mut row);
        }
        pixels.extend_from_slice(&row);
        progress.update_steps(y as usize + 1, 2 * height as usize);
    }

    let mut w = BufWriter::new(File::create(fop.filename())?);
    let mut encoder = JpegEncoder::new_with_quality(&mut w, quality);
    let color_type = if gray { ExtendedColorType::L8 } else { ExtendedColorType::Rgb8 };
    encoder.encode(&pixels, width, height, color_type)?;
    w.flush()?;
    Ok(())
}
