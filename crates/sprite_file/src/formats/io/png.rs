//! Portable Network Graphics (.png) I/O implementation.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use super::frame_to_save;
use crate::{ColorMode, FileOp, FileOpError, Result, graya, rgba};

/// Unpacks one sample of a 1, 2 or 4 bit row.
fn packed_sample(row: &[u8], x: usize, bits: usize) -> u8 {
    let per_byte = 8 / bits;
    let byte = row[x / per_byte];
    let shift = 8 - bits * (x % per_byte + 1);
    (byte >> shift) & ((1 << bits) - 1) as u8
}

fn scale_gray(v: u8, bits: usize) -> u8 {
    if bits >= 8 {
        v
    } else {
        (v as u32 * 255 / ((1u32 << bits) - 1)) as u8
    }
}

pub(crate) fn load_png(fop: &mut FileOp) -> Result<()> {
    let file = File::open(fop.filename())?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;

    let (width, height, palette) = {
        let info = reader.info();
        (info.width, info.height, info.palette.as_ref().map(|p| p.to_vec()))
    };
    let (color_type, bit_depth) = reader.output_color_type();
    let bits = bit_depth as usize;

    let color_mode = match color_type {
        png::ColorType::Grayscale | png::ColorType::GrayscaleAlpha => ColorMode::Grayscale,
        png::ColorType::Rgb | png::ColorType::Rgba => ColorMode::Rgb,
        png::ColorType::Indexed => ColorMode::Indexed,
    };
    if let Some(palette) = palette {
        for (i, c) in palette.chunks_exact(3).enumerate() {
            fop.sequence_set_color(i, c[0], c[1], c[2]);
        }
    }

    let buffer_size = reader
        .output_buffer_size()
        .ok_or_else(|| FileOpError::decode(format!("PNG image {width}x{height} is too large")))?;
    let mut buf = vec![0; buffer_size];
    let output = reader.next_frame(&mut buf)?;
    let line_size = output.line_size;

    let progress = fop.progress_handle();
    let mut transparent = false;
    let image = fop.sequence_image(color_mode, width, height)?;

    for y in 0..height {
        progress.check_stop()?;
        let row = &buf[y as usize * line_size..(y as usize + 1) * line_size];
        for x in 0..width {
            let xi = x as usize;
            let color = match color_type {
                png::ColorType::Grayscale if bits < 8 => graya(scale_gray(packed_sample(row, xi, bits), bits), 255),
                png::ColorType::Grayscale => graya(row[xi], 255),
                png::ColorType::GrayscaleAlpha => {
                    transparent |= row[xi * 2 + 1] != 255;
                    graya(row[xi * 2], row[xi * 2 + 1])
                }
                png::ColorType::Rgb => rgba(row[xi * 3], row[xi * 3 + 1], row[xi * 3 + 2], 255),
                png::ColorType::Rgba => {
                    transparent |= row[xi * 4 + 3] != 255;
                    rgba(row[xi * 4], row[xi * 4 + 1], row[xi * 4 + 2], row[xi * 4 + 3])
                }
                png::ColorType::Indexed if bits < 8 => packed_sample(row, xi, bits) as u32,
                png::ColorType::Indexed => row[xi] as u32,
            };
            image.set_pixel(x, y, color);
        }
        progress.update_steps(y as usize + 1, height as usize);
    }

    fop.sequence_set_has_alpha(transparent);
    Ok(())
}

pub(crate) fn save_png(fop: &mut FileOp) -> Result<()> {
    let (image, palette) = frame_to_save(fop)?;
    let progress = fop.progress_handle();
    let (width, height) = (image.width(), image.height());

    let w = BufWriter::new(File::create(fop.filename())?);
    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Fast);
    match image.color_mode() {
        ColorMode::Rgb => encoder.set_color(png::ColorType::Rgba),
        ColorMode::Grayscale => encoder.set_color(png::ColorType::GrayscaleAlpha),
        ColorMode::Indexed => {
            encoder.set_color(png::ColorType::Indexed);
            encoder.set_palette(palette.to_rgb_bytes());
        }
    }

    let mut stream = encoder.write_header()?.into_stream_writer()?;
    for y in 0..height {
        progress.check_stop()?;
        stream.write_all(image.row(y))?;
        progress.update_steps(y as usize + 1, height as usize);
    }
    stream.finish()?;
    Ok(())
}
