//! Windows bitmap (.bmp) I/O implementation.

use std::fs::File;
use std::io::{BufWriter, Cursor, Write};

use super::{frame_to_save, row_to_bytes, row_to_rgb};
use crate::formats::bytes::{read_long, read_word, write_long, write_word};
use crate::{ColorMode, FileOp, FileOpError, Palette, Result, rgba};

const FILE_HEADER_SIZE: u32 = 14;
const INFO_HEADER_SIZE: u32 = 40;
const OS2_HEADER_SIZE: u32 = 12;

/// OS/2 1.x, BITMAPINFOHEADER, V2, V3, V4 and V5 headers.
const KNOWN_HEADER_SIZES: [u32; 6] = [OS2_HEADER_SIZE, INFO_HEADER_SIZE, 52, 56, 108, 124];

const BI_RGB: u32 = 0;
const BI_BITFIELDS: u32 = 3;

struct BmpHeader {
    data_offset: u32,
    header_size: u32,
    width: u32,
    height: u32,
    top_down: bool,
    bpp: u16,
    compression: u32,
    colors_used: u32,
}

impl BmpHeader {
    fn parse(data: &[u8]) -> std::io::Result<Self> {
        let mut r = Cursor::new(data);
        let magic = read_word(&mut r)?;
        if magic != u16::from_le_bytes(*b"BM") {
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "not a BMP file"));
        }
        let _file_size = read_long(&mut r)?;
        let _reserved = read_long(&mut r)?;
        let data_offset = read_long(&mut r)?;
        let header_size = read_long(&mut r)?;
        if !KNOWN_HEADER_SIZES.contains(&header_size) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("unknown info header size {header_size}"),
            ));
        }

        if header_size == OS2_HEADER_SIZE {
            let width = read_word(&mut r)? as u32;
            let height = read_word(&mut r)? as u32;
            let _planes = read_word(&mut r)?;
            let bpp = read_word(&mut r)?;
            return Ok(Self {
                data_offset,
                header_size,
                width,
                height,
                top_down: false,
                bpp,
                compression: BI_RGB,
                colors_used: 0,
            });
        }

        let width = read_long(&mut r)? as i32;
        let height = read_long(&mut r)? as i32;
        let _planes = read_word(&mut r)?;
        let bpp = read_word(&mut r)?;
        let compression = read_long(&mut r)?;
        let _image_size = read_long(&mut r)?;
        let _x_ppm = read_long(&mut r)?;
        let _y_ppm = read_long(&mut r)?;
        let colors_used = read_long(&mut r)?;

        Ok(Self {
            data_offset,
            header_size,
            width: width.unsigned_abs(),
            height: height.unsigned_abs(),
            top_down: height < 0,
            bpp,
            compression,
            colors_used,
        })
    }

    fn stride(&self) -> usize {
        (self.width as usize * self.bpp as usize).div_ceil(32) * 4
    }
}

struct ChannelMasks {
    r: u32,
    g: u32,
    b: u32,
    a: u32,
}

fn read_masks(data: &[u8], header: &BmpHeader) -> std::io::Result<ChannelMasks> {
    if header.compression != BI_BITFIELDS {
        return Ok(ChannelMasks {
            r: 0x00ff_0000,
            g: 0x0000_ff00,
            b: 0x0000_00ff,
            a: 0,
        });
    }
    let mut r = Cursor::new(data);
    r.set_position((FILE_HEADER_SIZE + INFO_HEADER_SIZE) as u64);
    let red = read_long(&mut r)?;
    let green = read_long(&mut r)?;
    let blue = read_long(&mut r)?;
    let alpha = if header.header_size >= 56 { read_long(&mut r)? } else { 0 };
    Ok(ChannelMasks {
        r: red,
        g: green,
        b: blue,
        a: alpha,
    })
}

fn channel(value: u32, mask: u32) -> u8 {
    if mask == 0 {
        return 255;
    }
    let shift = mask.trailing_zeros();
    let bits = (mask >> shift).count_ones();
    let c = (value & mask) >> shift;
    if bits >= 8 {
        (c >> (bits - 8)) as u8
    } else {
        (c * 255 / ((1 << bits) - 1)) as u8
    }
}

fn index_at(row: &[u8], x: usize, bpp: u16) -> u8 {
    match bpp {
        1 => (row[x / 8] >> (7 - x % 8)) & 1,
        4 => {
            if x % 2 == 0 {
                row[x / 2] >> 4
            } else {
                row[x / 2] & 0x0f
            }
        }
        _ => row[x],
    }
}

pub(crate) fn load_bmp(fop: &mut FileOp) -> Result<()> {
    let data = std::fs::read(fop.filename())?;
    let header = BmpHeader::parse(&data).map_err(|e| FileOpError::decode(format!("Invalid BMP header: {e}")))?;

    if header.width == 0 || header.height == 0 {
        return Err(FileOpError::decode("BMP file has no pixels"));
    }
    if header.compression != BI_RGB && !(header.compression == BI_BITFIELDS && header.bpp == 32) {
        return Err(FileOpError::decode(format!("Unsupported BMP compression ({})", header.compression)));
    }
    if !matches!(header.bpp, 1 | 4 | 8 | 24 | 32) {
        return Err(FileOpError::decode(format!("Unsupported BMP bit depth ({})", header.bpp)));
    }

    let stride = header.stride();
    let pixel_start = header.data_offset as usize;
    let needed = stride.checked_mul(header.height as usize).and_then(|n| n.checked_add(pixel_start));
    if needed.is_none_or(|n| n > data.len()) {
        return Err(FileOpError::decode("Truncated BMP file"));
    }

    let color_mode = if header.bpp <= 8 {
        let entry_size = if header.header_size == OS2_HEADER_SIZE { 3 } else { 4 };
        let count = if header.colors_used > 0 {
            (header.colors_used as usize).min(256)
        } else {
            1 << header.bpp
        };
        let start = FILE_HEADER_SIZE
            .checked_add(header.header_size)
            .ok_or_else(|| FileOpError::decode("Invalid BMP header"))? as usize;
        for i in 0..count {
            let Some(bgr) = i
                .checked_mul(entry_size)
                .and_then(|o| o.checked_add(start))
                .and_then(|o| data.get(o..o.checked_add(3)?))
            else {
                break;
            };
            fop.sequence_set_color(i, bgr[2], bgr[1], bgr[0]);
        }
        ColorMode::Indexed
    } else {
        ColorMode::Rgb
    };
    let masks = read_masks(&data, &header).map_err(|e| FileOpError::decode(format!("Invalid BMP bit fields: {e}")))?;

    let progress = fop.progress_handle();
    let (width, height) = (header.width, header.height);
    let mut transparent = false;
    let image = fop.sequence_image(color_mode, width, height)?;

    for row in 0..height {
        progress.check_stop()?;
        let y = if header.top_down { row } else { height - 1 - row };
        let o = pixel_start + row as usize * stride;
        let src = &data[o..o + stride];
        for x in 0..width {
            let xi = x as usize;
            let color = match header.bpp {
                24 => rgba(src[xi * 3 + 2], src[xi * 3 + 1], src[xi * 3], 255),
                32 => {
                    let v = u32::from_le_bytes([src[xi * 4], src[xi * 4 + 1], src[xi * 4 + 2], src[xi * 4 + 3]]);
                    let a = channel(v, masks.a);
                    transparent |= a != 255;
                    rgba(channel(v, masks.r), channel(v, masks.g), channel(v, masks.b), a)
                }
                bpp => index_at(src, xi, bpp) as u32,
            };
            image.set_pixel(x, y, color);
        }
        progress.update_steps(row as usize + 1, height as usize);
    }

    fop.sequence_set_has_alpha(transparent);
    Ok(())
}

pub(crate) fn save_bmp(fop: &mut FileOp) -> Result<()> {
    let (image, palette) = frame_to_save(fop)?;
    let progress = fop.progress_handle();

    let (bpp, palette) = match image.color_mode() {
        ColorMode::Rgb => (24u16, None),
        ColorMode::Grayscale => (8, Some(Palette::grayscale(0))),
        ColorMode::Indexed => (8, Some(palette.clone())),
    };
    let (width, height) = (image.width(), image.height());
    let stride = (width as usize * bpp as usize).div_ceil(32) * 4;
    let palette_size = if palette.is_some() { 256 * 4 } else { 0 };
    let data_offset = FILE_HEADER_SIZE + INFO_HEADER_SIZE + palette_size;
    let image_size = (stride * height as usize) as u32;

    let mut w = BufWriter::new(File::create(fop.filename())?);
    w.write_all(b"BM")?;
    write_long(&mut w, data_offset + image_size)?;
    write_long(&mut w, 0)?;
    write_long(&mut w, data_offset)?;

    write_long(&mut w, INFO_HEADER_SIZE)?;
    write_long(&mut w, width)?;
    write_long(&mut w, height)?;
    write_word(&mut w, 1)?;
    write_word(&mut w, bpp)?;
    write_long(&mut w, BI_RGB)?;
    write_long(&mut w, image_size)?;
    // 72 dpi
    write_long(&mut w, 2835)?;
    write_long(&mut w, 2835)?;
    write_long(&mut w, if palette.is_some() { 256 } else { 0 })?;
    write_long(&mut w, 0)?;

    if let Some(palette) = &palette {
        for c in palette.colors() {
            w.write_all(&[c.b, c.g, c.r, 0])?;
        }
    }

    let mut row = Vec::with_capacity(stride);
    for (i, y) in (0..height).rev().enumerate() {
        progress.check_stop()?;
        if bpp == 24 {
            row_to_rgb(image, &Palette::default(), y, &mut row);
            for px in row.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
        } else {
            row_to_bytes(image, y, &mut row);
        }
        row.resize(stride, 0);
        w.write_all(&row)?;
        progress.update_steps(i + 1, height as usize);
    }
    w.flush()?;
    Ok(())
}
