//! ZSoft Paintbrush (.pcx) I/O implementation.
//!
//! Supports 8 bit images with one plane (256 color palette at the end of the
//! file) or three planes (RGB), run length encoded.

use std::fs::File;
use std::io::{BufWriter, Cursor, Write};

use super::{frame_to_save, row_to_bytes, row_to_rgb};
use crate::formats::bytes::{read_word, write_word};
use crate::{ColorMode, FileOp, FileOpError, Palette, Result, rgba};

const HEADER_SIZE: usize = 128;
const PALETTE_MARKER: u8 = 0x0C;

struct PcxHeader {
    bpp: u8,
    width: u32,
    height: u32,
    planes: u8,
    bytes_per_line: usize,
}

impl PcxHeader {
    fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE || data[0] != 0x0A {
            return Err(FileOpError::decode("Invalid PCX header"));
        }
        if data[2] != 1 {
            return Err(FileOpError::decode(format!("Unsupported PCX encoding ({})", data[2])));
        }
        let [x_min, y_min, x_max, y_max] = read_window(&data[4..12]).map_err(|e| FileOpError::decode(format!("Invalid PCX header: {e}")))?;
        if x_max < x_min || y_max < y_min {
            return Err(FileOpError::decode("Invalid PCX image window"));
        }
        Ok(Self {
            bpp: data[3],
            width: (x_max - x_min) as u32 + 1,
            height: (y_max - y_min) as u32 + 1,
            planes: data[65],
            bytes_per_line: u16::from_le_bytes([data[66], data[67]]) as usize,
        })
    }
}

fn read_window(data: &[u8]) -> std::io::Result<[u16; 4]> {
    let mut r = Cursor::new(data);
    Ok([read_word(&mut r)?, read_word(&mut r)?, read_word(&mut r)?, read_word(&mut r)?])
}

/// Run length decoder; runs may continue across scanlines.
struct RleReader<'a> {
    data: &'a [u8],
    pos: usize,
    run_value: u8,
    run_left: usize,
}

impl<'a> RleReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            run_value: 0,
            run_left: 0,
        }
    }

    fn fill(&mut self, out: &mut [u8]) -> Result<()> {
        for b in out.iter_mut() {
            // zero length runs are skipped
            while self.run_left == 0 {
                let Some(&c) = self.data.get(self.pos) else {
                    return Err(FileOpError::decode("Truncated PCX image data"));
                };
                self.pos += 1;
                if c & 0xC0 == 0xC0 {
                    let Some(&v) = self.data.get(self.pos) else {
                        return Err(FileOpError::decode("Truncated PCX image data"));
                    };
                    self.pos += 1;
                    self.run_value = v;
                    self.run_left = (c & 0x3F) as usize;
                } else {
                    self.run_value = c;
                    self.run_left = 1;
                }
            }
            *b = self.run_value;
            self.run_left -= 1;
        }
        Ok(())
    }
}

fn encode_line(line: &[u8], out: &mut Vec<u8>) {
    let mut i = 0;
    while i < line.len() {
        let v = line[i];
        let mut run = 1;
        while i + run < line.len() && line[i + run] == v && run < 63 {
            run += 1;
        }
        if run > 1 || v & 0xC0 == 0xC0 {
            out.push(0xC0 | run as u8);
        }
        out.push(v);
        i += run;
    }
}

pub(crate) fn load_pcx(fop: &mut FileOp) -> Result<()> {
    let data = std::fs::read(fop.filename())?;
    let header = PcxHeader::parse(&data)?;

    let color_mode = match (header.bpp, header.planes) {
        (8, 1) => ColorMode::Indexed,
        (8, 3) => ColorMode::Rgb,
        (bpp, planes) => {
            return Err(FileOpError::decode(format!(
                "Unsupported PCX layout ({bpp} bits per pixel, {planes} planes)"
            )));
        }
    };
    if header.bytes_per_line < header.width as usize {
        return Err(FileOpError::decode("Invalid PCX line length"));
    }
    // one RLE pair expands to at most 63 bytes
    let decoded_len = header.bytes_per_line as u64 * header.planes as u64 * header.height as u64;
    if decoded_len.div_ceil(63) > (data.len() - HEADER_SIZE) as u64 {
        return Err(FileOpError::decode(format!(
            "PCX file is too short for a {}x{} image",
            header.width, header.height
        )));
    }

    if color_mode == ColorMode::Indexed {
        if data.len() >= HEADER_SIZE + 769 && data[data.len() - 769] == PALETTE_MARKER {
            let pal = &data[data.len() - 768..];
            for (i, c) in pal.chunks_exact(3).enumerate() {
                fop.sequence_set_color(i, c[0], c[1], c[2]);
            }
        } else {
            log::warn!("PCX file '{}' has no 256 color palette", fop.filename().display());
            let gray = Palette::grayscale(0);
            fop.sequence_set_palette(&gray);
        }
    }

    let progress = fop.progress_handle();
    let (width, height, planes) = (header.width, header.height, header.planes as usize);
    let image = fop.sequence_image(color_mode, width, height)?;
    let mut reader = RleReader::new(&data[HEADER_SIZE..]);
    let mut line = vec![0u8; header.bytes_per_line * planes];

    for y in 0..height {
        progress.check_stop()?;
        reader.fill(&mut line)?;
        for x in 0..width {
            let xi = x as usize;
            let color = if planes == 1 {
                line[xi] as u32
            } else {
                let bpl = header.bytes_per_line;
                rgba(line[xi], line[bpl + xi], line[2 * bpl + xi], 255)
            };
            image.set_pixel(x, y, color);
        }
        progress.update_steps(y as usize + 1, height as usize);
    }
    Ok(())
}

pub(crate) fn save_pcx(fop: &mut FileOp) -> Result<()> {
    let (image, palette) = frame_to_save(fop)?;
    let progress = fop.progress_handle();

    let (planes, palette) = match image.color_mode() {
        ColorMode::Rgb => (3u8, None),
        ColorMode::Grayscale => (1, Some(Palette::grayscale(0))),
        ColorMode::Indexed => (1, Some(palette.clone())),
    };
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 || width > u16::MAX as u32 || height > u16::MAX as u32 {
        return Err(FileOpError::encode(format!("PCX can't store a {width}x{height} image")));
    }
    let bytes_per_line = (width as usize).div_ceil(2) * 2;

    let mut w = BufWriter::new(File::create(fop.filename())?);
    let mut header = Vec::with_capacity(HEADER_SIZE);
    header.extend_from_slice(&[0x0A, 5, 1, 8]);
    write_word(&mut header, 0)?;
    write_word(&mut header, 0)?;
    write_word(&mut header, (width - 1) as u16)?;
    write_word(&mut header, (height - 1) as u16)?;
    write_word(&mut header, 72)?;
    write_word(&mut header, 72)?;
    header.extend_from_slice(&[0; 48]);
    header.push(0);
    header.push(planes);
    write_word(&mut header, bytes_per_line as u16)?;
    // 1 = color or b/w
    write_word(&mut header, 1)?;
    header.resize(HEADER_SIZE, 0);
    w.write_all(&header)?;

    let mut row = Vec::new();
    let mut plane = vec![0u8; bytes_per_line];
    let mut encoded = Vec::new();
    for y in 0..height {
        progress.check_stop()?;
        encoded.clear();
        if planes == 1 {
            row_to_bytes(image, y, &mut row);
            plane[..row.len()].copy_from_slice(&row);
            encode_line(&plane, &mut encoded);
        } else {
            row_to_rgb(image, &Palette::default(), y, &mut row);
            for p in 0..3 {
                for (dst, px) in plane.iter_mut().zip(row.chunks_exact(3)) {
                    *dst = px[p];
                }
                encode_line(&plane, &mut encoded);
            }
        }
        w.write_all(&encoded)?;
        progress.update_steps(y as usize + 1, height as usize);
    }

    if let Some(palette) = palette {
        w.write_all(&[PALETTE_MARKER])?;
        w.write_all(&palette.to_rgb_bytes())?;
    }
    w.flush()?;
    Ok(())
}
