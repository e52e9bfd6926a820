//! Graphics Interchange Format (.gif) I/O implementation.
//!
//! Loading composes all frames (disposal, transparency, local palettes) into
//! one indexed layer. Saving writes indexed and opaque grayscale frames with
//! their palettes as they are. Everything else is quantized to 255 colors with
//! quantette (Wu's algorithm), with index 0 kept for transparent pixels.

use std::borrow::Cow;
use std::cell::Cell;
use std::fs::File;
use std::io::{BufWriter, Read};
use std::num::NonZeroU64;
use std::rc::Rc;

use crate::{Cel, ColorMode, FileOp, FileOpError, Image, Palette, Result, Sprite, graya_a, graya_v, rgba_a, rgba_b, rgba_g, rgba_r};

/// Largest logical screen the loader composes frames on.
const MAX_CANVAS_PIXELS: u64 = 1 << 26;

/// Per-frame decoder buffer limit.
const FRAME_MEMORY_LIMIT: u64 = 64 * 1024 * 1024;

/// Counts the bytes handed to the decoder, for progress reporting.
struct CountingReader<R> {
    inner: R,
    count: Rc<Cell<u64>>,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count.set(self.count.get() + n as u64);
        Ok(n)
    }
}

pub(crate) fn load_gif(fop: &mut FileOp) -> Result<()> {
    let file = File::open(fop.filename())?;
    let total = file.metadata()?.len().max(1);
    let consumed = Rc::new(Cell::new(0));
    let reader = CountingReader {
        inner: file,
        count: consumed.clone(),
    };

    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::Indexed);
    if let Some(limit) = NonZeroU64::new(FRAME_MEMORY_LIMIT) {
        options.set_memory_limit(gif::MemoryLimit::Bytes(limit));
    }
    let mut decoder = options.read_info(reader)?;

    let (width, height) = (decoder.width() as u32, decoder.height() as u32);
    if width == 0 || height == 0 || width as u64 * height as u64 > MAX_CANVAS_PIXELS {
        return Err(FileOpError::decode(format!("GIF screen size {width}x{height} is not supported")));
    }
    let global_palette = decoder.global_palette().map(<[u8]>::to_vec);
    let progress = fop.progress_handle();
    let link_frames = fop.options().link_identical_frames;

    let mut sprite = Sprite::with_layer(ColorMode::Indexed, width, height);
    sprite.set_filename(fop.filename());
    let mut canvas = Image::new(ColorMode::Indexed, width, height);
    let mut last_image: Option<usize> = None;
    let mut has_transparency = false;
    let mut frame_index = 0;

    while let Some(frame) = decoder.read_next_frame()? {
        progress.check_stop()?;

        let mut palette = match frame.palette.as_deref().or(global_palette.as_deref()) {
            Some(rgb) => Palette::from_rgb_bytes(frame_index, rgb),
            None => Palette::grayscale(frame_index),
        };
        // the transparent index moves to 0, the mask index of the layer
        let swapped = frame.transparent.filter(|t| *t != 0);
        if let Some(t) = swapped {
            let first = palette.color(0);
            palette.set_color(0, palette.color(t as usize));
            palette.set_color(t as usize, first);
        }
        let previous = (frame.dispose == gif::DisposalMethod::Previous).then(|| canvas.clone());

        let (left, top, fw, fh) = (frame.left as u32, frame.top as u32, frame.width as u32, frame.height as u32);
        has_transparency |= frame.transparent.is_some();
        for fy in 0..fh {
            for fx in 0..fw {
                let Some(&index) = frame.buffer.get((fy * fw + fx) as usize) else {
                    continue;
                };
                if frame.transparent == Some(index) {
                    continue;
                }
                let index = match swapped {
                    Some(t) if index == 0 => t,
                    _ => index,
                };
                canvas.set_pixel(left + fx, top + fy, index as u32);
            }
        }

        let image_index = match last_image {
            Some(idx) if link_frames && sprite.image(idx) == Some(&canvas) => idx,
            _ => sprite.add_image(canvas.clone()),
        };
        last_image = Some(image_index);
        sprite.add_cel(0, Cel::new(frame_index, image_index));
        if sprite.palette(frame_index).count_diff(&palette) > 0 {
            sprite.set_palette(palette);
        }
        sprite.set_frames(frame_index + 1);
        sprite.set_frame_duration(frame_index, frame.delay as u32 * 10);

        match frame.dispose {
            gif::DisposalMethod::Background => {
                for y in top..top + fh {
                    for x in left..left + fw {
                        canvas.set_pixel(x, y, 0);
                    }
                }
            }
            gif::DisposalMethod::Previous => {
                if let Some(previous) = previous {
                    canvas = previous;
                }
            }
            _ => {}
        }

        frame_index += 1;
        progress.update(consumed.get() as f32 / total as f32);
        if fop.one_frame() {
            break;
        }
    }

    if frame_index == 0 {
        return Err(FileOpError::decode(format!("GIF file '{}' has no frames", fop.filename().display())));
    }
    if !has_transparency {
        if let Some(layer) = sprite.layer_mut(0) {
            layer.is_background = true;
        }
    }
    log::debug!("loaded {} GIF frame(s) from '{}'", frame_index, fop.filename().display());
    fop.set_sprite(sprite);
    Ok(())
}

struct EncodedFrame {
    palette: Vec<u8>,
    indices: Vec<u8>,
    transparent: Option<u8>,
}

fn encode_frame(sprite: &Sprite, frame: usize, image: &mut Image) -> Result<EncodedFrame> {
    image.clear(0);
    sprite.render(frame, image);
    let transparent_layer = !sprite.has_background();

    match sprite.color_mode() {
        ColorMode::Indexed => Ok(EncodedFrame {
            palette: sprite.palette(frame).to_rgb_bytes(),
            indices: image.data().to_vec(),
            transparent: transparent_layer.then_some(0),
        }),
        ColorMode::Grayscale if !image.has_transparency() => Ok(EncodedFrame {
            palette: Palette::grayscale(0).to_rgb_bytes(),
            indices: image.data().chunks_exact(2).map(|px| px[0]).collect(),
            transparent: None,
        }),
        mode => {
            let (width, height) = (image.width(), image.height());
            let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
            let mut alpha = Vec::with_capacity(width as usize * height as usize);
            for y in 0..height {
                for x in 0..width {
                    let c = image.pixel(x, y);
                    if mode == ColorMode::Rgb {
                        rgb.extend_from_slice(&[rgba_r(c), rgba_g(c), rgba_b(c)]);
                        alpha.push(rgba_a(c));
                    } else {
                        rgb.extend_from_slice(&[graya_v(c); 3]);
                        alpha.push(graya_a(c));
                    }
                }
            }
            quantize(width, height, rgb, &alpha)
        }
    }
}

/// Reduces an RGB frame to at most 255 colors with quantette (Wu's algorithm).
///
/// Pixels with alpha below 128 become index 0, the mask color, and the
/// quantized colors start at index 1.
fn quantize(width: u32, height: u32, rgb: Vec<u8>, alpha: &[u8]) -> Result<EncodedFrame> {
    let pixels =
        image::RgbImage::from_raw(width, height, rgb).ok_or_else(|| FileOpError::encode(format!("{width}x{height} frame has the wrong pixel count")))?;
    let mut pipeline = quantette::ImagePipeline::try_from(&pixels).map_err(|e| FileOpError::encode(format!("Can't reduce frame colors: {e}")))?;
    let (colors, mut indices) = pipeline.palette_size(255).indexed_palette();

    let masked = alpha.iter().any(|a| *a < 128);
    let mut palette = Vec::with_capacity((colors.len() + 1) * 3);
    if masked {
        palette.extend_from_slice(&[0, 0, 0]);
        for (index, a) in indices.iter_mut().zip(alpha) {
            *index = if *a < 128 { 0 } else { *index + 1 };
        }
    }
    palette.extend(colors.iter().flat_map(|c| [c.red, c.green, c.blue]));

    Ok(EncodedFrame {
        palette,
        indices,
        transparent: masked.then_some(0),
    })
}

pub(crate) fn save_gif(fop: &mut FileOp) -> Result<()> {
    let sprite = fop.sprite().ok_or_else(|| FileOpError::encode("no sprite to save"))?;
    let (width, height) = (sprite.width(), sprite.height());
    let (Ok(w16), Ok(h16)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(FileOpError::encode(format!("GIF can't store a {width}x{height} image")));
    };
    let progress = fop.progress_handle();
    let frames = sprite.frames();

    let mut image = Image::new(sprite.color_mode(), width, height);
    let first = encode_frame(sprite, 0, &mut image)?;

    let file = BufWriter::new(File::create(fop.filename())?);
    let mut encoder = gif::Encoder::new(file, w16, h16, &first.palette)?;
    if frames > 1 {
        if let Some(repeat) = fop.options().gif_repeat.to_gif() {
            encoder.set_repeat(repeat)?;
        }
    }

    let global_palette = first.palette.clone();
    let mut next = Some(first);
    for frame in 0..frames {
        progress.check_stop()?;
        let encoded = match next.take() {
            Some(encoded) => encoded,
            None => encode_frame(sprite, frame, &mut image)?,
        };

        let mut gif_frame = gif::Frame::default();
        gif_frame.width = w16;
        gif_frame.height = h16;
        // milliseconds to GIF centiseconds
        gif_frame.delay = (sprite.frame_duration(frame) / 10).clamp(1, u16::MAX as u32) as u16;
        gif_frame.dispose = if encoded.transparent.is_some() {
            gif::DisposalMethod::Background
        } else {
            gif::DisposalMethod::Keep
        };
        gif_frame.transparent = encoded.transparent;
        if encoded.palette != global_palette {
            gif_frame.palette = Some(encoded.palette);
        }
        gif_frame.buffer = Cow::Owned(encoded.indices);
        encoder.write_frame(&gif_frame)?;

        progress.update_steps(frame + 1, frames);
    }
    Ok(())
}
