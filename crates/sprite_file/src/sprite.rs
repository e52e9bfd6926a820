use std::path::{Path, PathBuf};

use crate::{ColorMode, Image, Palette, graya, graya_a, graya_v, rgba, rgba_a, rgba_b, rgba_g, rgba_r};

/// Default duration of a frame in milliseconds.
pub const DEFAULT_FRAME_DURATION: u32 = 100;

/// Places one image of the sprite stock on a layer at a given frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cel {
    pub frame: usize,
    /// Index into the sprite image stock.
    pub image: usize,
    pub x: i32,
    pub y: i32,
}

impl Cel {
    pub fn new(frame: usize, image: usize) -> Self {
        Self { frame, image, x: 0, y: 0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub title: String,
    pub is_visible: bool,
    /// Background layers are opaque: indexed pixels with index 0 are drawn instead of masked.
    pub is_background: bool,
    cels: Vec<Cel>,
}

impl Layer {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            is_visible: true,
            is_background: false,
            cels: Vec::new(),
        }
    }

    pub fn cels(&self) -> &[Cel] {
        &self.cels
    }

    pub fn cel(&self, frame: usize) -> Option<&Cel> {
        self.cels.iter().find(|c| c.frame == frame)
    }

    /// Adds a cel, replacing any cel already placed at the same frame.
    pub fn add_cel(&mut self, cel: Cel) {
        if let Some(existing) = self.cels.iter_mut().find(|c| c.frame == cel.frame) {
            *existing = cel;
        } else {
            let pos = self.cels.iter().position(|c| c.frame > cel.frame).unwrap_or(self.cels.len());
            self.cels.insert(pos, cel);
        }
    }
}

/// The document a file operation loads into or saves from.
#[derive(Debug, Clone)]
pub struct Sprite {
    color_mode: ColorMode,
    width: u32,
    height: u32,
    filename: PathBuf,
    frames: usize,
    frame_durations: Vec<u32>,
    layers: Vec<Layer>,
    stock: Vec<Image>,
    palettes: Vec<Palette>,
}

impl Sprite {
    /// Creates an empty sprite with one frame, no layers and a grayscale palette.
    pub fn new(color_mode: ColorMode, width: u32, height: u32) -> Self {
        Self {
            color_mode,
            width,
            height,
            filename: PathBuf::new(),
            frames: 1,
            frame_durations: vec![DEFAULT_FRAME_DURATION],
            layers: Vec::new(),
            stock: Vec::new(),
            palettes: vec![Palette::default()],
        }
    }

    /// Creates a sprite with one empty layer.
    pub fn with_layer(color_mode: ColorMode, width: u32, height: u32) -> Self {
        let mut sprite = Self::new(color_mode, width, height);
        sprite.add_layer(Layer::new("Layer 1"));
        sprite
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

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn set_filename(&mut self, filename: impl Into<PathBuf>) {
        self.filename = filename.into();
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Sets the frame count, new frames get the default duration.
    pub fn set_frames(&mut self, frames: usize) {
        let frames = frames.max(1);
        self.frames = frames;
        self.frame_durations.resize(frames, DEFAULT_FRAME_DURATION);
    }

    pub fn frame_duration(&self, frame: usize) -> u32 {
        self.frame_durations.get(frame).copied().unwrap_or(DEFAULT_FRAME_DURATION)
    }

    pub fn set_frame_duration(&mut self, frame: usize, duration_ms: u32) {
        if let Some(d) = self.frame_durations.get_mut(frame) {
            *d = duration_ms;
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    /// Adds a layer on top, returns its index.
    pub fn add_layer(&mut self, layer: Layer) -> usize {
        self.layers.push(layer);
        self.layers.len() - 1
    }

    pub fn has_background(&self) -> bool {
        self.layers.first().is_some_and(|l| l.is_background)
    }

    pub fn stock(&self) -> &[Image] {
        &self.stock
    }

    pub fn image(&self, index: usize) -> Option<&Image> {
        self.stock.get(index)
    }

    /// Adds an image to the stock, returns its index.
    pub fn add_image(&mut self, image: Image) -> usize {
        self.stock.push(image);
        self.stock.len() - 1
    }

    /// Places a cel on a layer, out of range layers are ignored.
    pub fn add_cel(&mut self, layer: usize, cel: Cel) {
        if let Some(layer) = self.layers.get_mut(layer) {
            layer.add_cel(cel);
        }
    }

    pub fn palettes(&self) -> &[Palette] {
        &self.palettes
    }

    /// Palette in effect at `frame`: the last palette starting at or before it.
    pub fn palette(&self, frame: usize) -> &Palette {
        self.palettes
            .iter()
            .rev()
            .find(|p| p.frame() <= frame)
            .unwrap_or(&self.palettes[0])
    }

    /// Sets the palette for `palette.frame()`, replacing a palette of the same frame.
    pub fn set_palette(&mut self, palette: Palette) {
        if let Some(existing) = self.palettes.iter_mut().find(|p| p.frame() == palette.frame()) {
            *existing = palette;
            return;
        }
        let pos = self
            .palettes
            .iter()
            .position(|p| p.frame() > palette.frame())
            .unwrap_or(self.palettes.len());
        self.palettes.insert(pos, palette);
    }

    /// Flattens all visible layers of `frame` into `dest` (which must have the sprite color mode).
    pub fn render(&self, frame: usize, dest: &mut Image) {
        if dest.color_mode() != self.color_mode {
            log::warn!("render: destination is {:?}, sprite is {:?}", dest.color_mode(), self.color_mode);
            return;
        }
        for layer in self.layers.iter().filter(|l| l.is_visible) {
            let Some(cel) = layer.cel(frame) else {
                continue;
            };
            let Some(src) = self.stock.get(cel.image) else {
                continue;
            };
            draw_image(dest, src, cel.x, cel.y, layer.is_background);
        }
    }
}

fn draw_image(dest: &mut Image, src: &Image, x: i32, y: i32, opaque: bool) {
    for sy in 0..src.height() {
        let dy = y + sy as i32;
        if dy < 0 || dy >= dest.height() as i32 {
            continue;
        }
        for sx in 0..src.width() {
            let dx = x + sx as i32;
            if dx < 0 || dx >= dest.width() as i32 {
                continue;
            }
            let s = src.pixel(sx, sy);
            let (dx, dy) = (dx as u32, dy as u32);
            let out = match dest.color_mode() {
                ColorMode::Indexed => {
                    if !opaque && s == 0 {
                        continue;
                    }
                    s
                }
                ColorMode::Rgb => {
                    if opaque {
                        s | 0xff00_0000
                    } else {
                        blend_rgba(dest.pixel(dx, dy), s)
                    }
                }
                ColorMode::Grayscale => {
                    if opaque {
                        s | 0xff00
                    } else {
                        blend_graya(dest.pixel(dx, dy), s)
                    }
                }
            };
            dest.set_pixel(dx, dy, out);
        }
    }
}

fn blend_channel(back: u8, front: u8, front_a: u32, out_a: u32) -> u8 {
    // straight alpha over, back alpha is already folded into out_a
    ((front as u32 * front_a * 255 + back as u32 * (out_a * 255 - front_a * 255)) / (out_a * 255).max(1)) as u8
}

fn blend_rgba(back: u32, front: u32) -> u32 {
    let fa = rgba_a(front) as u32;
    if fa == 255 {
        return front;
    }
    if fa == 0 {
        return back;
    }
    let ba = rgba_a(back) as u32;
    let oa = fa + ba * (255 - fa) / 255;
    rgba(
        blend_channel(rgba_r(back), rgba_r(front), fa, oa),
        blend_channel(rgba_g(back), rgba_g(front), fa, oa),
        blend_channel(rgba_b(back), rgba_b(front), fa, oa),
        oa as u8,
    )
}

fn blend_graya(back: u32, front: u32) -> u32 {
    let fa = graya_a(front) as u32;
    if fa == 255 {
        return front;
    }
    if fa == 0 {
        return back;
    }
    let ba = graya_a(back) as u32;
    let oa = fa + ba * (255 - fa) / 255;
    graya(blend_channel(graya_v(back), graya_v(front), fa, oa), oa as u8)
}
