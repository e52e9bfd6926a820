use std::path::Path;

use sprite_file::{Cel, Color, ColorMode, Image, Palette, Sprite};

mod compatibility;
mod file_format;
mod pcx;
mod png;

/// The image shown by the first layer at `frame`.
pub fn frame_image(sprite: &Sprite, frame: usize) -> &Image {
    let cel = sprite.layer(0).and_then(|l| l.cel(frame)).expect("no cel at frame");
    sprite.image(cel.image).expect("cel points outside of the stock")
}

/// A palette with a few distinct colors at the start.
pub fn test_palette(frame: usize, seed: u8) -> Palette {
    let mut palette = Palette::grayscale(frame);
    for i in 0..16u8 {
        palette.set_color(i as usize, Color::new(i.wrapping_mul(16).wrapping_add(seed), 255 - i * 8, seed));
    }
    palette
}

/// Single layer sprite with one image per frame made by `pixel`.
pub fn make_sprite(path: &Path, color_mode: ColorMode, width: u32, height: u32, frames: usize, pixel: impl Fn(usize, u32, u32) -> u32) -> Sprite {
    let mut sprite = Sprite::with_layer(color_mode, width, height);
    sprite.set_filename(path);
    sprite.set_frames(frames);
    sprite.layer_mut(0).unwrap().is_background = true;
    for frame in 0..frames {
        let mut image = Image::new(color_mode, width, height);
        for y in 0..height {
            for x in 0..width {
                image.set_pixel(x, y, pixel(frame, x, y));
            }
        }
        let index = sprite.add_image(image);
        sprite.add_cel(0, Cel::new(frame, index));
    }
    sprite
}
