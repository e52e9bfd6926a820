use pretty_assertions::assert_eq;
use sprite_file::{ColorMode, graya, load_sprite, rgba, save_sprite};

use super::{frame_image, make_sprite, test_palette};

#[test]
fn png_rgba_keeps_alpha() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alpha.png");
    let mut sprite = make_sprite(&path, ColorMode::Rgb, 4, 4, 1, |_, x, y| rgba(x as u8, y as u8, 9, (40 + x * 60) as u8));
    sprite.layer_mut(0).unwrap().is_background = false;
    save_sprite(&sprite).unwrap();

    let loaded = load_sprite(&path).unwrap();
    assert_eq!(loaded.color_mode(), ColorMode::Rgb);
    assert_eq!(frame_image(&loaded, 0), frame_image(&sprite, 0));
    assert!(!loaded.has_background());
}

#[test]
fn png_grayscale_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gray.png");
    let sprite = make_sprite(&path, ColorMode::Grayscale, 6, 2, 1, |_, x, _| graya(x as u8 * 40, 255));
    save_sprite(&sprite).unwrap();

    let loaded = load_sprite(&path).unwrap();
    assert_eq!(loaded.color_mode(), ColorMode::Grayscale);
    assert_eq!(frame_image(&loaded, 0), frame_image(&sprite, 0));
    assert!(loaded.has_background());
}

#[test]
fn png_indexed_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("indexed.png");
    let mut sprite = make_sprite(&path, ColorMode::Indexed, 5, 5, 1, |_, x, y| (x * y) % 16);
    sprite.set_palette(test_palette(0, 77));
    save_sprite(&sprite).unwrap();

    let loaded = load_sprite(&path).unwrap();
    assert_eq!(loaded.color_mode(), ColorMode::Indexed);
    assert_eq!(frame_image(&loaded, 0), frame_image(&sprite, 0));
    assert_eq!(loaded.palette(0), &test_palette(0, 77));
}
