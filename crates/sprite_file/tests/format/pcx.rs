use pretty_assertions::assert_eq;
use sprite_file::{ColorMode, LoadFlags, load_sprite, load_sprite_with, registry, rgba, save_sprite};

use super::{frame_image, make_sprite, test_palette};

#[test]
fn pcx_indexed_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiles.pcx");
    let mut sprite = make_sprite(&path, ColorMode::Indexed, 13, 5, 1, |_, x, y| (x * 3 + y * 7) % 200);
    sprite.set_palette(test_palette(0, 9));
    save_sprite(&sprite).unwrap();

    let loaded = load_sprite(&path).unwrap();
    assert_eq!(loaded.color_mode(), ColorMode::Indexed);
    assert_eq!((loaded.width(), loaded.height()), (13, 5));
    assert_eq!(frame_image(&loaded, 0), frame_image(&sprite, 0));
    assert_eq!(loaded.palette(0), &test_palette(0, 9));
    assert!(loaded.has_background());
}

#[test]
fn pcx_rgb_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.pcx");
    // long runs and values with the two top bits set
    let sprite = make_sprite(&path, ColorMode::Rgb, 70, 3, 1, |_, x, y| {
        if x < 66 { rgba(0xC7, 0xC7, y as u8, 255) } else { rgba(x as u8, 0xFF, 0, 255) }
    });
    save_sprite(&sprite).unwrap();

    let loaded = load_sprite_with(registry(), &path, LoadFlags::SEQUENCE_NONE).unwrap();
    assert_eq!(loaded.color_mode(), ColorMode::Rgb);
    assert_eq!(frame_image(&loaded, 0), frame_image(&sprite, 0));
}

#[test]
fn pcx_truncated_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.pcx");
    let sprite = make_sprite(&path, ColorMode::Indexed, 8, 8, 1, |_, x, _| x);
    save_sprite(&sprite).unwrap();
    let data = std::fs::read(&path).unwrap();
    std::fs::write(&path, &data[..140]).unwrap();

    let err = load_sprite(&path).unwrap_err();
    assert!(err.to_string().contains("Truncated PCX"), "{err}");
}

#[test]
fn pcx_huge_dimensions_in_a_short_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge.pcx");
    let mut data = vec![0u8; 130];
    data[..4].copy_from_slice(&[0x0A, 5, 1, 8]);
    data[8..10].copy_from_slice(&0xFFFEu16.to_le_bytes());
    data[10..12].copy_from_slice(&0xFFFEu16.to_le_bytes());
    data[65] = 3;
    data[66..68].copy_from_slice(&0xFFFFu16.to_le_bytes());
    std::fs::write(&path, data).unwrap();

    let err = load_sprite(&path).unwrap_err();
    assert!(err.to_string().contains("too short for a 65535x65535 image"), "{err}");
}
