use std::path::Path;

use sprite_file::formats::{FileFormat, FormatCapabilities, FormatRegistry, registry};

#[test]
fn file_format_capabilities() {
    assert!(FileFormat::Gif.capabilities().contains(FormatCapabilities::FRAMES));
    assert!(!FileFormat::Png.capabilities().contains(FormatCapabilities::FRAMES));
    assert!(FileFormat::Png.capabilities().contains(FormatCapabilities::SEQUENCES | FormatCapabilities::RGBA));
    assert!(!FileFormat::Jpeg.capabilities().contains(FormatCapabilities::INDEXED));
    for format in FileFormat::ALL {
        let descriptor = format.descriptor();
        assert!(descriptor.load.is_some() && descriptor.save.is_some(), "{format:?} should load and save");
        assert_eq!(descriptor.extensions, format.extension_list());
    }
}

#[test]
fn builtin_lookup_by_path() {
    let registry = registry();
    let name = |path: &str| registry.find_by_path(Path::new(path)).map(|f| f.name);
    assert_eq!(name("walk.gif"), Some("gif"));
    assert_eq!(name("/path/to/frame01.BMP"), Some("bmp"));
    assert_eq!(name("photo.jpeg"), Some("jpeg"));
    assert_eq!(name("sprite.ase"), None);
    assert_eq!(name("noext"), None);
}

#[test]
fn registry_filters() {
    let registry = registry();
    assert_eq!(registry.readable_filter(), "bmp,gif,jpg,jpeg,pcx,png");
    assert_eq!(registry.readable_extensions(), registry.writable_extensions());
    assert_eq!(registry.find_by_extension("JPG").map(|f| f.name), Some("jpeg"));
    assert_eq!(registry.find_by_name("PCX").map(|f| f.extensions), Some("pcx"));
}

#[test]
fn registry_without_formats() {
    let registry = FormatRegistry::new();
    assert!(registry.find_by_path(Path::new("a.png")).is_none());
    assert!(registry.readable_extensions().is_empty());
    assert_eq!(registry.writable_filter(), "");
}
