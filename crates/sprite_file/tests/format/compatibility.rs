use std::path::Path;

use pretty_assertions::assert_eq;
use sprite_file::{ColorMode, FileOp, IssueSeverity, IssueType, Layer, Palette};

use super::make_sprite;

#[test]
fn save_warns_about_lost_features() {
    let mut sprite = make_sprite(Path::new("anim.jpg"), ColorMode::Indexed, 4, 4, 3, |f, _, _| f as u32);
    sprite.add_layer(Layer::new("Top"));
    sprite.set_palette(Palette::new(2));

    let fop = FileOp::to_save(sprite).unwrap();
    let types: Vec<_> = fop.warnings().iter().map(|w| w.issue_type.clone()).collect();
    assert_eq!(
        types,
        vec![
            IssueType::IndexedUnsupported,
            IssueType::LayersUnsupported { layer_count: 2 },
            IssueType::FramesAsSequence { frame_count: 3 },
        ]
    );
}

#[test]
fn gif_keeps_frames_and_palettes() {
    let mut sprite = make_sprite(Path::new("anim.gif"), ColorMode::Indexed, 4, 4, 3, |f, _, _| f as u32);
    sprite.set_palette(Palette::new(1));
    let fop = FileOp::to_save(sprite).unwrap();
    assert!(fop.warnings().is_empty());
    assert!(!fop.is_sequence());
}

#[test]
fn rgb_alpha_into_bmp() {
    let mut sprite = make_sprite(Path::new("alpha.bmp"), ColorMode::Rgb, 2, 2, 1, |_, _, _| 0);
    sprite.layer_mut(0).unwrap().is_background = false;
    let fop = FileOp::to_save(sprite).unwrap();
    assert_eq!(fop.warnings().len(), 1);
    assert_eq!(fop.warnings()[0].issue_type, IssueType::AlphaUnsupported);
    assert_eq!(fop.warnings()[0].severity, IssueSeverity::Warning);
}
