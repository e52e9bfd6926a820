use std::path::PathBuf;
use std::sync::atomic::Ordering;

use pretty_assertions::assert_eq;
use sprite_file::{ColorMode, FileOp, FileOpError, FileOpOptions, LoadFlags, load_sprite_with, save_sprite_with};

use super::{TRACKER_DROPS, test_registry, write_files};
use crate::format::{frame_image, make_sprite};

#[test]
fn load_numbered_files_as_frames() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_files(dir.path(), "anim", "test", &["2 2 1", "2 2 2", "2 2 3"]);

    let mut fop = FileOp::to_load_with(&test_registry(), &path, LoadFlags::SEQUENCE_YES).unwrap();
    assert_eq!(fop.sequence().map(|seq| seq.filenames().len()), Some(3));
    fop.operate();
    assert_eq!(fop.progress(), 1.0);
    assert_eq!(fop.error(), None);

    let sprite = fop.into_sprite().unwrap();
    assert_eq!(sprite.frames(), 3);
    assert_eq!(sprite.color_mode(), ColorMode::Indexed);
    assert_eq!(sprite.filename(), dir.path().join("anim1.test").as_path());
    assert!(sprite.has_background());
    for frame in 0..3 {
        assert_eq!(frame_image(&sprite, frame).pixel(1, 1), frame as u32 + 1);
    }
}

#[test]
fn palette_changes_start_new_palettes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_files(dir.path(), "pal", "test", &["1 1 10", "1 1 10", "1 1 30"]);

    let sprite = load_sprite_with(&test_registry(), &path, LoadFlags::SEQUENCE_YES).unwrap();
    assert_eq!(sprite.palettes().iter().map(|p| p.frame()).collect::<Vec<_>>(), vec![0, 2]);
    assert_eq!(sprite.palette(1).color(1).rgb(), (10, 0, 0));
    assert_eq!(sprite.palette(2).color(1).rgb(), (30, 0, 0));
}

#[test]
fn palette_carries_over_between_frames() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_files(dir.path(), "carry", "test", &["1 1 42", "1 1 keep"]);

    let sprite = load_sprite_with(&test_registry(), &path, LoadFlags::SEQUENCE_YES).unwrap();
    assert_eq!(frame_image(&sprite, 1).pixel(0, 0), 42);
    assert_eq!(sprite.palettes().len(), 1);
}

#[test]
fn identical_frames_share_an_image() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_files(dir.path(), "same", "test", &["3 3 4", "3 3 4", "3 3 4"]);
    let registry = test_registry();

    let sprite = load_sprite_with(&registry, &path, LoadFlags::SEQUENCE_YES).unwrap();
    assert_eq!(sprite.frames(), 3);
    assert_eq!(sprite.stock().len(), 1);

    let options = FileOpOptions {
        link_identical_frames: false,
        ..FileOpOptions::default()
    };
    let mut fop = FileOp::to_load_with(&registry, &path, LoadFlags::SEQUENCE_YES).unwrap().with_options(options);
    fop.operate();
    assert_eq!(fop.sprite().map(|s| s.stock().len()), Some(3));
}

#[test]
fn sequence_none_and_declined_prompt_load_one_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_files(dir.path(), "seq", "test", &["1 1 1", "1 1 2", "1 1 3", "1 1 4"]);
    let registry = test_registry();

    let sprite = load_sprite_with(&registry, &path, LoadFlags::SEQUENCE_NONE).unwrap();
    assert_eq!(sprite.frames(), 1);

    let mut asked = Vec::new();
    let mut prompt = |files: &[PathBuf]| {
        asked = files.to_vec();
        false
    };
    let mut fop = FileOp::to_load_with_prompt(&registry, &path, LoadFlags::SEQUENCE_ASK, &mut prompt).unwrap();
    assert_eq!(asked.len(), 4);
    fop.operate();
    assert_eq!(fop.error(), None);
    assert_eq!(fop.sprite().map(|s| s.frames()), Some(1));

    let mut accept = |_: &[PathBuf]| true;
    let mut fop = FileOp::to_load_with_prompt(&registry, &path, LoadFlags::SEQUENCE_ASK, &mut accept).unwrap();
    fop.operate();
    assert_eq!(fop.sprite().map(|s| s.frames()), Some(4));
}

#[test]
fn failing_frame_keeps_the_frames_before_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_files(dir.path(), "broken", "test", &["2 2 1", "bad", "2 2 3", "2 2 4", "2 2 5"]);
    let registry = test_registry();

    let mut fop = FileOp::to_load_with(&registry, &path, LoadFlags::SEQUENCE_YES).unwrap();
    fop.operate();
    assert!(fop.is_done());
    assert_eq!(fop.error().as_deref(), Some("bad header"));
    assert_eq!(fop.sprite().map(|s| s.frames()), Some(1));
    assert_eq!(fop.sprite().map(|s| s.stock().len()), Some(1));
    // the first frame reported 1.0 of its fifth
    assert!((fop.progress() - 0.2).abs() < 1e-6, "{}", fop.progress());

    let err = load_sprite_with(&registry, &path, LoadFlags::SEQUENCE_YES).unwrap_err();
    assert_eq!(err.to_string(), "bad header");
}

#[test]
fn failing_first_frame_discards_the_sprite() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_files(dir.path(), "first", "test", &["bad", "2 2 2"]);

    let mut fop = FileOp::to_load_with(&test_registry(), &path, LoadFlags::SEQUENCE_YES).unwrap();
    fop.operate();
    assert!(fop.sprite().is_none());
    assert_eq!(fop.error().as_deref(), Some("bad header"));
}

#[test]
fn empty_error_gets_a_generic_message() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_files(dir.path(), "quiet", "test", &["empty"]);

    let mut fop = FileOp::to_load_with(&test_registry(), &path, LoadFlags::SEQUENCE_YES).unwrap();
    fop.operate();
    let message = fop.error().unwrap();
    assert!(message.starts_with("Error loading frame 1 from file"), "{message}");
    assert!(fop.sprite().is_none());
}

#[test]
fn color_mode_must_not_change() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_files(dir.path(), "mixed", "test", &["2 2 1", "2 2 1 rgb"]);

    let mut fop = FileOp::to_load_with(&test_registry(), &path, LoadFlags::SEQUENCE_YES).unwrap();
    fop.operate();
    assert!(fop.error().unwrap().contains("Color mode mismatch"));
    assert_eq!(fop.sprite().map(|s| s.frames()), Some(1));
}

#[test]
fn save_writes_one_file_per_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.test");
    let sprite = make_sprite(&path, ColorMode::Indexed, 2, 3, 3, |f, _, _| f as u32 + 7);
    save_sprite_with(&test_registry(), &sprite).unwrap();

    for frame in 0..3 {
        let text = std::fs::read_to_string(dir.path().join(format!("out{frame}.test"))).unwrap();
        assert_eq!(text, format!("2 3 {}", frame + 7));
    }
    assert!(!path.exists());
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let registry = test_registry();

    let err = FileOp::to_load_with(&registry, dir.path().join("picture.png"), LoadFlags::SEQUENCE_YES).unwrap_err();
    assert!(matches!(err, FileOpError::UnknownFormat { .. }));
    let err = FileOp::to_load_with(&registry, dir.path().join("noextension"), LoadFlags::SEQUENCE_YES).unwrap_err();
    assert!(matches!(err, FileOpError::UnknownFormat { .. }));

    let upper = dir.path().join("x.TEST");
    std::fs::write(&upper, "1 1 1").unwrap();
    let sprite = load_sprite_with(&registry, &upper, LoadFlags::SEQUENCE_YES).unwrap();
    assert_eq!(sprite.frames(), 1);
}

#[test]
fn format_state_is_dropped_with_the_operation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_files(dir.path(), "trk", "trk", &["1 1 1", "1 1 2", "1 1 3"]);

    let mut fop = FileOp::to_load_with(&test_registry(), &path, LoadFlags::SEQUENCE_YES).unwrap();
    fop.operate();
    assert_eq!(fop.sprite().map(|s| s.frames()), Some(3));
    assert_eq!(TRACKER_DROPS.load(Ordering::SeqCst), 0);
    drop(fop);
    assert_eq!(TRACKER_DROPS.load(Ordering::SeqCst), 1);
}
