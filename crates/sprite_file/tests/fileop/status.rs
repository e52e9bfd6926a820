use pretty_assertions::assert_eq;
use sprite_file::{FileOp, FileOpError, FileOpTask, LoadFlags};

use super::{test_registry, wait_for, write_files};

#[test]
fn stop_before_operate() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_files(dir.path(), "early", "test", &["1 1 1", "1 1 2"]);

    let mut fop = FileOp::to_load_with(&test_registry(), &path, LoadFlags::SEQUENCE_YES).unwrap();
    fop.stop();
    fop.operate();
    assert!(fop.is_done());
    assert!(fop.is_stop());
    assert_eq!(fop.error(), None);
    assert!(fop.sprite().is_none());
}

#[test]
fn stop_while_running_keeps_loaded_frames() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_files(dir.path(), "halt", "test", &["1 1 1", "stop", "1 1 3"]);

    let mut fop = FileOp::to_load_with(&test_registry(), &path, LoadFlags::SEQUENCE_YES).unwrap();
    fop.operate();
    assert!(fop.is_done());
    assert!(fop.is_stop());
    assert_eq!(fop.error(), None);
    assert_eq!(fop.sprite().map(|s| s.frames()), Some(1));
    assert!(fop.progress() < 1.0);
}

#[test]
fn task_progress_only_grows() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let contents = ["4 4 1", "4 4 2", "4 4 3", "4 4 4", "4 4 5", "4 4 6"];
    let path = write_files(dir.path(), "poll", "test", &contents);

    let task = FileOpTask::spawn(FileOp::to_load_with(&test_registry(), &path, LoadFlags::SEQUENCE_YES).unwrap()).unwrap();
    let mut last = 0.0;
    while !task.is_done() {
        let progress = task.progress();
        assert!(progress >= last, "{progress} < {last}");
        assert!((0.0..=1.0).contains(&progress));
        last = progress;
        std::thread::yield_now();
    }
    assert_eq!(task.progress(), 1.0);

    let fop = task.join().unwrap();
    assert_eq!(fop.error(), None);
    assert_eq!(fop.into_sprite().map(|s| s.frames()), Some(6));
}

#[test]
fn task_reports_errors_through_the_status() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_files(dir.path(), "fail", "test", &["bad"]);

    let task = FileOpTask::spawn(FileOp::to_load_with(&test_registry(), &path, LoadFlags::SEQUENCE_YES).unwrap()).unwrap();
    let status = task.status().clone();
    let fop = task.join().unwrap();
    assert!(status.is_done());
    assert_eq!(status.error().as_deref(), Some("bad header"));
    assert!(fop.into_sprite().is_none());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gone.test");

    let mut fop = FileOp::to_load_with(&test_registry(), &path, LoadFlags::SEQUENCE_YES).unwrap();
    fop.operate();
    assert!(fop.error().unwrap().starts_with("I/O error"));
    assert!(matches!(
        sprite_file::load_sprite_with(&test_registry(), &path, LoadFlags::SEQUENCE_YES),
        Err(FileOpError::Failed { .. })
    ));
}

#[test]
fn task_stopped_while_a_frame_is_decoding() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_files(dir.path(), "hold", "test", &["2 2 1", "wait", "2 2 3"]);

    let task = FileOpTask::spawn(FileOp::to_load_with(&test_registry(), &path, LoadFlags::SEQUENCE_YES).unwrap()).unwrap();
    // first of three frames attached, the second one blocks
    wait_for(|| task.progress() >= 0.3);
    assert!(!task.is_done());

    task.stop();
    wait_for(|| task.is_done());
    let status = task.status().clone();
    assert!(status.is_stop());
    assert_eq!(status.error(), None);
    assert!(status.progress() < 1.0);

    let fop = task.join().unwrap();
    assert_eq!(fop.into_sprite().map(|s| s.frames()), Some(1));
}

#[test]
fn panicking_format_still_finishes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_files(dir.path(), "crash", "test", &["2 2 1", "panic", "2 2 3"]);

    let task = FileOpTask::spawn(FileOp::to_load_with(&test_registry(), &path, LoadFlags::SEQUENCE_YES).unwrap()).unwrap();
    wait_for(|| task.is_done());
    let status = task.status().clone();
    let message = status.error().unwrap();
    assert!(message.starts_with("Error processing file"), "{message}");
    assert!(message.contains("decoder state corrupted"), "{message}");
    assert!(status.progress() < 1.0);

    let fop = task.join().unwrap();
    assert!(fop.into_sprite().is_none());
}

#[test]
fn panicking_format_on_the_calling_thread() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_files(dir.path(), "boom", "test", &["panic"]);

    let err = sprite_file::load_sprite_with(&test_registry(), &path, LoadFlags::SEQUENCE_YES).unwrap_err();
    assert!(matches!(err, FileOpError::Failed { .. }));
    assert!(err.to_string().contains("decoder state corrupted"), "{err}");
}
