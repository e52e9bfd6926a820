use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;

use super::{FileOp, FileOpStatus};
use crate::{FileOpError, FormatRegistry, LoadFlags, Result, Sprite, registry};

/// A file operation running on its own thread.
///
/// Poll [`FileOpTask::status`] from the owning thread, then [`FileOpTask::join`]
/// to get the finished operation back.
pub struct FileOpTask {
    status: Arc<FileOpStatus>,
    handle: JoinHandle<FileOp>,
}

impl FileOpTask {
    pub fn spawn(mut fop: FileOp) -> Result<Self> {
        let status = fop.status().clone();
        let name = format!("fileop-{}", fop.format().name);
        let handle = std::thread::Builder::new().name(name).spawn(move || {
            fop.operate();
            fop
        })?;
        Ok(Self { status, handle })
    }

    pub fn status(&self) -> &Arc<FileOpStatus> {
        &self.status
    }

    pub fn progress(&self) -> f32 {
        self.status.progress()
    }

    pub fn is_done(&self) -> bool {
        self.status.is_done()
    }

    /// Asks the worker to stop, [`FileOpTask::join`] still has to be called.
    pub fn stop(&self) {
        self.status.stop();
    }

    /// Waits for the worker and returns the finished operation.
    pub fn join(self) -> Result<FileOp> {
        self.handle.join().map_err(|_| {
            log::error!("file operation worker panicked");
            FileOpError::WorkerPanicked
        })
    }
}

fn finish(fop: &FileOp) -> Result<()> {
    match fop.error() {
        Some(message) => Err(FileOpError::Failed { message }),
        None if fop.is_stop() => Err(FileOpError::Cancelled),
        None => Ok(()),
    }
}

/// Loads a sprite (or numbered sequence) on the calling thread.
pub fn load_sprite(path: impl AsRef<Path>) -> Result<Sprite> {
    load_sprite_with(registry(), path, LoadFlags::SEQUENCE_YES)
}

pub fn load_sprite_with(registry: &FormatRegistry, path: impl AsRef<Path>, flags: LoadFlags) -> Result<Sprite> {
    let mut fop = FileOp::to_load_with(registry, path.as_ref(), flags)?;
    fop.operate();
    finish(&fop)?;
    fop.into_sprite().ok_or_else(|| FileOpError::Failed {
        message: format!("Error loading sprite from file \"{}\"", path.as_ref().display()),
    })
}

/// Saves a sprite to its filename on the calling thread.
pub fn save_sprite(sprite: &Sprite) -> Result<()> {
    save_sprite_with(registry(), sprite)
}

pub fn save_sprite_with(registry: &FormatRegistry, sprite: &Sprite) -> Result<()> {
    let mut fop = FileOp::to_save_with(registry, sprite.clone())?;
    fop.operate();
    finish(&fop)
}
