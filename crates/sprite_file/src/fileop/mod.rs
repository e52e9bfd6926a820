//! Load and save operations.
//!
//! A [`FileOp`] is created by one of the factories, run with [`FileOp::operate`]
//! (usually on a worker, see [`FileOpTask`]) and polled through its shared
//! [`FileOpStatus`]. Dropping the operation releases everything it owns.

mod filename;
mod operate;
mod sequence;
mod status;
mod task;

pub use filename::{SequenceName, gather_sequence, sequence_filenames};
pub use sequence::SequenceState;
pub use status::{FileOpProgress, FileOpStatus};
pub use task::{FileOpTask, load_sprite, load_sprite_with, save_sprite, save_sprite_with};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
    CompatibilityIssue, FileOpError, FileOpOptions, FormatCapabilities, FormatDescriptor, FormatRegistry, IssueSeverity, LoadFlags, Result, Sprite,
    registry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOpKind {
    Load,
    Save,
}

/// One load or save of a sprite through a registered format.
#[derive(Debug)]
pub struct FileOp {
    kind: FileOpKind,
    format: FormatDescriptor,
    sprite: Option<Sprite>,
    filename: PathBuf,
    status: Arc<FileOpStatus>,
    one_frame: bool,
    options: FileOpOptions,
    warnings: Vec<CompatibilityIssue>,
    seq: Option<SequenceState>,
}

impl FileOp {
    fn new(kind: FileOpKind, format: FormatDescriptor, filename: PathBuf) -> Self {
        Self {
            kind,
            format,
            sprite: None,
            filename,
            status: Arc::new(FileOpStatus::new()),
            one_frame: false,
            options: FileOpOptions::default(),
            warnings: Vec::new(),
            seq: None,
        }
    }

    /// Prepares loading `path` with a built-in format.
    pub fn to_load(path: impl AsRef<Path>, flags: LoadFlags) -> Result<Self> {
        Self::to_load_with(registry(), path, flags)
    }

    pub fn to_load_with(registry: &FormatRegistry, path: impl AsRef<Path>, flags: LoadFlags) -> Result<Self> {
        Self::load_op(registry, path.as_ref(), flags, None)
    }

    /// Like [`FileOp::to_load_with`], `prompt` decides if a found sequence is loaded
    /// when `flags` contain [`LoadFlags::SEQUENCE_ASK`].
    pub fn to_load_with_prompt(
        registry: &FormatRegistry,
        path: impl AsRef<Path>,
        flags: LoadFlags,
        prompt: &mut dyn FnMut(&[PathBuf]) -> bool,
    ) -> Result<Self> {
        Self::load_op(registry, path.as_ref(), flags, Some(prompt))
    }

    fn load_op(registry: &FormatRegistry, path: &Path, flags: LoadFlags, prompt: Option<&mut dyn FnMut(&[PathBuf]) -> bool>) -> Result<Self> {
        let format = match registry.find_by_path(path) {
            Some(format) if format.load.is_some() => *format,
            _ => return Err(FileOpError::unknown_format(path)),
        };

        let mut fop = Self::new(FileOpKind::Load, format, path.to_path_buf());
        fop.one_frame = flags.contains(LoadFlags::ONE_FRAME);

        if format.supports(FormatCapabilities::SEQUENCES) {
            let mut filenames = if flags.contains(LoadFlags::SEQUENCE_NONE) {
                vec![path.to_path_buf()]
            } else {
                gather_sequence(path)
            };
            if filenames.len() > 1 && flags.contains(LoadFlags::SEQUENCE_ASK) {
                if let Some(prompt) = prompt {
                    if !prompt(&filenames) {
                        filenames.truncate(1);
                    }
                }
            }
            log::info!("loading {} file(s) as '{}' starting at '{}'", filenames.len(), format.name, path.display());
            fop.seq = Some(SequenceState::new(filenames));
        } else {
            log::info!("loading '{}' as '{}'", path.display(), format.name);
        }
        Ok(fop)
    }

    /// Prepares saving `sprite` to its filename with a built-in format.
    pub fn to_save(sprite: Sprite) -> Result<Self> {
        Self::to_save_with(registry(), sprite)
    }

    pub fn to_save_with(registry: &FormatRegistry, sprite: Sprite) -> Result<Self> {
        let path = sprite.filename().to_path_buf();
        let format = match registry.find_by_path(&path) {
            Some(format) if format.save.is_some() => *format,
            _ => return Err(FileOpError::unknown_format(path)),
        };

        let warnings = format.check_compatibility(&sprite);
        for issue in &warnings {
            match issue.severity {
                IssueSeverity::Error | IssueSeverity::Warning => log::warn!("saving '{}': {}", path.display(), issue.message),
                IssueSeverity::Info => log::info!("saving '{}': {}", path.display(), issue.message),
            }
        }

        let mut fop = Self::new(FileOpKind::Save, format, path.clone());
        if format.supports(FormatCapabilities::SEQUENCES) {
            let filenames = sequence_filenames(&path, sprite.frames());
            fop.seq = Some(SequenceState::new(filenames));
        }
        fop.warnings = warnings;
        fop.sprite = Some(sprite);
        Ok(fop)
    }

    pub fn with_options(mut self, options: FileOpOptions) -> Self {
        self.options = options;
        self
    }

    pub fn kind(&self) -> FileOpKind {
        self.kind
    }

    pub fn format(&self) -> &FormatDescriptor {
        &self.format
    }

    /// The file the format callback works on right now.
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn options(&self) -> &FileOpOptions {
        &self.options
    }

    /// Animated formats load only their first frame.
    pub fn one_frame(&self) -> bool {
        self.one_frame
    }

    pub fn sprite(&self) -> Option<&Sprite> {
        self.sprite.as_ref()
    }

    /// Hands the loaded sprite over to the operation.
    pub fn set_sprite(&mut self, sprite: Sprite) {
        self.sprite = Some(sprite);
    }

    pub fn take_sprite(&mut self) -> Option<Sprite> {
        self.sprite.take()
    }

    pub fn into_sprite(self) -> Option<Sprite> {
        self.sprite
    }

    /// What the format of a save operation can't store.
    pub fn warnings(&self) -> &[CompatibilityIssue] {
        &self.warnings
    }

    pub fn status(&self) -> &Arc<FileOpStatus> {
        &self.status
    }

    pub fn is_done(&self) -> bool {
        self.status.is_done()
    }

    pub fn is_stop(&self) -> bool {
        self.status.is_stop()
    }

    pub fn stop(&self) {
        self.status.stop();
    }

    pub fn error(&self) -> Option<String> {
        self.status.error()
    }

    pub fn progress(&self) -> f32 {
        self.status.progress()
    }

    /// Records an error message, replacing any earlier one.
    ///
    /// The callback keeps running; it decides itself whether to return an error.
    pub fn report_error(&self, message: impl Into<String>) {
        self.status.set_error(message);
    }

    /// Reports progress in [0, 1] of the current file.
    pub fn report_progress(&self, progress: f32) {
        self.progress_handle().update(progress);
    }

    /// Progress reporter scoped to the current file.
    pub fn progress_handle(&self) -> FileOpProgress {
        let (offset, fraction) = self.seq.as_ref().map_or((0.0, 1.0), |seq| (seq.progress_offset, seq.progress_fraction));
        FileOpProgress::new(self.status.clone(), offset, fraction)
    }
}
