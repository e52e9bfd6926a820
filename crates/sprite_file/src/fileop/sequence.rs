//! Helpers for formats that store one frame per file.
//!
//! The driver walks the file list and calls the format once per file. Load
//! callbacks decode into [`FileOp::sequence_image`], save callbacks encode
//! [`FileOp::sequence_frame`]. The palette, image buffer and format state are
//! shared across all frames of one operation.

use std::any::Any;
use std::path::PathBuf;

use super::{FileOp, FileOpKind};
use crate::{Color, ColorMode, FileOpError, Image, Palette, Result, Sprite};

/// Per-operation state of a numbered file sequence.
pub struct SequenceState {
    pub(crate) filenames: Vec<PathBuf>,
    pub(crate) palette: Palette,
    pub(crate) image: Option<Image>,
    pub(crate) progress_offset: f32,
    pub(crate) progress_fraction: f32,
    pub(crate) frame: usize,
    pub(crate) layer: usize,
    /// Stock index of the image attached for the previous frame.
    pub(crate) last_cel: Option<usize>,
    pub(crate) has_alpha: bool,
    pub(crate) image_ready: bool,
    pub(crate) filedata: Option<Box<dyn Any + Send>>,
}

impl std::fmt::Debug for SequenceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceState")
            .field("filenames", &self.filenames)
            .field("frame", &self.frame)
            .field("layer", &self.layer)
            .field("last_cel", &self.last_cel)
            .field("has_alpha", &self.has_alpha)
            .field("filedata", &self.filedata.is_some())
            .finish_non_exhaustive()
    }
}

impl SequenceState {
    pub(crate) fn new(filenames: Vec<PathBuf>) -> Self {
        let count = filenames.len().max(1);
        Self {
            filenames,
            palette: Palette::default(),
            image: None,
            progress_offset: 0.0,
            progress_fraction: 1.0 / count as f32,
            frame: 0,
            layer: 0,
            last_cel: None,
            has_alpha: false,
            image_ready: false,
            filedata: None,
        }
    }

    pub fn filenames(&self) -> &[PathBuf] {
        &self.filenames
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }
}

impl FileOp {
    /// True if this operation walks a list of numbered files.
    pub fn is_sequence(&self) -> bool {
        self.seq.is_some()
    }

    pub fn sequence(&self) -> Option<&SequenceState> {
        self.seq.as_ref()
    }

    /// Returns the image the current frame is decoded into.
    ///
    /// The first call creates the sprite with one layer. The buffer is reused
    /// between frames and only reallocated when the layout changes. Every frame
    /// must have the color mode of the first one.
    pub fn sequence_image(&mut self, color_mode: ColorMode, width: u32, height: u32) -> Result<&mut Image> {
        if self.kind != FileOpKind::Load {
            return Err(FileOpError::generic("sequence_image is only available while loading"));
        }
        let Some(seq) = self.seq.as_mut() else {
            return Err(FileOpError::generic(format!(
                "format '{}' does not load sequences",
                self.format.name
            )));
        };

        match &self.sprite {
            Some(sprite) => {
                if sprite.color_mode() != color_mode {
                    return Err(FileOpError::ColorModeMismatch {
                        expected: sprite.color_mode(),
                        actual: color_mode,
                    });
                }
            }
            None => {
                let mut sprite = Sprite::with_layer(color_mode, width, height);
                sprite.set_filename(self.filename.clone());
                seq.layer = 0;
                self.sprite = Some(sprite);
            }
        }

        if !seq.image.as_ref().is_some_and(|img| img.is_layout(color_mode, width, height)) {
            seq.image = Some(Image::new(color_mode, width, height));
        }
        seq.image_ready = true;
        Ok(seq.image.get_or_insert_with(|| Image::new(color_mode, width, height)))
    }

    /// The flattened frame being saved, `None` outside of a sequence save.
    pub fn sequence_frame(&self) -> Option<&Image> {
        if self.kind != FileOpKind::Save {
            return None;
        }
        self.seq.as_ref().and_then(|seq| seq.image.as_ref())
    }

    /// Sets a color of the current frame palette, out of range indices are ignored.
    pub fn sequence_set_color(&mut self, index: usize, r: u8, g: u8, b: u8) {
        if let Some(seq) = self.seq.as_mut() {
            seq.palette.set_color(index, Color::new(r, g, b));
        }
    }

    /// Color of the current frame palette, black for out of range indices.
    pub fn sequence_get_color(&self, index: usize) -> (u8, u8, u8) {
        self.seq.as_ref().map(|seq| seq.palette.color(index).rgb()).unwrap_or_default()
    }

    pub fn sequence_palette(&self) -> Option<&Palette> {
        self.seq.as_ref().map(|seq| &seq.palette)
    }

    /// Replaces the whole frame palette.
    pub fn sequence_set_palette(&mut self, palette: &Palette) {
        if let Some(seq) = self.seq.as_mut() {
            for (i, c) in palette.colors().iter().enumerate() {
                seq.palette.set_color(i, *c);
            }
        }
    }

    /// Marks that a loaded frame uses transparency, which keeps the layer from becoming a background.
    pub fn sequence_set_has_alpha(&mut self, has_alpha: bool) {
        if let Some(seq) = self.seq.as_mut() {
            seq.has_alpha |= has_alpha;
        }
    }

    /// Stores format state that lives until the operation is dropped.
    ///
    /// Replacing existing state drops the old value.
    pub fn sequence_set_filedata<T: Any + Send>(&mut self, data: T) {
        if let Some(seq) = self.seq.as_mut() {
            seq.filedata = Some(Box::new(data));
        }
    }

    /// The format state, `None` if none was stored or it has another type.
    pub fn sequence_filedata<T: Any + Send>(&mut self) -> Option<&mut T> {
        self.seq.as_mut()?.filedata.as_mut()?.downcast_mut::<T>()
    }

    /// Attaches the decoded frame to the sprite after a successful load callback.
    pub(crate) fn attach_sequence_frame(&mut self) -> Result<()> {
        let (Some(seq), Some(sprite)) = (self.seq.as_mut(), self.sprite.as_mut()) else {
            return Err(FileOpError::decode("no image was decoded"));
        };
        if !seq.image_ready {
            return Err(FileOpError::decode("no image was decoded"));
        }
        let Some(image) = seq.image.as_ref() else {
            return Err(FileOpError::decode("no image was decoded"));
        };
        let frame = seq.frame;

        let linked = self.options.link_identical_frames
            && seq.last_cel.and_then(|idx| sprite.image(idx)).is_some_and(|last| last == image);
        let stock_index = match seq.last_cel {
            Some(idx) if linked => {
                log::trace!("frame {frame} links to image {idx}");
                idx
            }
            _ => sprite.add_image(image.clone()),
        };
        sprite.add_cel(seq.layer, crate::Cel::new(frame, stock_index));
        seq.last_cel = Some(stock_index);

        if sprite.palette(frame).count_diff(&seq.palette) > 0 {
            let mut palette = seq.palette.clone();
            palette.set_frame(frame);
            sprite.set_palette(palette);
        }
        if sprite.frames() < frame + 1 {
            sprite.set_frames(frame + 1);
        }
        Ok(())
    }
}
