use std::panic::{self, AssertUnwindSafe};

use super::{FileOp, FileOpKind};
use crate::{FileOpError, Image, Result};

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl FileOp {
    /// Runs the operation to completion on the calling thread.
    ///
    /// Errors end up in the status block, never in the return path. The status
    /// is marked done when this returns, whatever the outcome. A panicking
    /// format callback is recorded as an error and drops a partly loaded sprite.
    pub fn operate(&mut self) {
        log::debug!("{:?} '{}' with format '{}'", self.kind, self.filename.display(), self.format.name);
        let dispatched = panic::catch_unwind(AssertUnwindSafe(|| match (self.kind, self.seq.is_some()) {
            (FileOpKind::Load, true) => self.load_sequence(),
            (FileOpKind::Load, false) => self.run_callback(),
            (FileOpKind::Save, true) => self.save_sequence(),
            (FileOpKind::Save, false) => self.run_callback(),
        }));
        let result = dispatched.unwrap_or_else(|payload| {
            let reason = panic_message(payload.as_ref());
            log::error!("format '{}' panicked on '{}': {reason}", self.format.name, self.filename.display());
            if self.kind == FileOpKind::Load {
                self.sprite = None;
            }
            Err(FileOpError::Failed {
                message: format!("Error processing file \"{}\": {reason}", self.filename.display()),
            })
        });

        match result {
            Ok(()) => {
                if !self.status.is_stop() && !self.status.has_error() {
                    self.status.set_progress(1.0);
                }
            }
            Err(err) => self.record(err),
        }

        if self.kind == FileOpKind::Load && self.sprite.is_none() && !self.status.has_error() && !self.status.is_stop() {
            self.status.set_error(format!("Error loading sprite from file \"{}\"", self.filename.display()));
        }
        self.status.set_done();
    }

    fn callback(&self) -> Result<fn(&mut FileOp) -> Result<()>> {
        let callback = match self.kind {
            FileOpKind::Load => self.format.load,
            FileOpKind::Save => self.format.save,
        };
        callback.ok_or_else(|| FileOpError::not_supported(self.format.name, if self.kind == FileOpKind::Load { "loading" } else { "saving" }))
    }

    fn run_callback(&mut self) -> Result<()> {
        let callback = self.callback()?;
        callback(self)
    }

    /// Cancellation is silent and an explicitly reported message wins.
    fn record(&self, err: FileOpError) {
        if err.is_cancelled() {
            log::info!("file operation on '{}' cancelled", self.filename.display());
            return;
        }
        if !self.status.has_error() {
            let mut message = err.to_string();
            if message.is_empty() {
                message = format!("Error processing file \"{}\"", self.filename.display());
            }
            self.status.set_error(message);
        }
    }

    fn load_sequence(&mut self) -> Result<()> {
        let callback = self.callback()?;
        let filenames = self.seq.as_ref().map(|seq| seq.filenames.clone()).unwrap_or_default();
        let fraction = 1.0 / filenames.len().max(1) as f32;

        for (frame, filename) in filenames.iter().enumerate() {
            if self.status.is_stop() {
                break;
            }
            if let Some(seq) = self.seq.as_mut() {
                seq.frame = frame;
                seq.progress_offset = frame as f32 * fraction;
                seq.progress_fraction = fraction;
                seq.image_ready = false;
            }
            self.filename.clone_from(filename);

            let result = callback(self).and_then(|()| self.attach_sequence_frame());
            match result {
                Ok(()) => self.report_progress(1.0),
                Err(err) => {
                    if err.is_cancelled() {
                        break;
                    }
                    if !self.status.has_error() {
                        let mut message = err.to_string();
                        if message.is_empty() {
                            message = format!("Error loading frame {} from file \"{}\"", frame + 1, filename.display());
                        }
                        self.status.set_error(message);
                    }
                    if frame == 0 {
                        self.sprite = None;
                    }
                    break;
                }
            }
        }

        self.finish_sequence_load(&filenames);
        Ok(())
    }

    fn finish_sequence_load(&mut self, filenames: &[std::path::PathBuf]) {
        let (Some(seq), Some(sprite)) = (self.seq.as_ref(), self.sprite.as_mut()) else {
            return;
        };
        let frames = sprite.layer(seq.layer).map_or(0, |layer| layer.cels().len());
        sprite.set_frames(frames.max(1));
        if !seq.has_alpha {
            if let Some(layer) = sprite.layer_mut(seq.layer) {
                layer.is_background = true;
            }
        }
        if let Some(first) = filenames.first() {
            sprite.set_filename(first.clone());
            self.filename.clone_from(first);
        }
        log::debug!("loaded sequence of {} frame(s) from '{}'", sprite.frames(), sprite.filename().display());
    }

    fn save_sequence(&mut self) -> Result<()> {
        let callback = self.callback()?;
        let (mode, width, height, frames) = match &self.sprite {
            Some(sprite) => (sprite.color_mode(), sprite.width(), sprite.height(), sprite.frames()),
            None => return Err(FileOpError::encode("no sprite to save")),
        };
        let filenames = self.seq.as_ref().map(|seq| seq.filenames.clone()).unwrap_or_default();
        let fraction = 1.0 / filenames.len().max(1) as f32;
        let mut image = Image::new(mode, width, height);

        for (frame, filename) in filenames.iter().enumerate().take(frames) {
            if self.status.is_stop() {
                break;
            }
            let (Some(sprite), Some(seq)) = (self.sprite.as_ref(), self.seq.as_mut()) else {
                break;
            };
            image.clear(0);
            sprite.render(frame, &mut image);
            seq.palette = sprite.palette(frame).clone();
            seq.frame = frame;
            seq.progress_offset = frame as f32 * fraction;
            seq.progress_fraction = fraction;
            seq.image = Some(image);
            self.filename.clone_from(filename);

            let result = callback(self);
            // take the buffer back for the next frame
            image = self.seq.as_mut().and_then(|seq| seq.image.take()).unwrap_or_else(|| Image::new(mode, width, height));

            if let Err(err) = result {
                if !err.is_cancelled() && !self.status.has_error() {
                    let mut message = err.to_string();
                    if message.is_empty() {
                        message = format!("Error saving frame {} in the file \"{}\"", frame + 1, filename.display());
                    }
                    self.status.set_error(message);
                }
                break;
            }
            self.report_progress(1.0);
        }

        if let Some(first) = filenames.first() {
            self.filename.clone_from(first);
        }
        Ok(())
    }
}
