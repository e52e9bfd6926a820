use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Debug, Default)]
struct StatusData {
    progress: f32,
    error: Option<String>,
    done: bool,
    stop: bool,
}

/// State shared between the thread running an operation and the threads polling it.
///
/// All fields sit behind one lock. Pollers only read, except for [`FileOpStatus::stop`].
/// `done` and `stop` are set at most once and never reset.
#[derive(Debug, Default)]
pub struct FileOpStatus {
    data: Mutex<StatusData>,
}

impl FileOpStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overall progress in [0, 1].
    pub fn progress(&self) -> f32 {
        self.data.lock().progress
    }

    /// Last reported error message.
    pub fn error(&self) -> Option<String> {
        self.data.lock().error.clone()
    }

    pub fn has_error(&self) -> bool {
        self.data.lock().error.is_some()
    }

    pub fn is_done(&self) -> bool {
        self.data.lock().done
    }

    pub fn is_stop(&self) -> bool {
        self.data.lock().stop
    }

    /// Asks the running operation to finish early.
    pub fn stop(&self) {
        let mut data = self.data.lock();
        if !data.stop {
            log::debug!("file operation stop requested");
            data.stop = true;
        }
    }

    /// Progress only grows and is frozen once an error was reported.
    pub(crate) fn set_progress(&self, progress: f32) {
        let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        let mut data = self.data.lock();
        if data.error.is_none() && progress > data.progress {
            data.progress = progress;
        }
    }

    pub(crate) fn set_error(&self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("file operation error: {message}");
        self.data.lock().error = Some(message);
    }

    pub(crate) fn set_done(&self) {
        self.data.lock().done = true;
    }
}

/// Progress reporter for one frame of an operation.
///
/// Holds the status and the frame's slice of the overall progress, so a codec can
/// report while it mutably borrows the sequence image of its [`FileOp`](crate::FileOp).
#[derive(Debug, Clone)]
pub struct FileOpProgress {
    status: Arc<FileOpStatus>,
    offset: f32,
    fraction: f32,
}

impl FileOpProgress {
    pub(crate) fn new(status: Arc<FileOpStatus>, offset: f32, fraction: f32) -> Self {
        Self { status, offset, fraction }
    }

    /// Reports `progress` in [0, 1] within the current frame.
    pub fn update(&self, progress: f32) {
        self.status.set_progress(self.offset + progress.clamp(0.0, 1.0) * self.fraction);
    }

    /// Reports `done` of `total` steps.
    pub fn update_steps(&self, done: usize, total: usize) {
        if total > 0 {
            self.update(done as f32 / total as f32);
        }
    }

    pub fn is_stop(&self) -> bool {
        self.status.is_stop()
    }

    /// Returns `Err(Cancelled)` once a stop was requested.
    pub fn check_stop(&self) -> crate::Result<()> {
        if self.is_stop() {
            return Err(crate::FileOpError::Cancelled);
        }
        Ok(())
    }
}
