use std::path::PathBuf;

use thiserror::Error;

use crate::ColorMode;

/// Errors produced while loading or saving sprites.
#[derive(Error, Debug)]
pub enum FileOpError {
    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Registry Errors ===
    #[error("Unknown file format for '{}'", path.display())]
    UnknownFormat { path: PathBuf },

    #[error("Format '{}' does not support {operation}", name)]
    FormatNotSupported { name: String, operation: String },

    // === Codec Errors ===
    #[error("{0}")]
    Decode(String),

    #[error("{0}")]
    Encode(String),

    #[error("Color mode mismatch: expected {expected:?}, got {actual:?}")]
    ColorModeMismatch { expected: ColorMode, actual: ColorMode },

    // === Operation Errors ===
    #[error("Operation cancelled")]
    Cancelled,

    #[error("File operation worker thread panicked")]
    WorkerPanicked,

    #[error("{message}")]
    Failed { message: String },

    // === External Errors ===
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    #[error("PNG decoding error: {0}")]
    PngDecoding(#[from] png::DecodingError),

    #[error("GIF encoding error: {0}")]
    GifEncoding(#[from] gif::EncodingError),

    #[error("GIF decoding error: {0}")]
    GifDecoding(#[from] gif::DecodingError),

    #[error("{0}")]
    Generic(String),
}

/// Result type alias for sprite file operations
pub type Result<T> = std::result::Result<T, FileOpError>;

// === Convenience constructors ===
impl FileOpError {
    /// Create a decoding error with the given message
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create an encoding error with the given message
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Create a generic error from any displayable type
    pub fn generic(msg: impl std::fmt::Display) -> Self {
        Self::Generic(msg.to_string())
    }

    pub fn unknown_format(path: impl Into<PathBuf>) -> Self {
        Self::UnknownFormat { path: path.into() }
    }

    pub fn not_supported(name: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::FormatNotSupported {
            name: name.into(),
            operation: operation.into(),
        }
    }

    /// True for the cooperative stop signal, which is never reported as a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
