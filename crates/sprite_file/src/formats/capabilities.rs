//! Format capability system for compatibility checking.
//!
//! This module provides a system to check if a Sprite can be saved
//! in a specific file format without losing information.

use bitflags::bitflags;

use crate::{ColorMode, Sprite};

bitflags! {
    /// Color modes and structures a file format can store.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FormatCapabilities: u32 {
        /// RGB images
        const RGB = 1 << 0;

        /// RGB images with alpha channel
        const RGBA = 1 << 1;

        /// Grayscale images
        const GRAY = 1 << 2;

        /// Grayscale images with alpha channel
        const GRAYA = 1 << 3;

        /// Indexed (palette) images
        const INDEXED = 1 << 4;

        /// More than one layer
        const LAYERS = 1 << 5;

        /// More than one frame in a single file
        const FRAMES = 1 << 6;

        /// A palette per frame
        const PALETTES = 1 << 7;

        /// One file per frame, numbered (anim0.png, anim1.png, ...)
        const SEQUENCES = 1 << 8;

        /// Selection mask repository
        const MASKS_REPOSITORY = 1 << 9;

        /// Path repository
        const PATHS_REPOSITORY = 1 << 10;
    }
}

bitflags! {
    /// How numbered sibling files are treated when loading.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct LoadFlags: u32 {
        /// Never treat numbered files as one sequence.
        const SEQUENCE_NONE = 1 << 0;

        /// Ask the caller before loading a sequence.
        const SEQUENCE_ASK = 1 << 1;

        /// Load numbered siblings as a sequence without asking.
        const SEQUENCE_YES = 1 << 2;

        /// Load only the first frame of animated formats.
        const ONE_FRAME = 1 << 3;
    }
}

/// A compatibility issue found when checking format compatibility.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompatibilityIssue {
    /// Severity of the issue
    pub severity: IssueSeverity,

    /// Type of the issue
    pub issue_type: IssueType,

    /// Human-readable description
    pub message: String,
}

/// Severity of a compatibility issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IssueSeverity {
    /// Data will be lost - format cannot represent this feature
    Error,

    /// Some features won't be preserved exactly but the file will work
    Warning,

    /// Minor change, format handles it differently
    Info,
}

/// Types of compatibility issues.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IssueType {
    /// Format can't store RGB images
    RgbUnsupported,

    /// Format can't store the alpha channel
    AlphaUnsupported,

    /// Format can't store grayscale images
    GrayscaleUnsupported,

    /// Format can't store indexed images
    IndexedUnsupported,

    /// Layers get flattened
    LayersUnsupported { layer_count: usize },

    /// Only the first frame is stored
    FramesUnsupported { frame_count: usize },

    /// Frames are stored as numbered files
    FramesAsSequence { frame_count: usize },

    /// Only the first palette is stored
    PaletteChangesUnsupported { palette_count: usize },
}

impl CompatibilityIssue {
    pub fn error(issue_type: IssueType, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            issue_type,
            message: message.into(),
        }
    }

    pub fn warning(issue_type: IssueType, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            issue_type,
            message: message.into(),
        }
    }

    pub fn info(issue_type: IssueType, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Info,
            issue_type,
            message: message.into(),
        }
    }
}

/// Lists what `sprite` uses that a format with `caps` can't store.
///
/// Returns an empty list if the sprite can be saved without loss.
pub fn check_compatibility(caps: FormatCapabilities, sprite: &Sprite) -> Vec<CompatibilityIssue> {
    use FormatCapabilities as C;
    let mut issues = Vec::new();
    let has_alpha = !sprite.has_background();

    match sprite.color_mode() {
        ColorMode::Rgb => {
            if !caps.intersects(C::RGB | C::RGBA) {
                issues.push(CompatibilityIssue::error(IssueType::RgbUnsupported, "Format doesn't support RGB images"));
            } else if has_alpha && !caps.contains(C::RGBA) {
                issues.push(CompatibilityIssue::warning(
                    IssueType::AlphaUnsupported,
                    "Format doesn't support the alpha channel, transparent pixels become opaque",
                ));
            }
        }
        ColorMode::Grayscale => {
            if !caps.intersects(C::GRAY | C::GRAYA) {
                issues.push(CompatibilityIssue::error(
                    IssueType::GrayscaleUnsupported,
                    "Format doesn't support grayscale images",
                ));
            } else if has_alpha && !caps.contains(C::GRAYA) {
                issues.push(CompatibilityIssue::warning(
                    IssueType::AlphaUnsupported,
                    "Format doesn't support the alpha channel, transparent pixels become opaque",
                ));
            }
        }
        ColorMode::Indexed => {
            if !caps.contains(C::INDEXED) {
                issues.push(CompatibilityIssue::warning(
                    IssueType::IndexedUnsupported,
                    "Format doesn't support indexed images, colors are taken from the palette",
                ));
            }
        }
    }

    let layer_count = sprite.layers().len();
    if layer_count > 1 && !caps.contains(C::LAYERS) {
        issues.push(CompatibilityIssue::warning(
            IssueType::LayersUnsupported { layer_count },
            format!("Format doesn't support layers, {layer_count} layers will be flattened"),
        ));
    }

    let frame_count = sprite.frames();
    if frame_count > 1 && !caps.contains(C::FRAMES) {
        if caps.contains(C::SEQUENCES) {
            issues.push(CompatibilityIssue::info(
                IssueType::FramesAsSequence { frame_count },
                format!("{frame_count} frames will be saved as a sequence of files"),
            ));
        } else {
            issues.push(CompatibilityIssue::error(
                IssueType::FramesUnsupported { frame_count },
                format!("Format doesn't support frames, only the first of {frame_count} frames is saved"),
            ));
        }
    }

    let palette_count = sprite.palettes().len();
    if palette_count > 1 && !caps.contains(C::PALETTES) && !caps.contains(C::SEQUENCES) {
        issues.push(CompatibilityIssue::warning(
            IssueType::PaletteChangesUnsupported { palette_count },
            "Format doesn't support palette changes between frames",
        ));
    }

    issues
}
