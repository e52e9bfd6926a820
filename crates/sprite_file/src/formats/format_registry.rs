//! Format registry for unified file handling.
//!
//! The registry maps file extensions to [`FormatDescriptor`]s. The process-wide
//! instance returned by [`registry()`] holds every built-in [`FileFormat`] and is
//! never mutated after it is built. Hosts that need extra formats build their own
//! [`FormatRegistry`] and pass it to the `*_with` factories of [`crate::FileOp`].

use std::path::Path;

use once_cell::sync::Lazy;

use super::{FileFormat, FormatCapabilities, check_compatibility};
use crate::{CompatibilityIssue, FileOp, Result, Sprite};

/// Reads the file named by the operation into its sprite (or sequence frame).
pub type LoadFn = fn(&mut FileOp) -> Result<()>;

/// Writes the sprite (or sequence frame) of the operation to its file.
pub type SaveFn = fn(&mut FileOp) -> Result<()>;

/// Load and/or save procedures of one file format.
#[derive(Clone, Copy)]
pub struct FormatDescriptor {
    /// File format name
    pub name: &'static str,
    /// Comma separated extensions (e.g. "jpeg,jpg")
    pub extensions: &'static str,
    pub load: Option<LoadFn>,
    pub save: Option<SaveFn>,
    pub capabilities: FormatCapabilities,
}

impl std::fmt::Debug for FormatDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatDescriptor")
            .field("name", &self.name)
            .field("extensions", &self.extensions)
            .field("load", &self.load.is_some())
            .field("save", &self.save.is_some())
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

impl FormatDescriptor {
    pub fn extensions(&self) -> impl Iterator<Item = &'static str> {
        self.extensions.split(',').map(str::trim).filter(|e| !e.is_empty())
    }

    /// Case-insensitive extension check, `ext` without the leading dot.
    pub fn matches_extension(&self, ext: &str) -> bool {
        self.extensions().any(|e| e.eq_ignore_ascii_case(ext))
    }

    pub fn supports(&self, caps: FormatCapabilities) -> bool {
        self.capabilities.contains(caps)
    }

    pub fn check_compatibility(&self, sprite: &Sprite) -> Vec<CompatibilityIssue> {
        check_compatibility(self.capabilities, sprite)
    }
}

#[derive(Debug, Default)]
pub struct FormatRegistry {
    formats: Vec<FormatDescriptor>,
}

impl FormatRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with all built-in formats.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for format in FileFormat::ALL {
            registry.register(format.descriptor());
        }
        registry
    }

    /// Adds a format, lookups prefer formats registered earlier.
    pub fn register(&mut self, descriptor: FormatDescriptor) {
        log::debug!("registering file format '{}' ({})", descriptor.name, descriptor.extensions);
        self.formats.push(descriptor);
    }

    pub fn formats(&self) -> &[FormatDescriptor] {
        &self.formats
    }

    pub fn find_by_name(&self, name: &str) -> Option<&FormatDescriptor> {
        self.formats.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// First registered format listing `ext` (case-insensitive, without dot).
    pub fn find_by_extension(&self, ext: &str) -> Option<&FormatDescriptor> {
        self.formats.iter().find(|f| f.matches_extension(ext))
    }

    pub fn find_by_path(&self, path: &Path) -> Option<&FormatDescriptor> {
        path.extension().and_then(|ext| ext.to_str()).and_then(|ext| self.find_by_extension(ext))
    }

    /// Extensions of all formats that can be loaded, for file dialog filters.
    pub fn readable_extensions(&self) -> Vec<&'static str> {
        self.collect_extensions(|f| f.load.is_some())
    }

    /// Extensions of all formats that can be saved, for file dialog filters.
    pub fn writable_extensions(&self) -> Vec<&'static str> {
        self.collect_extensions(|f| f.save.is_some())
    }

    pub fn readable_filter(&self) -> String {
        self.readable_extensions().join(",")
    }

    pub fn writable_filter(&self) -> String {
        self.writable_extensions().join(",")
    }

    fn collect_extensions(&self, filter: impl Fn(&FormatDescriptor) -> bool) -> Vec<&'static str> {
        let mut result: Vec<&'static str> = Vec::new();
        for ext in self.formats.iter().filter(|f| filter(f)).flat_map(FormatDescriptor::extensions) {
            if !result.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
                result.push(ext);
            }
        }
        result
    }
}

static REGISTRY: Lazy<FormatRegistry> = Lazy::new(FormatRegistry::builtin);

/// The process-wide registry of built-in formats.
pub fn registry() -> &'static FormatRegistry {
    &REGISTRY
}
