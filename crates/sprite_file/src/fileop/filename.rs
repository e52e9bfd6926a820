use std::path::{Path, PathBuf};

/// A filename split around the number that precedes its extension.
///
/// `frames/walk007.png` splits into the prefix `frames/walk`, the number 7
/// with a width of 3 and the suffix `.png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceName {
    dir: PathBuf,
    prefix: String,
    number: Option<u32>,
    width: usize,
    suffix: String,
}

impl SequenceName {
    pub fn split(path: &Path) -> Self {
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        let suffix = path.extension().map(|e| format!(".{}", e.to_string_lossy())).unwrap_or_default();

        let digits = stem.bytes().rev().take_while(u8::is_ascii_digit).count();
        let (prefix, number) = stem.split_at(stem.len() - digits);
        // absurdly long digit runs are treated as part of the name
        let parsed = if digits > 0 && digits <= 9 { number.parse::<u32>().ok() } else { None };
        let (prefix, width) = match parsed {
            Some(_) => (prefix.to_string(), digits),
            None => (stem.clone(), 0),
        };

        Self {
            dir,
            prefix,
            number: parsed,
            width,
            suffix,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn number(&self) -> Option<u32> {
        self.number
    }

    /// Zero padding width of the number.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The filename with `number` zero padded to the width of this name.
    pub fn path(&self, number: u32) -> PathBuf {
        self.dir
            .join(format!("{}{:0width$}{}", self.prefix, number, self.suffix, width = self.width))
    }
}

/// Returns `path` followed by the numbered files after it that exist on disk.
///
/// A name without a trailing number yields only itself.
pub fn gather_sequence(path: &Path) -> Vec<PathBuf> {
    let mut files = vec![path.to_path_buf()];
    let name = SequenceName::split(path);
    let Some(start) = name.number else {
        return files;
    };
    let mut n = start;
    while let Some(next) = n.checked_add(1) {
        let candidate = name.path(next);
        if !candidate.is_file() {
            break;
        }
        files.push(candidate);
        n = next;
    }
    log::debug!("found {} file(s) in sequence of '{}'", files.len(), path.display());
    files
}

/// One filename per frame for saving `frames` frames as numbered files.
///
/// Numbering continues from the number in `path`. Without one it starts at 0 and
/// is padded to fit the frame count.
pub fn sequence_filenames(path: &Path, frames: usize) -> Vec<PathBuf> {
    if frames <= 1 {
        return vec![path.to_path_buf()];
    }
    let mut name = SequenceName::split(path);
    let start = match name.number {
        Some(start) => start,
        None => {
            name.width = match frames {
                0..10 => 1,
                10..100 => 2,
                100..1000 => 3,
                _ => 4,
            };
            0
        }
    };
    (0..frames as u32).map(|i| name.path(start.saturating_add(i))).collect()
}
