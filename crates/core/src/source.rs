//! Source provider abstraction for filesystem-independent parsing.
//!
//! The deck parser never calls `std::fs` directly; it goes through a
//! [`SourceProvider`] so that decks can be served from memory in tests or
//! from an embedder's own storage.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// File access used by the deck parser.
pub trait SourceProvider {
    /// Whether `path` names an existing file.
    fn exists(&self, path: &Path) -> bool;

    /// Read the full contents of `path`. The handle is released before
    /// this returns.
    fn read_source(&self, path: &Path) -> Result<Vec<u8>, io::Error>;

    /// The directory that relative includes inside `path` resolve against.
    fn directory_of(&self, path: &Path) -> PathBuf {
        path.parent().unwrap_or(Path::new(".")).to_owned()
    }

    /// Resolve an include argument against `base`. Absolute arguments are
    /// returned unchanged.
    fn resolve(&self, base: &Path, relative: &str) -> PathBuf {
        let target = Path::new(relative);
        if target.is_absolute() {
            target.to_owned()
        } else {
            base.join(target)
        }
    }

    /// Canonical form of `path`, used as the identity for cycle detection.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf, io::Error>;
}

/// Default provider backed by `std::fs`.
pub struct FileSystemProvider;

impl SourceProvider for FileSystemProvider {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_source(&self, path: &Path) -> Result<Vec<u8>, io::Error> {
        std::fs::read(path)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, io::Error> {
        path.canonicalize()
    }
}

/// In-memory provider for tests and embedding.
///
/// Maps paths to deck text. Paths are normalized lexically, so
/// `/decks/./a/../b.data` and `/decks/b.data` name the same entry.
pub struct InMemoryProvider {
    files: HashMap<PathBuf, String>,
}

impl InMemoryProvider {
    pub fn new(files: HashMap<PathBuf, String>) -> Self {
        let files = files
            .into_iter()
            .map(|(path, text)| (Self::normalize_path(&path), text))
            .collect();
        Self { files }
    }

    /// Convenience constructor from `(path, text)` pairs.
    pub fn from_pairs<P, S>(pairs: impl IntoIterator<Item = (P, S)>) -> Self
    where
        P: Into<PathBuf>,
        S: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(p, s)| (p.into(), s.into()))
                .collect(),
        )
    }

    /// Resolve `.` and `..` components without touching the filesystem.
    fn normalize_path(path: &Path) -> PathBuf {
        let mut components = Vec::new();
        for component in path.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => match components.last() {
                    Some(Component::Normal(_)) => {
                        components.pop();
                    }
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    _ => components.push(Component::ParentDir),
                },
                other => components.push(other),
            }
        }
        components.iter().collect()
    }
}

impl SourceProvider for InMemoryProvider {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(&Self::normalize_path(path))
    }

    fn read_source(&self, path: &Path) -> Result<Vec<u8>, io::Error> {
        let normalized = Self::normalize_path(path);
        self.files
            .get(&normalized)
            .map(|text| text.as_bytes().to_vec())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("file not found in memory: {}", normalized.display()),
                )
            })
    }

    fn resolve(&self, base: &Path, relative: &str) -> PathBuf {
        let target = Path::new(relative);
        if target.is_absolute() {
            Self::normalize_path(target)
        } else {
            Self::normalize_path(&base.join(target))
        }
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, io::Error> {
        let normalized = Self::normalize_path(path);
        if self.files.contains_key(&normalized) {
            Ok(normalized)
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!(
                    "path not found in memory provider: {}",
                    normalized.display()
                ),
            ))
        }
    }
}
