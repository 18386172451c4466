//! Ordered, duplicate-free collection of image paths awaiting assembly

use std::path::{Path, PathBuf};
use tracing::debug;

/// File extensions accepted as images (compared case-insensitively)
pub const ACCEPTED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];

/// Check whether a path ends in one of the accepted image extensions
///
/// This is a plain suffix test on the whole path, so a dotfile such as
/// `.png` counts as an image too.
pub fn is_accepted_image(path: &Path) -> bool {
    let name = path.as_os_str().to_string_lossy().to_ascii_lowercase();
    ACCEPTED_EXTENSIONS
        .iter()
        .any(|ext| name.strip_suffix(ext).is_some_and(|stem| stem.ends_with('.')))
}

/// Images collected so far, in the order they were added
///
/// Paths are compared as raw strings without any normalization, so
/// `scans/a.png`, `scans//a.png` and `scans/./a.png` are three entries.
/// Only [`ImageCollection::add`] and [`ImageCollection::clear`] mutate the
/// collection.
#[derive(Debug, Clone, Default)]
pub struct ImageCollection {
    paths: Vec<PathBuf>,
}

impl ImageCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every candidate that is an accepted image and not already present
    ///
    /// Returns the number of paths actually added. Rejected candidates are
    /// dropped silently.
    pub fn add<I, P>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut added = 0;

        for candidate in candidates {
            let path = candidate.into();

            if !is_accepted_image(&path) {
                debug!(path = %path.display(), "rejected: unsupported extension");
                continue;
            }
            if self.contains(&path) {
                debug!(path = %path.display(), "rejected: already collected");
                continue;
            }

            debug!(path = %path.display(), "accepted");
            self.paths.push(path);
            added += 1;
        }

        added
    }

    /// Remove every collected image
    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p.as_os_str() == path.as_os_str())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Collected paths in insertion order
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}
