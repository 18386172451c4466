//! Error types for the pic2pdf library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the pic2pdf library
///
/// The `Display` text is what the user sees in the status line.
#[derive(Error, Debug)]
pub enum Error {
    /// Assembly requested with an empty image collection
    #[error("no images: add some images first")]
    NoImages,

    /// Assembly requested with a blank output file name
    #[error("no filename: enter a name for the PDF")]
    NoFilename,

    /// Image with a zero width or height
    #[error("Image has zero width or height: {}", .0.display())]
    DegenerateImage(PathBuf),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Image decoding error
    #[error("Cannot read image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid glob pattern
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// No files matched pattern
    #[error("No files found matching pattern: {0}")]
    NoFilesMatched(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    pub(crate) fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Error::Image {
            path: path.into(),
            source,
        }
    }
}

impl From<glob::PatternError> for Error {
    fn from(err: glob::PatternError) -> Self {
        Error::InvalidGlob(err.to_string())
    }
}
