//! Interaction state behind the drop / generate / clear controls
//!
//! A [`Session`] owns the [`ImageCollection`] and turns user events into
//! [`Status`] messages. Choosing where to save is delegated to a
//! [`SaveDialog`], so any front end (terminal prompt, native dialog, test
//! closure) can drive it.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;
use crate::collection::ImageCollection;
use crate::error::Error;
use crate::layout::PageLayout;
use crate::pdf::{assemble_pdf, normalize_destination, AssemblyReport, AssemblyRequest};

/// Something that asks the user where to save the PDF
pub trait SaveDialog {
    /// Return the chosen path, or `None` if the user cancelled
    fn choose_destination(&mut self, suggested: &Path) -> Option<PathBuf>;
}

impl<F> SaveDialog for F
where
    F: FnMut(&Path) -> Option<PathBuf>,
{
    fn choose_destination(&mut self, suggested: &Path) -> Option<PathBuf> {
        self(suggested)
    }
}

/// Dialog that always accepts the suggested path
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptSuggested;

impl SaveDialog for AcceptSuggested {
    fn choose_destination(&mut self, suggested: &Path) -> Option<PathBuf> {
        Some(suggested.to_path_buf())
    }
}

/// Message reported back to the user after each action
#[derive(Debug)]
pub enum Status {
    /// Some dropped files were new, valid images
    Added { added: usize, total: usize },
    /// A drop contained no new valid images
    NothingAdded { total: usize },
    /// The PDF was written
    Generated(AssemblyReport),
    /// Generating failed; the collection is left untouched
    Failed(Error),
    /// The collection was emptied
    Cleared,
}

impl Status {
    pub fn is_error(&self) -> bool {
        matches!(self, Status::Failed(_))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Added { added, total } => write!(
                f,
                "Added {} image(s), {} in total. Drop more to add them.",
                added, total
            ),
            Status::NothingAdded { total } => write!(
                f,
                "No new valid images, {} in total. Drop more to add them.",
                total
            ),
            Status::Generated(report) => write!(
                f,
                "PDF generated: {} ({} image(s))",
                report.output_path.display(),
                report.image_count
            ),
            Status::Failed(err) => write!(f, "Error: {}", err),
            Status::Cleared => write!(f, "All images cleared"),
        }
    }
}

/// The image collection plus everything needed to turn it into a PDF
#[derive(Debug, Clone)]
pub struct Session {
    collection: ImageCollection,
    output_dir: PathBuf,
    layout: PageLayout,
}

impl Session {
    /// Start an empty session suggesting output files in `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            collection: ImageCollection::new(),
            output_dir: output_dir.into(),
            layout: PageLayout::default(),
        }
    }

    /// Replace the page layout used for generated PDFs
    pub fn with_layout(mut self, layout: PageLayout) -> Self {
        self.layout = layout;
        self
    }

    /// The user's desktop, falling back to home and then the working directory
    pub fn default_output_dir() -> PathBuf {
        dirs::desktop_dir()
            .filter(|dir| dir.is_dir())
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn collection(&self) -> &ImageCollection {
        &self.collection
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Handle files dropped onto the window
    pub fn drop_files<I, P>(&mut self, paths: I) -> Status
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let added = self.collection.add(paths);
        let total = self.collection.len();

        if added > 0 {
            Status::Added { added, total }
        } else {
            Status::NothingAdded { total }
        }
    }

    /// Handle the clear button
    pub fn clear(&mut self) -> Status {
        self.collection.clear();
        Status::Cleared
    }

    /// Handle the generate button
    ///
    /// `filename` is the text typed by the user. Returns `None` when the
    /// save dialog was cancelled; nothing is written in that case. The
    /// collection is kept after both success and failure.
    pub fn generate(&mut self, filename: &str, dialog: &mut impl SaveDialog) -> Option<Status> {
        if self.collection.is_empty() {
            return Some(Status::Failed(Error::NoImages));
        }

        let filename = filename.trim();
        if filename.is_empty() {
            return Some(Status::Failed(Error::NoFilename));
        }

        let suggested = match normalize_destination(&self.output_dir.join(filename)) {
            Ok(path) => path,
            Err(err) => return Some(Status::Failed(err)),
        };

        let Some(destination) = dialog.choose_destination(&suggested) else {
            info!("save dialog cancelled");
            return None;
        };

        let request = AssemblyRequest {
            image_paths: self.collection.paths().to_vec(),
            output_path: destination,
            layout: self.layout,
        };

        Some(match assemble_pdf(&request) {
            Ok(report) => Status::Generated(report),
            Err(err) => Status::Failed(err),
        })
    }
}
