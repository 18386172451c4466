//! PDF assembly module

pub mod assemble;
pub mod embed;
pub mod metadata;

// Re-export commonly used items
pub use assemble::{assemble_pdf, normalize_destination, AssemblyReport, AssemblyRequest};
pub use metadata::{count_pages, extract_metadata, PageImage, PdfMetadata};
