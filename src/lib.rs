//! pic2pdf Library
//!
//! Collect image files and assemble them into a PDF, one image per page.
//! This library provides functionality to:
//! - Keep an ordered, duplicate-free collection of accepted images
//! - Lay out each image on an A4 page at a fixed width, preserving aspect ratio
//! - Write the PDF atomically and read its page/image layout back
//! - Drive the whole flow from drop / generate / clear events
//!
//! # Example
//!
//! ```no_run
//! use pic2pdf::session::{AcceptSuggested, Session};
//!
//! let mut session = Session::new("out");
//! println!("{}", session.drop_files(["scan-1.png", "scan-2.jpg", "notes.txt"]));
//!
//! if let Some(status) = session.generate("scans", &mut AcceptSuggested) {
//!     println!("{}", status);
//! }
//! ```

pub mod collection;
pub mod error;
pub mod layout;
pub mod logging;
pub mod pdf;
pub mod session;
pub mod shell;

// Re-export commonly used items
pub use collection::ImageCollection;
pub use error::{Error, Result};
pub use logging::init_logger;
