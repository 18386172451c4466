//! Page layout calculations
//!
//! Layout is expressed in millimetres, the page-unit system images are
//! placed in. Conversion to PDF points happens only when content streams
//! are written.

use std::path::Path;
use crate::error::{Error, Result};

/// Simple length type in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length(pub f64);

impl Length {
    /// Create a length from millimeters
    pub fn from_mm(mm: f64) -> Self {
        Length(mm)
    }

    /// Create a length from points (1/72 inch)
    pub fn from_pt(pt: f64) -> Self {
        Length(pt * 25.4 / 72.0)
    }

    /// Get the value in millimeters
    pub fn mm(&self) -> f64 {
        self.0
    }

    /// Get the value in points (1/72 inch)
    pub fn pt(&self) -> f64 {
        self.0 * 72.0 / 25.4
    }
}

/// Page dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDimensions {
    pub width: Length,
    pub height: Length,
}

impl PageDimensions {
    /// A4 portrait (210mm × 297mm)
    pub fn a4() -> Self {
        Self {
            width: Length::from_mm(210.0),
            height: Length::from_mm(297.0),
        }
    }
}

/// Where and how large each image goes on its page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page: PageDimensions,
    /// Distance from the left page edge to the image
    pub margin_left: Length,
    /// Distance from the top page edge to the image
    pub margin_top: Length,
    /// Width every image is scaled to
    pub image_width: Length,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page: PageDimensions::a4(),
            margin_left: Length::from_mm(10.0),
            margin_top: Length::from_mm(10.0),
            image_width: Length::from_mm(190.0),
        }
    }
}

/// Image rectangle on a page, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub x: Length,
    pub y: Length,
    pub width: Length,
    pub height: Length,
}

impl ImagePlacement {
    /// Bottom edge of the image in PDF user space (origin bottom-left)
    ///
    /// Negative when a tall image runs past the bottom of the page.
    pub fn pdf_bottom(&self, page: &PageDimensions) -> Length {
        Length::from_mm(page.height.mm() - self.y.mm() - self.height.mm())
    }
}

impl PageLayout {
    /// Place an image of `pixel_width` × `pixel_height` on a page
    ///
    /// The width is fixed and the height follows the source aspect ratio.
    /// No clamping is applied, so very tall images overflow the page.
    /// `source` only labels the error for degenerate images.
    pub fn place_image(
        &self,
        pixel_width: u32,
        pixel_height: u32,
        source: &Path,
    ) -> Result<ImagePlacement> {
        if pixel_width == 0 || pixel_height == 0 {
            return Err(Error::DegenerateImage(source.to_path_buf()));
        }

        let width = self.image_width.mm();
        let height = width * f64::from(pixel_height) / f64::from(pixel_width);

        Ok(ImagePlacement {
            x: self.margin_left,
            y: self.margin_top,
            width: self.image_width,
            height: Length::from_mm(height),
        })
    }
}
