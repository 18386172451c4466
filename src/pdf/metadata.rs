//! PDF metadata extraction

use std::path::Path;
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use crate::error::{Error, Result};
use crate::layout::Length;

/// Count pages by reading the Count field from the Pages dictionary
fn count_pages_from_catalog(doc: &Document) -> Result<usize> {
    let catalog = doc.catalog()
        .map_err(|_| Error::General("No catalog in document".to_string()))?;

    let pages_id = catalog.get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|_| Error::General("No Pages reference in catalog".to_string()))?;

    let pages_dict = doc.get_dictionary(pages_id)?;

    match pages_dict.get(b"Count") {
        Ok(Object::Integer(n)) => Ok(*n as usize),
        Ok(_) => Err(Error::General("Count is not an integer".to_string())),
        Err(_) => Err(Error::General("No Count in Pages".to_string())),
    }
}

/// Size of the image drawn on one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageImage {
    /// 1-based page number
    pub page_number: u32,
    pub width: Length,
    pub height: Length,
}

/// PDF metadata
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Document title (if present)
    pub title: Option<String>,
    /// Producing application (if present)
    pub producer: Option<String>,
    /// Placed image size for every page that draws one
    pub images: Vec<PageImage>,
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    let page_count = count_pages_from_catalog(&doc)?;

    let mut title = None;
    let mut producer = None;

    if let Ok(Object::Reference(info_id)) = doc.trailer.get(b"Info") {
        if let Ok(info_dict) = doc.get_dictionary(*info_id) {
            title = info_dict.get(b"Title").ok().and_then(decode_text_string);
            producer = info_dict.get(b"Producer").ok().and_then(decode_text_string);
        }
    }

    let mut images = Vec::new();
    for (page_number, page_id) in doc.get_pages() {
        if let Some((width, height)) = placed_image_size(&doc, page_id)? {
            images.push(PageImage { page_number, width, height });
        }
    }

    Ok(PdfMetadata {
        page_count,
        title,
        producer,
        images,
    })
}

/// Count the number of pages in a PDF file
pub fn count_pages(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    count_pages_from_catalog(&doc)
}

/// Find the size of the first image drawn on a page
///
/// Image XObjects are drawn into the unit square, so the scale factors of
/// the last `cm` before `Do` are the image's width and height in points.
fn placed_image_size(doc: &Document, page_id: ObjectId) -> Result<Option<(Length, Length)>> {
    let bytes = doc.get_page_content(page_id)?;
    let content = Content::decode(&bytes)?;

    let mut scale = None;
    for operation in &content.operations {
        match operation.operator.as_str() {
            "cm" if operation.operands.len() == 6 => {
                let a = number(&operation.operands[0]);
                let d = number(&operation.operands[3]);
                if let (Some(a), Some(d)) = (a, d) {
                    scale = Some((Length::from_pt(a), Length::from_pt(d)));
                }
            }
            "Do" => return Ok(scale),
            _ => {}
        }
    }

    Ok(None)
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// Decode a PDF text string (UTF-16BE with BOM, or single-byte)
fn decode_text_string(object: &Object) -> Option<String> {
    let bytes = match object {
        Object::String(bytes, _) => bytes,
        _ => return None,
    };

    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16(&units).ok();
    }

    String::from_utf8(bytes.clone()).ok()
}
