//! Assemble collected images into a one-image-per-page PDF using lopdf

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info, warn};
use crate::error::{Error, Result};
use crate::layout::{ImagePlacement, PageLayout};
use super::embed::{add_image_xobject, load_image};

/// Resource name every page uses for its image
const IMAGE_RESOURCE: &[u8] = b"Im1";

/// A request to build one PDF from an ordered list of images
#[derive(Debug, Clone)]
pub struct AssemblyRequest {
    /// Image file paths, one page each, in page order
    pub image_paths: Vec<PathBuf>,
    /// Output PDF file path (a missing `.pdf` suffix is added)
    pub output_path: PathBuf,
    /// Page geometry
    pub layout: PageLayout,
}

impl AssemblyRequest {
    /// Request with the default A4 layout
    pub fn new(image_paths: Vec<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            image_paths,
            output_path: output_path.into(),
            layout: PageLayout::default(),
        }
    }
}

/// Outcome of a successful assembly
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyReport {
    /// Where the PDF was written, after suffix normalization
    pub output_path: PathBuf,
    /// Number of images (and pages) in the document
    pub image_count: usize,
}

/// Validate an output path and make sure it ends in `.pdf`
///
/// Surrounding whitespace is trimmed from the file name. The suffix check
/// is case-insensitive, so `Report.PDF` is kept as is while `report`
/// becomes `report.pdf`.
pub fn normalize_destination(destination: &Path) -> Result<PathBuf> {
    let name = destination
        .file_name()
        .map(|name| name.to_string_lossy().trim().to_string())
        .unwrap_or_default();

    if name.is_empty() {
        return Err(Error::NoFilename);
    }

    let file_name = if name.to_ascii_lowercase().ends_with(".pdf") {
        name
    } else {
        format!("{}.pdf", name)
    };

    Ok(match destination.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    })
}

/// Build a PDF with one page per image and write it to the output path
///
/// Every image is placed at the layout's top-left margin, scaled to the
/// layout's image width with its height following the aspect ratio.
/// The first image that cannot be read aborts the whole run.
///
/// The document is written to a temporary file next to the destination
/// and moved into place only once complete, so a failed run never leaves
/// a partial file behind.
///
/// # Example
///
/// ```no_run
/// use pic2pdf::pdf::{assemble_pdf, AssemblyRequest};
/// use std::path::PathBuf;
///
/// let request = AssemblyRequest::new(
///     vec![PathBuf::from("scan-1.png"), PathBuf::from("scan-2.jpg")],
///     "scans",
/// );
///
/// let report = assemble_pdf(&request).expect("Failed to assemble");
/// assert_eq!(report.output_path, PathBuf::from("scans.pdf"));
/// ```
pub fn assemble_pdf(request: &AssemblyRequest) -> Result<AssemblyReport> {
    if request.image_paths.is_empty() {
        return Err(Error::NoImages);
    }
    let output_path = normalize_destination(&request.output_path)?;

    info!(
        images = request.image_paths.len(),
        output = %output_path.display(),
        "assembling PDF"
    );

    let mut doc = build_document(&request.image_paths, &request.layout, &output_path)?;
    write_atomically(&mut doc, &output_path)?;

    info!(output = %output_path.display(), "PDF written");

    Ok(AssemblyReport {
        output_path,
        image_count: request.image_paths.len(),
    })
}

/// Create the in-memory document: page tree, one page per image, Info
fn build_document(
    image_paths: &[PathBuf],
    layout: &PageLayout,
    output_path: &Path,
) -> Result<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut page_ids: Vec<ObjectId> = Vec::with_capacity(image_paths.len());

    for (i, path) in image_paths.iter().enumerate() {
        let image = load_image(path)?;
        let placement = layout.place_image(image.width, image.height, path)?;

        debug!(
            page = i + 1,
            path = %path.display(),
            pixels = %format!("{}x{}", image.width, image.height),
            height_mm = placement.height.mm(),
            "adding page"
        );

        let image_id = add_image_xobject(&mut doc, &image);
        let page_id = add_image_page(&mut doc, pages_id, layout, &placement, image_id)?;
        page_ids.push(page_id);
    }

    // Create Kids array with all page references
    let kids: Vec<Object> = page_ids
        .iter()
        .map(|&id| Object::Reference(id))
        .collect();

    let mut pages_object = Dictionary::new();
    pages_object.set("Type", Object::Name(b"Pages".to_vec()));
    pages_object.set("Count", Object::Integer(page_ids.len() as i64));
    pages_object.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages_object));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut info_dict = Dictionary::new();
    if let Some(stem) = output_path.file_stem() {
        info_dict.set("Title", text_string(&stem.to_string_lossy()));
    }
    info_dict.set("Producer", text_string("pic2pdf"));
    let info_id = doc.add_object(Object::Dictionary(info_dict));
    doc.trailer.set("Info", Object::Reference(info_id));

    Ok(doc)
}

/// Add a page that draws one image XObject at the given placement
fn add_image_page(
    doc: &mut Document,
    pages_id: ObjectId,
    layout: &PageLayout,
    placement: &ImagePlacement,
    image_id: ObjectId,
) -> Result<ObjectId> {
    // Image space is the unit square, so the cm matrix scales it to the
    // placement size and moves it to the bottom-left corner in points
    let bottom = placement.pdf_bottom(&layout.page);
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(placement.width.pt() as f32),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(placement.height.pt() as f32),
                    Object::Real(placement.x.pt() as f32),
                    Object::Real(bottom.pt() as f32),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_RESOURCE.to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));

    let mut xobjects = Dictionary::new();
    xobjects.set(IMAGE_RESOURCE.to_vec(), Object::Reference(image_id));
    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    let mut page = Dictionary::new();
    page.set("Type", Object::Name(b"Page".to_vec()));
    page.set("Parent", Object::Reference(pages_id));
    page.set("MediaBox", Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(layout.page.width.pt() as f32),
        Object::Real(layout.page.height.pt() as f32),
    ]));
    page.set("Resources", Object::Dictionary(resources));
    page.set("Contents", Object::Reference(content_id));

    Ok(doc.add_object(Object::Dictionary(page)))
}

/// Encode a PDF text string: plain bytes for ASCII, UTF-16BE with BOM otherwise
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, lopdf::StringFormat::Hexadecimal)
}

/// Compress and save the document through a temporary file in the target directory
fn write_atomically(doc: &mut Document, output_path: &Path) -> Result<()> {
    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::Builder::new()
        .prefix(".pic2pdf-")
        .suffix(".part")
        .tempfile_in(dir)?;

    doc.compress();
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        doc.save_to(&mut writer)?;
        writer.flush()?;
    }

    // tempfile creates owner-only files; give the PDF ordinary permissions
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }

    temp.persist(output_path).map_err(|e| {
        warn!(output = %output_path.display(), "could not move finished PDF into place");
        Error::Io(e.error)
    })?;

    Ok(())
}
