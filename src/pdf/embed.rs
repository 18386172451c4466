//! Image decoding and embedding as PDF image XObjects using lopdf

use std::path::{Path, PathBuf};
use image::{DynamicImage, ImageFormat};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use crate::error::{Error, Result};

/// Pixel data ready to be written into an image XObject
#[derive(Debug, Clone)]
enum ImageData {
    /// Original JPEG bytes, embedded with DCTDecode
    Jpeg {
        bytes: Vec<u8>,
        color_space: &'static [u8],
    },
    /// Decoded 8-bit RGB samples, plus an alpha plane when not fully opaque
    Rgb {
        rgb: Vec<u8>,
        alpha: Option<Vec<u8>>,
    },
}

/// A decoded source image
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub path: PathBuf,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    data: ImageData,
}

/// Read an image file and decode it
///
/// The file is read completely and closed before decoding. For animated
/// GIFs only the first frame is kept.
pub fn load_image(path: &Path) -> Result<SourceImage> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path)?;
    let format = image::guess_format(&bytes).ok();
    let decoded = image::load_from_memory(&bytes).map_err(|e| Error::image(path, e))?;

    let (width, height) = (decoded.width(), decoded.height());
    if width == 0 || height == 0 {
        return Err(Error::DegenerateImage(path.to_path_buf()));
    }

    // Grey and RGB JPEGs can be handed to the PDF viewer untouched. The
    // decoder converts CMYK to RGB, so the stream's own component count
    // decides, not the decoded colour type.
    let passthrough = match format {
        Some(ImageFormat::Jpeg) => jpeg_color_space(&bytes),
        _ => None,
    };
    let data = match passthrough {
        Some(color_space) => ImageData::Jpeg { bytes, color_space },
        None => split_rgb_alpha(&decoded),
    };

    Ok(SourceImage {
        path: path.to_path_buf(),
        width,
        height,
        data,
    })
}

/// PDF colour space for a JPEG that can be embedded as-is
///
/// Only 1-component (grey) and 3-component (RGB) baseline or progressive
/// frames qualify; CMYK/YCCK and unreadable headers return `None`.
fn jpeg_color_space(bytes: &[u8]) -> Option<&'static [u8]> {
    match jpeg_component_count(bytes)? {
        1 => Some(b"DeviceGray"),
        3 => Some(b"DeviceRGB"),
        _ => None,
    }
}

/// Number of colour components declared in the JPEG frame header
fn jpeg_component_count(bytes: &[u8]) -> Option<u8> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut pos = 2;
    loop {
        // Markers may be preceded by any number of 0xFF fill bytes
        if *bytes.get(pos)? != 0xFF {
            return None;
        }
        while *bytes.get(pos)? == 0xFF {
            pos += 1;
        }
        let marker = *bytes.get(pos)?;
        pos += 1;

        match marker {
            // Standalone markers carry no length
            0x01 | 0xD0..=0xD7 => continue,
            // Start of scan or end of image before any frame header
            0xDA | 0xD9 => return None,
            _ => {}
        }

        let length = usize::from(u16::from_be_bytes([*bytes.get(pos)?, *bytes.get(pos + 1)?]));
        if length < 2 {
            return None;
        }

        // SOF0..SOF15, excluding DHT (C4), JPG (C8) and DAC (CC)
        if matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            // length(2) precision(1) height(2) width(2) components(1)
            return bytes.get(pos + 7).copied();
        }

        pos += length;
    }
}

/// Split a decoded image into RGB samples and an optional alpha plane
fn split_rgb_alpha(decoded: &DynamicImage) -> ImageData {
    if !decoded.color().has_alpha() {
        return ImageData::Rgb {
            rgb: decoded.to_rgb8().into_raw(),
            alpha: None,
        };
    }

    let rgba = decoded.to_rgba8();
    let pixel_count = rgba.width() as usize * rgba.height() as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut translucent = false;

    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        rgb.extend_from_slice(&[r, g, b]);
        alpha.push(a);
        translucent |= a != 255;
    }

    ImageData::Rgb {
        rgb,
        alpha: translucent.then_some(alpha),
    }
}

/// Base dictionary shared by colour and soft-mask image XObjects
fn image_dictionary(width: u32, height: u32, color_space: &[u8]) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(i64::from(width)));
    dict.set("Height", Object::Integer(i64::from(height)));
    dict.set("ColorSpace", Object::Name(color_space.to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict
}

/// Add an image XObject (and its soft mask, if any) to the document
///
/// Raw RGB and alpha streams are left uncompressed here and picked up by
/// `Document::compress`; JPEG streams are excluded from compression since
/// they already carry their own filter.
pub fn add_image_xobject(doc: &mut Document, image: &SourceImage) -> ObjectId {
    match &image.data {
        ImageData::Jpeg { bytes, color_space } => {
            let mut dict = image_dictionary(image.width, image.height, color_space);
            dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));

            let mut stream = Stream::new(dict, bytes.clone());
            stream.allows_compression = false;
            doc.add_object(stream)
        }
        ImageData::Rgb { rgb, alpha } => {
            let mut dict = image_dictionary(image.width, image.height, b"DeviceRGB");

            if let Some(alpha) = alpha {
                let mask_dict = image_dictionary(image.width, image.height, b"DeviceGray");
                let mask_id = doc.add_object(Stream::new(mask_dict, alpha.clone()));
                dict.set("SMask", Object::Reference(mask_id));
            }

            doc.add_object(Stream::new(dict, rgb.clone()))
        }
    }
}
