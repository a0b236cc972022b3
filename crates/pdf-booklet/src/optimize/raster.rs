//! Lossy re-encoding of embedded raster images

use super::pipeline::{Stage, StageOutput};
use super::recompress::{inflate, name_is, stream_filters};
use super::structural::structural_save;
use crate::impose::load_pdf_bytes;
use crate::types::Result;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashSet;

/// Re-encodes every reachable image as JPEG at a fixed quality
pub struct ImageReencodeStage {
    pub quality: u8,
}

impl Stage for ImageReencodeStage {
    fn name(&self) -> &'static str {
        "image re-encoding"
    }

    fn run(&self, pdf: &[u8]) -> Result<StageOutput> {
        let mut doc = load_pdf_bytes(pdf)?;
        let images = collect_document_images(&doc);

        let mut replaced = 0;
        let mut kept = 0;
        let mut skipped = 0;
        for id in images {
            match reencode_image(&mut doc, id, self.quality) {
                Ok(ReencodeOutcome::Replaced) => replaced += 1,
                Ok(ReencodeOutcome::NotSmaller) => kept += 1,
                Ok(ReencodeOutcome::Unsupported(why)) => {
                    log::debug!("Leaving image {:?} as is: {}", id, why);
                    skipped += 1;
                }
                Err(e) => {
                    log::warn!("Skipping image {:?}: {}", id, e);
                    skipped += 1;
                }
            }
        }

        let bytes = structural_save(&mut doc)?;
        Ok(StageOutput::new(bytes)
            .with_note(format!("{} image(s) re-encoded at quality {}", replaced, self.quality))
            .with_note(format!("{} image(s) kept as stored, {} skipped", kept, skipped)))
    }
}

/// What happened to a single image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReencodeOutcome {
    Replaced,
    NotSmaller,
    Unsupported(String),
}

/// Every image XObject reachable from any page, each listed once
pub fn collect_document_images(doc: &Document) -> Vec<ObjectId> {
    let mut images = Vec::new();
    let mut seen = HashSet::new();

    for page_id in doc.get_pages().values() {
        let Ok(page) = doc.get_dictionary(*page_id) else {
            continue;
        };
        let Ok(resources) = page.get(b"Resources") else {
            continue;
        };
        for child in xobject_refs(doc, resources) {
            collect_images(doc, child, &mut images, &mut seen);
        }
    }

    images
}

fn collect_images(
    doc: &Document,
    id: ObjectId,
    images: &mut Vec<ObjectId>,
    seen: &mut HashSet<ObjectId>,
) {
    if !seen.insert(id) {
        return;
    }
    let Ok(Object::Stream(stream)) = doc.get_object(id) else {
        return;
    };

    let subtype = stream.dict.get(b"Subtype").ok();
    if name_is(subtype, b"Image") {
        images.push(id);
    } else if name_is(subtype, b"Form") {
        if let Ok(resources) = stream.dict.get(b"Resources") {
            for child in xobject_refs(doc, resources) {
                collect_images(doc, child, images, seen);
            }
        }
    }
}

/// Object ids named in a resource dictionary's `/XObject` entry
fn xobject_refs(doc: &Document, resources: &Object) -> Vec<ObjectId> {
    let Some(resources) = resolve_dict(doc, resources) else {
        return Vec::new();
    };
    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .and_then(|x| resolve_dict(doc, x))
    else {
        return Vec::new();
    };

    xobjects
        .iter()
        .filter_map(|(_, obj)| obj.as_reference().ok())
        .collect()
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict),
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        _ => None,
    }
}

/// Decode one image and replace it with a JPEG if that is smaller
pub fn reencode_image(doc: &mut Document, id: ObjectId, quality: u8) -> Result<ReencodeOutcome> {
    let stream = doc.get_object(id)?.as_stream()?;
    let image = match decode_image(doc, stream)? {
        Ok(image) => image,
        Err(why) => return Ok(ReencodeOutcome::Unsupported(why)),
    };

    let (jpeg, color_space) = encode_jpeg(&image, quality)?;
    if jpeg.len() >= stream.content.len() {
        return Ok(ReencodeOutcome::NotSmaller);
    }

    let stream = doc.get_object_mut(id)?.as_stream_mut()?;
    stream.dict.remove(b"DecodeParms");
    stream.dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
    stream
        .dict
        .set("ColorSpace", Object::Name(color_space.to_vec()));
    stream.dict.set("BitsPerComponent", Object::Integer(8));
    stream.set_content(jpeg);
    stream.allows_compression = false;

    Ok(ReencodeOutcome::Replaced)
}

/// Encode as baseline JPEG, keeping grayscale images single-channel.
/// Returns the bytes and the matching device colour space name.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<(Vec<u8>, &'static [u8])> {
    let mut out = Vec::new();
    let color_space: &'static [u8] = {
        let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
        match image {
            DynamicImage::ImageLuma8(gray) => {
                encoder.encode_image(gray)?;
                b"DeviceGray"
            }
            other => {
                encoder.encode_image(&other.to_rgb8())?;
                b"DeviceRGB"
            }
        }
    };

    Ok((out, color_space))
}

/// Channels implied by the image's colour space, if it is one we decode
fn channels(doc: &Document, color_space: Option<&Object>) -> Option<usize> {
    match color_space? {
        Object::Name(name) => match name.as_slice() {
            b"DeviceRGB" => Some(3),
            b"DeviceGray" => Some(1),
            _ => None,
        },
        Object::Array(parts) => {
            if !name_is(parts.first(), b"ICCBased") {
                return None;
            }
            let profile = doc.get_object(parts.get(1)?.as_reference().ok()?).ok()?;
            let n = profile.as_stream().ok()?.dict.get(b"N").ok()?.as_i64().ok()?;
            match n {
                1 => Some(1),
                3 => Some(3),
                _ => None,
            }
        }
        Object::Reference(id) => channels(doc, doc.get_object(*id).ok()),
        _ => None,
    }
}

/// The outer `Result` carries engine errors; the inner one explains why an
/// image is not something this pass handles.
fn decode_image(
    doc: &Document,
    stream: &Stream,
) -> Result<std::result::Result<DynamicImage, String>> {
    let dict = &stream.dict;
    if dict.get(b"ImageMask").and_then(Object::as_bool).unwrap_or(false) {
        return Ok(Err("stencil mask".into()));
    }
    if dict.has(b"Decode") {
        return Ok(Err("custom decode array".into()));
    }

    let Some(channels) = channels(doc, dict.get(b"ColorSpace").ok()) else {
        return Ok(Err("unsupported colour space".into()));
    };

    let filters = stream_filters(stream);
    if filters == [b"DCTDecode".to_vec()] {
        let image = image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)?;
        return Ok(Ok(image));
    }

    if dict.has(b"DecodeParms") {
        return Ok(Err("predictor parameters".into()));
    }
    let raw = match filters.as_slice() {
        [] => stream.content.clone(),
        [f] if f.as_slice() == b"FlateDecode" => inflate(&stream.content)?,
        _ => return Ok(Err("unsupported filter chain".into())),
    };

    let bpc = dict.get(b"BitsPerComponent").and_then(Object::as_i64).unwrap_or(0);
    if bpc != 8 {
        return Ok(Err(format!("{} bits per component", bpc)));
    }
    let width = dict.get(b"Width").and_then(Object::as_i64)?;
    let height = dict.get(b"Height").and_then(Object::as_i64)?;
    let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
        return Ok(Err("invalid dimensions".into()));
    };

    let expected = width as usize * height as usize * channels;
    if raw.len() < expected {
        return Ok(Err(format!("{} bytes of pixel data, expected {}", raw.len(), expected)));
    }
    let pixels = raw[..expected].to_vec();

    let image = if channels == 3 {
        RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
    } else {
        GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8)
    };
    Ok(image.ok_or_else(|| "pixel buffer does not match dimensions".to_string()))
}
