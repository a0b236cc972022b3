//! Stream recompression
//!
//! Decodes streams that use lossless filters and deflates them again,
//! keeping the new encoding only when it is smaller. How far this reaches
//! is set by the [`DecodeLevel`].

use super::pipeline::{Stage, StageOutput};
use super::structural::structural_save;
use crate::impose::load_pdf_bytes;
use crate::types::{BookletError, Result};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::{Read, Write};

/// Filters that can be decoded without loss
const LOSSLESS_FILTERS: &[&[u8]] = &[
    b"FlateDecode",
    b"LZWDecode",
    b"ASCII85Decode",
    b"ASCIIHexDecode",
    b"RunLengthDecode",
];

/// How aggressively streams are decoded before being re-encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DecodeLevel {
    /// Leave every stream as it is
    None,
    /// Re-deflate non-image streams that are raw or Flate-encoded
    Generalized,
    /// Also re-deflate raw or Flate-encoded images
    Specialized,
    /// Rewrite any losslessly encoded stream as Flate
    All,
    /// As `All`, with the highest deflate effort
    Maximum,
}

impl DecodeLevel {
    /// Map a 0..=4 compression level to a decode level
    pub fn from_level(level: u8) -> Result<Self> {
        match level {
            0 => Ok(DecodeLevel::None),
            1 => Ok(DecodeLevel::Generalized),
            2 => Ok(DecodeLevel::Specialized),
            3 => Ok(DecodeLevel::All),
            4 => Ok(DecodeLevel::Maximum),
            _ => Err(BookletError::InvalidArgument(format!(
                "Compression level must be between 0 and 4, got {}",
                level
            ))),
        }
    }

    fn compression(self) -> Compression {
        match self {
            DecodeLevel::Maximum => Compression::best(),
            _ => Compression::default(),
        }
    }

    fn covers(self, stream: &Stream) -> bool {
        let filters = stream_filters(stream);
        let is_image = name_is(stream.dict.get(b"Subtype").ok(), b"Image");
        let flate_or_raw = filters.is_empty() || filters == [b"FlateDecode".to_vec()];

        match self {
            DecodeLevel::None => false,
            DecodeLevel::Generalized => flate_or_raw && !is_image,
            DecodeLevel::Specialized => flate_or_raw,
            DecodeLevel::All | DecodeLevel::Maximum => filters
                .iter()
                .all(|f| LOSSLESS_FILTERS.contains(&f.as_slice())),
        }
    }
}

/// Best-effort recompression pass
pub struct RecompressStage {
    pub level: DecodeLevel,
}

impl Stage for RecompressStage {
    fn name(&self) -> &'static str {
        "stream recompression"
    }

    fn run(&self, pdf: &[u8]) -> Result<StageOutput> {
        let mut doc = load_pdf_bytes(pdf)?;
        let rewritten = recompress_streams(&mut doc, self.level)?;
        let bytes = structural_save(&mut doc)?;
        Ok(StageOutput::new(bytes).with_note(format!(
            "{} stream(s) re-encoded at {:?}",
            rewritten, self.level
        )))
    }
}

/// Re-encode every stream covered by `level`; returns how many were replaced
pub fn recompress_streams(doc: &mut Document, level: DecodeLevel) -> Result<usize> {
    if level == DecodeLevel::None {
        return Ok(0);
    }

    // Indirect decode parameters are resolved before any stream is borrowed mutably
    let source: &Document = doc;
    let candidates: Vec<(ObjectId, Option<Dictionary>)> = source
        .objects
        .iter()
        .filter_map(|(&id, object)| {
            let stream = object.as_stream().ok()?;
            if is_structural(stream) || !level.covers(stream) {
                return None;
            }
            match decode_params(source, stream) {
                DecodeParams::Absent => Some((id, None)),
                DecodeParams::Dictionary(params) => Some((id, Some(params))),
                DecodeParams::Unsupported => {
                    log::debug!("Leaving stream {:?} as is: unreadable decode parameters", id);
                    None
                }
            }
        })
        .collect();

    let mut rewritten = 0;
    for (id, params) in candidates {
        let Some(Object::Stream(stream)) = doc.objects.get_mut(&id) else {
            continue;
        };
        let Some(data) = decode_stream(stream, params.as_ref()) else {
            log::debug!("Leaving stream {:?} as is: could not decode it losslessly", id);
            continue;
        };

        let compressed = deflate(&data, level.compression())?;
        if compressed.len() < stream.content.len() {
            stream.dict.remove(b"DecodeParms");
            stream
                .dict
                .set("Filter", Object::Name(b"FlateDecode".to_vec()));
            stream.set_content(compressed);
            rewritten += 1;
        }
    }

    Ok(rewritten)
}

/// A stream's `/DecodeParms`, reduced to the single dictionary that applies
enum DecodeParams {
    Absent,
    Dictionary(Dictionary),
    Unsupported,
}

fn decode_params(doc: &Document, stream: &Stream) -> DecodeParams {
    match stream.dict.get(b"DecodeParms") {
        Ok(params) => resolve_params(doc, params, 0),
        Err(_) => DecodeParams::Absent,
    }
}

/// Accepts a dictionary, a one-element array (one filter) or a reference to either
fn resolve_params(doc: &Document, params: &Object, depth: u8) -> DecodeParams {
    if depth > 4 {
        return DecodeParams::Unsupported;
    }
    match params {
        Object::Null => DecodeParams::Absent,
        Object::Dictionary(dict) => DecodeParams::Dictionary(dict.clone()),
        Object::Array(items) if items.len() == 1 => resolve_params(doc, &items[0], depth + 1),
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(target) => resolve_params(doc, target, depth + 1),
            Err(_) => DecodeParams::Unsupported,
        },
        _ => DecodeParams::Unsupported,
    }
}

/// Fully decoded stream data, or `None` when it cannot be recovered without loss
fn decode_stream(stream: &Stream, params: Option<&Dictionary>) -> Option<Vec<u8>> {
    let filters = stream_filters(stream);
    match filters.as_slice() {
        [] => Some(stream.content.clone()),
        [filter] if filter.as_slice() == b"FlateDecode" => {
            let data = inflate(&stream.content).ok()?;
            match params {
                Some(params) => unpredict(data, params),
                None => Some(data),
            }
        }
        // lopdf returns partial output for damaged Flate data, so it only
        // handles chains without Flate or predictors
        chain
            if params.is_none()
                && !chain.iter().any(|f| f.as_slice() == b"FlateDecode") =>
        {
            stream.decompressed_content().ok()
        }
        _ => None,
    }
}

/// Reverse the predictor named by `params`.
///
/// Only the PNG predictors (10 to 15) are handled; TIFF prediction and
/// malformed parameters give `None`.
fn unpredict(data: Vec<u8>, params: &Dictionary) -> Option<Vec<u8>> {
    let int = |key: &[u8], default: i64| {
        params
            .get(key)
            .and_then(Object::as_i64)
            .unwrap_or(default)
    };

    match int(b"Predictor", 1) {
        1 => return Some(data),
        10..=15 => {}
        _ => return None,
    }

    let colors = int(b"Colors", 1);
    let bits = int(b"BitsPerComponent", 8);
    let columns = int(b"Columns", 1);
    if !(1..=32).contains(&colors) || ![1, 2, 4, 8, 16].contains(&bits) || columns < 1 {
        return None;
    }

    let bits_per_pixel = (colors * bits) as usize;
    let row_len = (bits_per_pixel * columns as usize).div_ceil(8);
    let pixel_len = bits_per_pixel.div_ceil(8).max(1);
    png_unfilter(&data, row_len, pixel_len)
}

/// Undo per-row PNG filtering. Every row starts with its filter type byte.
fn png_unfilter(data: &[u8], row_len: usize, pixel_len: usize) -> Option<Vec<u8>> {
    let stride = row_len + 1;
    if data.is_empty() || data.len() % stride != 0 {
        return None;
    }

    let mut out = Vec::with_capacity(data.len() / stride * row_len);
    let mut previous = vec![0u8; row_len];
    for row in data.chunks_exact(stride) {
        let (filter, encoded) = (row[0], &row[1..]);
        let mut current = vec![0u8; row_len];
        for i in 0..row_len {
            let left = if i >= pixel_len { current[i - pixel_len] } else { 0 };
            let up = previous[i];
            let up_left = if i >= pixel_len { previous[i - pixel_len] } else { 0 };
            let predicted = match filter {
                0 => 0,
                1 => left,
                2 => up,
                3 => ((left as u16 + up as u16) / 2) as u8,
                4 => paeth(left, up, up_left),
                _ => return None,
            };
            current[i] = encoded[i].wrapping_add(predicted);
        }
        out.extend_from_slice(&current);
        previous = current;
    }

    Some(out)
}

fn paeth(left: u8, up: u8, up_left: u8) -> u8 {
    let estimate = left as i16 + up as i16 - up_left as i16;
    let to_left = (estimate - left as i16).abs();
    let to_up = (estimate - up as i16).abs();
    let to_up_left = (estimate - up_left as i16).abs();
    if to_left <= to_up && to_left <= to_up_left {
        left
    } else if to_up <= to_up_left {
        up
    } else {
        up_left
    }
}

fn deflate(data: &[u8], level: Compression) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), level);
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Inflate a plain zlib stream (no predictor)
pub(crate) fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Cross-reference, object and metadata streams are left alone
fn is_structural(stream: &Stream) -> bool {
    let kind = stream.dict.get(b"Type").ok();
    name_is(kind, b"XRef") || name_is(kind, b"ObjStm") || name_is(kind, b"Metadata")
}

/// The stream's filter chain, outermost first
pub(crate) fn stream_filters(stream: &Stream) -> Vec<Vec<u8>> {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(filters)) => filters
            .iter()
            .filter_map(|f| match f {
                Object::Name(name) => Some(name.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn name_is(obj: Option<&Object>, expected: &[u8]) -> bool {
    matches!(obj, Some(Object::Name(name)) if name.as_slice() == expected)
}
