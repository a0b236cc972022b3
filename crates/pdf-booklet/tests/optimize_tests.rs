mod common;

use common::{create_image_pdf, create_test_pdf, image_streams, pdf_bytes};
use lopdf::Object;
use pdf_booklet::optimize::*;
use pdf_booklet::{
    BookletError, BookletOptions, Result, SizeStatus, impose_document, load_pdf_bytes,
};

const MB: u64 = 1_000_000;

/// A stage that ignores its input and returns a buffer of a fixed size
struct FixedSize {
    name: &'static str,
    size: u64,
}

impl Stage for FixedSize {
    fn name(&self) -> &'static str {
        self.name
    }

    fn run(&self, _pdf: &[u8]) -> Result<StageOutput> {
        Ok(StageOutput::new(vec![0; self.size as usize]))
    }
}

/// A stage that passes its input through unchanged
struct Identity(&'static str);

impl Stage for Identity {
    fn name(&self) -> &'static str {
        self.0
    }

    fn run(&self, pdf: &[u8]) -> Result<StageOutput> {
        Ok(StageOutput::new(pdf.to_vec()))
    }
}

struct Failing(&'static str);

impl Stage for Failing {
    fn name(&self) -> &'static str {
        self.0
    }

    fn run(&self, _pdf: &[u8]) -> Result<StageOutput> {
        Err(BookletError::RenderFailure("boom".to_string()))
    }
}

fn config(optimize_images: bool) -> OptimizeConfig {
    OptimizeConfig {
        decode_level: DecodeLevel::Specialized,
        optimize_images,
        image_quality: 80,
        linearize: false,
    }
}

#[test]
fn test_image_pass_requires_flag() {
    // 1 MB source, 2.5 MB output, image optimization off
    let pipeline = OptimizationPipeline::gated(
        config(false),
        Identity("recompress"),
        FixedSize {
            name: "images",
            size: MB,
        },
        Identity("aggressive"),
    );

    let result = pipeline.run(vec![0; (5 * MB / 2) as usize], MB, Vec::new());
    assert!(result.report.ran("recompress"));
    assert!(!result.report.ran("images"));
    assert!(!result.report.ran("aggressive"));
    assert_eq!(result.report.final_size, 5 * MB / 2);
    assert!((result.report.ratio - 2.5).abs() < 1e-9);
    assert_eq!(result.report.status, SizeStatus::Good);
}

#[test]
fn test_image_pass_can_switch_off_aggressive_pass() {
    // 3.5 MB after the structural save; images bring it to 2.8 MB
    let pipeline = OptimizationPipeline::gated(
        config(true),
        Identity("recompress"),
        FixedSize {
            name: "images",
            size: 28 * MB / 10,
        },
        Identity("aggressive"),
    );

    let result = pipeline.run(vec![0; (35 * MB / 10) as usize], MB, Vec::new());
    assert!(result.report.ran("images"));
    assert!(!result.report.ran("aggressive"));
    assert_eq!(result.report.final_size, 28 * MB / 10);
    assert_eq!(result.report.status, SizeStatus::Good);
}

#[test]
fn test_aggressive_pass_runs_when_still_large() {
    let pipeline = OptimizationPipeline::gated(
        config(true),
        Identity("recompress"),
        FixedSize {
            name: "images",
            size: 35 * MB / 10,
        },
        FixedSize {
            name: "aggressive",
            size: 32 * MB / 10,
        },
    );

    let result = pipeline.run(vec![0; (4 * MB) as usize], MB, Vec::new());
    assert!(result.report.ran("images"));
    assert!(result.report.ran("aggressive"));
    assert_eq!(result.report.status, SizeStatus::Large);
    assert_eq!(result.report.stages.len(), 3);
}

#[test]
fn test_failed_stage_keeps_previous_bytes() {
    let pipeline = OptimizationPipeline::gated(
        config(true),
        FixedSize {
            name: "recompress",
            size: 1000,
        },
        Failing("images"),
        Identity("aggressive"),
    );

    let result = pipeline.run(vec![0; 4000], 100, Vec::new());
    assert_eq!(result.bytes.len(), 1000);
    assert!(result.report.is_degraded());
    assert_eq!(result.report.degraded[0].stage, "images");
    assert!(!result.report.ran("images"));
    // Still 10x the source, so the last stage runs on the recompressed bytes
    assert!(result.report.ran("aggressive"));
}

#[test]
fn test_history_is_kept() {
    let history = vec![StageRecord {
        stage: "structural".to_string(),
        size_before: 10,
        size_after: 10,
        notes: Vec::new(),
    }];
    let pipeline = OptimizationPipeline::new().stage(|_| true, Identity("only"));

    let result = pipeline.run(vec![0; 10], 10, history);
    let names: Vec<&str> = result.report.stages.iter().map(|s| s.stage.as_str()).collect();
    assert_eq!(names, vec!["structural", "only"]);
}

#[test]
fn test_empty_original_does_not_divide_by_zero() {
    let check = SizeCheck {
        original_size: 0,
        current_size: 10,
    };
    assert_eq!(check.ratio(), 10.0);
    assert!(check.exceeds(3.0));
}

#[test]
fn test_standard_stage_order() {
    let pipeline = OptimizationPipeline::standard(config(true));
    assert_eq!(
        pipeline.stage_names(),
        vec!["stream recompression", "image re-encoding", "aggressive"]
    );
}

#[test]
fn test_config_from_options() {
    let options = BookletOptions {
        compression_level: 4,
        optimize_images: false,
        ..Default::default()
    };
    let config = OptimizeConfig::from_options(&options).unwrap();
    assert_eq!(config.decode_level, DecodeLevel::Maximum);
    assert!(!config.optimize_images);
}

#[test]
fn test_structural_save_prunes_unreachable_objects() {
    let mut doc = create_image_pdf();
    doc.add_object(Object::String(b"orphan".to_vec(), lopdf::StringFormat::Literal));
    let before = doc.objects.len();

    let saved = structural_save(&mut doc).unwrap();
    assert_eq!(doc.objects.len(), before - 1);

    let reloaded = load_pdf_bytes(&saved).unwrap();
    assert_eq!(reloaded.get_pages().len(), 1);
    assert_eq!(image_streams(&reloaded).len(), 1);
}

#[test]
fn test_image_stage_reencodes_as_jpeg() {
    let raw = pdf_bytes(create_image_pdf());
    let output = ImageReencodeStage { quality: 80 }.run(&raw).unwrap();

    let doc = load_pdf_bytes(&output.bytes).unwrap();
    let images = image_streams(&doc);
    assert_eq!(images.len(), 1);
    assert!(matches!(
        images[0].dict.get(b"Filter"),
        Ok(Object::Name(name)) if name.as_slice() == b"DCTDecode"
    ));
    assert!(images[0].content.len() < 64 * 64 * 3);
    assert!(output.notes[0].starts_with("1 image(s) re-encoded"));
}

#[test]
fn test_images_found_through_form_xobjects() {
    // After imposition the image hangs off a Form XObject, not the page
    let source = create_image_pdf();
    let imposed = impose_document(&source, &BookletOptions::default()).unwrap();

    let images = collect_document_images(&imposed.document);
    assert_eq!(images.len(), 1);
}

#[test]
fn test_unsupported_images_are_skipped() {
    let mut source = create_image_pdf();
    for stream in source
        .objects
        .values_mut()
        .filter_map(|obj| obj.as_stream_mut().ok())
    {
        if stream.dict.has(b"Width") {
            stream
                .dict
                .set("ColorSpace", Object::Name(b"DeviceCMYK".to_vec()));
        }
    }

    let output = ImageReencodeStage { quality: 80 }
        .run(&pdf_bytes(source))
        .unwrap();
    assert!(output.notes[0].starts_with("0 image(s) re-encoded"));
    assert!(output.notes[1].ends_with("1 skipped"));
}

#[test]
fn test_recompress_stage_output_loads() {
    let raw = pdf_bytes(create_test_pdf(3));
    let stage = RecompressStage {
        level: DecodeLevel::All,
    };
    let output = stage.run(&raw).unwrap();

    let doc = load_pdf_bytes(&output.bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
}

#[test]
fn test_aggressive_stage_without_linearization() {
    let raw = pdf_bytes(create_test_pdf(2));
    let output = AggressiveStage { linearize: false }.run(&raw).unwrap();

    let doc = load_pdf_bytes(&output.bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 2);
    assert_eq!(output.notes.len(), 1);
}

#[test]
fn test_optimize_records_structural_pass() {
    let source = create_test_pdf(4);
    let imposed = impose_document(&source, &BookletOptions::default()).unwrap();

    let mut cfg = config(true);
    cfg.linearize = false;
    let optimized = optimize(imposed.document, 1_000_000, cfg).unwrap();

    assert_eq!(optimized.report.stages[0].stage, "structural");
    assert!(optimized.report.ran("stream recompression"));
    // Far below the source size, so no conditional pass runs
    assert!(!optimized.report.ran("image re-encoding"));
    assert!(!optimized.report.ran("aggressive"));
    assert_eq!(optimized.report.final_size, optimized.bytes.len() as u64);
    assert!(load_pdf_bytes(&optimized.bytes).is_ok());
}

/// Prefix every row with the PNG Up filter and store the difference to the row above
fn up_filter_rows(pixels: &[u8], row_len: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let mut previous = vec![0u8; row_len];
    for row in pixels.chunks(row_len) {
        out.push(2);
        out.extend(row.iter().zip(&previous).map(|(b, p)| b.wrapping_sub(*p)));
        previous = row.to_vec();
    }
    out
}

#[test]
fn test_recompress_reverses_png_predictor() {
    use flate2::Compression;
    use flate2::read::ZlibDecoder;
    use flate2::write::ZlibEncoder;
    use std::io::{Read, Write};

    let mut source = create_image_pdf();
    let mut pixels = Vec::new();
    for stream in source
        .objects
        .values_mut()
        .filter_map(|obj| obj.as_stream_mut().ok())
    {
        if !stream.dict.has(b"Width") {
            continue;
        }
        pixels = stream.content.clone();
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::none());
        encoder.write_all(&up_filter_rows(&pixels, 64 * 3)).unwrap();
        stream.set_content(encoder.finish().unwrap());
        stream.dict.set(
            "Filter",
            Object::Array(vec![Object::Name(b"FlateDecode".to_vec())]),
        );
        stream.dict.set(
            "DecodeParms",
            Object::Array(vec![Object::Dictionary(lopdf::Dictionary::from_iter(vec![
                ("Predictor", Object::Integer(15)),
                ("Colors", Object::Integer(3)),
                ("Columns", Object::Integer(64)),
            ]))]),
        );
    }
    assert_eq!(pixels.len(), 64 * 64 * 3);

    let stage = RecompressStage {
        level: DecodeLevel::Specialized,
    };
    let output = stage.run(&pdf_bytes(source)).unwrap();

    let doc = load_pdf_bytes(&output.bytes).unwrap();
    let images = image_streams(&doc);
    assert_eq!(images.len(), 1);
    assert!(!images[0].dict.has(b"DecodeParms"));

    let mut decoded = Vec::new();
    ZlibDecoder::new(images[0].content.as_slice())
        .read_to_end(&mut decoded)
        .unwrap();
    assert_eq!(decoded, pixels);
}
