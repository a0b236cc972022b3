//! Output size optimization
//!
//! The imposed document is always saved with structural compression first.
//! After that a fixed pipeline of best-effort stages runs, each one gated on
//! how large the output currently is compared to the source:
//!
//! 1. stream recompression at the configured decode level (always)
//! 2. image re-encoding (output above 2x the source and image optimization on)
//! 3. aggressive pass with optional linearization (output above 3x the source)

mod aggressive;
mod linearize;
mod pipeline;
mod raster;
mod recompress;
mod structural;

pub use aggressive::{AggressiveStage, strip_metadata};
pub use linearize::linearize_bytes;
pub use pipeline::{
    DegradedStage, OptimizationPipeline, OptimizationReport, OptimizedDocument, SizeCheck, Stage,
    StageOutput, StageRecord,
};
pub use raster::{
    ImageReencodeStage, ReencodeOutcome, collect_document_images, encode_jpeg, reencode_image,
};
pub use recompress::{DecodeLevel, RecompressStage, recompress_streams};
pub use structural::structural_save;

use crate::constants::{AGGRESSIVE_PASS_RATIO, IMAGE_PASS_RATIO};
use crate::options::BookletOptions;
use crate::types::*;
use lopdf::Document;

/// The subset of [`BookletOptions`] the optimizer cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizeConfig {
    pub decode_level: DecodeLevel,
    pub optimize_images: bool,
    pub image_quality: u8,
    pub linearize: bool,
}

impl OptimizeConfig {
    pub fn from_options(options: &BookletOptions) -> Result<Self> {
        Ok(Self {
            decode_level: DecodeLevel::from_level(options.compression_level)?,
            optimize_images: options.optimize_images,
            image_quality: options.image_quality,
            linearize: options.linearize,
        })
    }
}

impl OptimizationPipeline {
    /// The stage list used for every conversion
    pub fn standard(config: OptimizeConfig) -> Self {
        Self::gated(
            config,
            RecompressStage {
                level: config.decode_level,
            },
            ImageReencodeStage {
                quality: config.image_quality,
            },
            AggressiveStage {
                linearize: config.linearize,
            },
        )
    }

    /// The standard gating applied to arbitrary recompression, image and
    /// aggressive stages
    pub fn gated(
        config: OptimizeConfig,
        recompress: impl Stage + 'static,
        images: impl Stage + 'static,
        aggressive: impl Stage + 'static,
    ) -> Self {
        let optimize_images = config.optimize_images;

        OptimizationPipeline::new()
            .stage(|_| true, recompress)
            .stage(
                move |check| image_pass_due(check, optimize_images),
                images,
            )
            .stage(aggressive_pass_due, aggressive)
    }
}

/// Images are re-encoded only when enabled and the output is over 2x the source
pub fn image_pass_due(check: &SizeCheck, optimize_images: bool) -> bool {
    optimize_images && check.exceeds(IMAGE_PASS_RATIO)
}

pub fn aggressive_pass_due(check: &SizeCheck) -> bool {
    check.exceeds(AGGRESSIVE_PASS_RATIO)
}

/// Save `document` and shrink it as far as the size thresholds call for.
///
/// Only the initial structural save can fail; later stages degrade instead.
pub fn optimize(
    mut document: Document,
    original_size: u64,
    config: OptimizeConfig,
) -> Result<OptimizedDocument> {
    let bytes = structural_save(&mut document)
        .map_err(|e| BookletError::RenderFailure(format!("structural save failed: {e}")))?;

    let initial = StageRecord {
        stage: "structural".to_string(),
        size_before: bytes.len() as u64,
        size_after: bytes.len() as u64,
        notes: Vec::new(),
    };
    log::info!(
        "Structural save: {} bytes ({:.2}x the source)",
        bytes.len(),
        SizeCheck {
            original_size,
            current_size: bytes.len() as u64,
        }
        .ratio()
    );

    Ok(OptimizationPipeline::standard(config).run(bytes, original_size, vec![initial]))
}
